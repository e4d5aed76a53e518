use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::errors::PolicyViolation;

/// Frequently used passwords, one lower-cased entry per line.
const COMMON_PASSWORDS: &str = include_str!("common_passwords.txt");

fn common_passwords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        COMMON_PASSWORDS
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    })
}

/// Password strength rules applied at registration.
///
/// A candidate must be long enough, must not resemble the account's e-mail, must not
/// appear in the common-password list and must not be made only of digits. Every broken
/// rule is reported, not just the first one.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
    max_similarity: f64,
}

impl PasswordPolicy {
    pub fn new(min_length: usize, max_similarity: f64) -> Self {
        Self {
            min_length,
            max_similarity,
        }
    }

    /// Validate a password for an account identified by `email`.
    ///
    /// # Errors
    /// Every violated rule, in rule order.
    pub fn validate(&self, password: &str, email: &str) -> Result<(), Vec<PolicyViolation>> {
        let violations: Vec<PolicyViolation> = [
            self.check_similarity(password, "email", email),
            self.check_length(password),
            check_common(password),
            check_numeric(password),
        ]
        .into_iter()
        .flatten()
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn check_similarity(
        &self,
        password: &str,
        attribute: &'static str,
        value: &str,
    ) -> Option<PolicyViolation> {
        if value.is_empty() {
            return None;
        }

        let password = password.to_lowercase();
        let value = value.to_lowercase();

        let similar = value
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .chain(std::iter::once(value.as_str()))
            .filter(|part| !self.exceeds_length_ratio(&password, part))
            .any(|part| quick_ratio(&password, part) >= self.max_similarity);

        similar.then_some(PolicyViolation::TooSimilar { attribute })
    }

    /// A very short attribute part cannot meaningfully resemble a much longer password.
    fn exceeds_length_ratio(&self, password: &str, part: &str) -> bool {
        let password_length = password.chars().count();
        let part_length = part.chars().count();
        let length_bound = self.max_similarity / 2.0 * password_length as f64;

        password_length >= 10 * part_length && (part_length as f64) < length_bound
    }

    fn check_length(&self, password: &str) -> Option<PolicyViolation> {
        (password.chars().count() < self.min_length).then_some(PolicyViolation::TooShort {
            min: self.min_length,
        })
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(8, 0.7)
    }
}

fn check_common(password: &str) -> Option<PolicyViolation> {
    let candidate = password.trim().to_lowercase();

    common_passwords()
        .contains(candidate.as_str())
        .then_some(PolicyViolation::TooCommon)
}

fn check_numeric(password: &str) -> Option<PolicyViolation> {
    (!password.is_empty() && password.chars().all(char::is_numeric))
        .then_some(PolicyViolation::EntirelyNumeric)
}

/// Upper bound on the similarity of two strings: twice the size of the character
/// multiset intersection over the combined length.
fn quick_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
    }

    let matches = a
        .chars()
        .filter(|c| match available.get_mut(c) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        })
        .count();

    2.0 * matches as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_passes() {
        let policy = PasswordPolicy::default();

        assert!(policy.validate("StrongPass#2026", "owner@example.com").is_ok());
        assert!(policy.validate("StrongPass#2026", "a@b.com").is_ok());
    }

    #[test]
    fn test_numeric_common_password_reports_every_rule() {
        let policy = PasswordPolicy::default();

        let violations = policy
            .validate("12345678", "owner@example.com")
            .unwrap_err();

        assert_eq!(
            violations,
            vec![PolicyViolation::TooCommon, PolicyViolation::EntirelyNumeric]
        );
    }

    #[test]
    fn test_too_short() {
        let policy = PasswordPolicy::default();

        let violations = policy.validate("Xy#9", "owner@example.com").unwrap_err();

        assert_eq!(violations, vec![PolicyViolation::TooShort { min: 8 }]);
        assert_eq!(
            violations[0].to_string(),
            "This password is too short. It must contain at least 8 characters."
        );
    }

    #[test]
    fn test_common_password_is_case_insensitive() {
        let policy = PasswordPolicy::default();

        let violations = policy.validate("PassWord", "owner@example.com").unwrap_err();

        assert_eq!(violations, vec![PolicyViolation::TooCommon]);
    }

    #[test]
    fn test_common_password_list_covers_derived_forms() {
        let policy = PasswordPolicy::default();

        for candidate in ["Liverpool123", "dragon2019", "Qwertyuiop1", "  Sunshine!  "] {
            assert_eq!(
                policy.validate(candidate, "owner@example.com"),
                Err(vec![PolicyViolation::TooCommon]),
                "{} should be flagged",
                candidate
            );
        }
        assert!(common_passwords().len() > 5_000);
        assert!(common_passwords().iter().all(|entry| *entry == entry.to_lowercase()));
    }

    #[test]
    fn test_password_similar_to_email() {
        let policy = PasswordPolicy::default();

        let violations = policy
            .validate("owner@example", "owner@example.com")
            .unwrap_err();

        assert_eq!(
            violations,
            vec![PolicyViolation::TooSimilar { attribute: "email" }]
        );
    }

    #[test]
    fn test_password_similar_to_email_local_part() {
        let policy = PasswordPolicy::default();

        let result = policy.validate("Alexandra1", "alexandra@example.com");

        assert_eq!(
            result,
            Err(vec![PolicyViolation::TooSimilar { attribute: "email" }])
        );
    }

    #[test]
    fn test_quick_ratio() {
        assert_eq!(quick_ratio("", ""), 1.0);
        assert_eq!(quick_ratio("abcd", "abcd"), 1.0);
        assert_eq!(quick_ratio("abcd", "wxyz"), 0.0);
        assert_eq!(quick_ratio("aabb", "ab"), 2.0 * 2.0 / 6.0);
    }
}
