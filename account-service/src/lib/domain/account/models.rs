use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::AccountIdError;
use crate::account::errors::EmailError;
use crate::token::models::TokenPair;

/// Account aggregate entity.
///
/// One record per registered identity. Never hard-deleted by this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub capabilities: Capabilities,
    pub date_joined: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Build a new account joined now.
    pub fn new(email: EmailAddress, password_hash: String, capabilities: Capabilities) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            email,
            password_hash,
            capabilities,
            date_joined: now,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.capabilities.is_active
    }
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    ///
    /// # Returns
    /// AccountId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Canonical form of an e-mail address: surrounding whitespace removed, lower-cased.
///
/// Applied before every lookup and every write so that storage is canonical and
/// comparisons are case-insensitive.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Plain mailbox addresses only: no display name, no domain literal, and a domain
/// with at least one dot.
fn address_options() -> email_address::Options {
    email_address::Options::default()
        .without_display_text()
        .without_domain_literal()
        .with_required_tld()
}

/// Email address type
///
/// Validated with an RFC 5322 compliant parser and always held in normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated, normalized email address.
    ///
    /// # Errors
    /// * `Blank` - Input is empty or whitespace only
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: impl AsRef<str>) -> Result<Self, EmailError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmailError::Blank);
        }

        email_address::EmailAddress::parse_with_options(trimmed, address_options())
            .map(|parsed| EmailAddress(normalize_email(&parsed.email())))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Named capabilities of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// May authenticate at all
    pub is_active: bool,
    /// May use administrative tooling
    pub is_staff: bool,
    /// Holds every permission
    pub is_superuser: bool,
}

impl Capabilities {
    /// Active account with every administrative capability.
    pub fn superuser() -> Self {
        Self {
            is_active: true,
            is_staff: true,
            is_superuser: true,
        }
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }
}

/// Command to register a new account
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: String,
}

impl RegisterCommand {
    /// # Arguments
    /// * `email` - Validated, normalized email
    /// * `password` - Plain text password (checked against the policy and hashed by the service)
    pub fn new(email: EmailAddress, password: String) -> Self {
        Self { email, password }
    }
}

/// Command to log in with raw credentials.
///
/// The e-mail stays raw here: a malformed address must fail exactly like an unknown one.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }
}

/// An account together with a freshly issued token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub account: Account,
    pub tokens: TokenPair,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Owner@Example.Com \n"), "owner@example.com");
        assert_eq!(normalize_email(""), "");
    }

    #[test]
    fn test_normalize_email_is_idempotent() {
        for raw in [
            "Owner@Example.Com",
            "  MIXED.case+Tag@Sub.Example.ORG  ",
            "\tA@B.COM",
            "already@normal.com",
            "ÉLODIE@Exemple.FR",
        ] {
            let once = normalize_email(raw);
            assert_eq!(normalize_email(&once), once);
        }
    }

    #[test]
    fn test_email_address_is_normalized() {
        let email = EmailAddress::new("  Owner@Example.Com ").unwrap();
        assert_eq!(email.as_str(), "owner@example.com");
        assert_eq!(email, EmailAddress::new("owner@example.com").unwrap());
    }

    #[test]
    fn test_email_address_rejects_invalid() {
        assert!(matches!(
            EmailAddress::new("not-an-email"),
            Err(EmailError::InvalidFormat(_))
        ));
        assert_eq!(EmailAddress::new("   "), Err(EmailError::Blank));
    }

    #[test]
    fn test_email_address_rejects_non_mailbox_forms() {
        for raw in [
            "Owner <owner@example.com>",
            "<owner@example.com>",
            "owner@example",
            "owner@[127.0.0.1]",
        ] {
            assert!(
                matches!(EmailAddress::new(raw), Err(EmailError::InvalidFormat(_))),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_account_id_round_trip() {
        let id = AccountId::new();
        assert_eq!(AccountId::from_string(&id.to_string()), Ok(id));
        assert!(AccountId::from_string("not-a-uuid").is_err());
    }

    #[test]
    fn test_default_capabilities() {
        let capabilities = Capabilities::default();
        assert!(capabilities.is_active);
        assert!(!capabilities.is_staff);
        assert!(!capabilities.is_superuser);

        let superuser = Capabilities::superuser();
        assert!(superuser.is_active && superuser.is_staff && superuser.is_superuser);
    }
}
