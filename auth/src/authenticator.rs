use crate::jwt::Claims;
use crate::jwt::IssuedPair;
use crate::jwt::JwtError;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenLifetimes;
use crate::jwt::TokenType;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::password::PasswordPolicy;
use crate::password::PolicyViolation;

/// Authentication coordinator combining password handling and token issuance.
///
/// Provides high-level authentication operations by coordinating
/// password hashing, the password policy and the token issuer.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    password_policy: PasswordPolicy,
    token_issuer: TokenIssuer,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),
}

impl Authenticator {
    /// Create a new authenticator with the default password policy.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `lifetimes` - Access and refresh token lifetimes
    pub fn new(jwt_secret: &[u8], lifetimes: TokenLifetimes) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            password_policy: PasswordPolicy::default(),
            token_issuer: TokenIssuer::new(jwt_secret, lifetimes),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a candidate password against the policy for the given e-mail.
    ///
    /// # Errors
    /// Every violated rule
    pub fn check_password_strength(
        &self,
        password: &str,
        email: &str,
    ) -> Result<(), Vec<PolicyViolation>> {
        self.password_policy.validate(password, email)
    }

    /// Verify a password against the stored hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is unreadable
    pub fn verify_credentials(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<(), AuthenticationError> {
        if self.password_hasher.verify(password, stored_hash)? {
            Ok(())
        } else {
            Err(AuthenticationError::InvalidCredentials)
        }
    }

    /// Spend a password verification without a stored hash.
    ///
    /// Called when the account does not exist, so that path takes as long as a wrong password.
    pub fn reject_unknown(&self, password: &str) {
        self.password_hasher.verify_decoy(password);
    }

    /// Issue a token pair without password verification.
    ///
    /// Used right after registration and when rotating a refresh token.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_tokens(&self, subject: impl ToString) -> Result<IssuedPair, JwtError> {
        self.token_issuer.issue_pair(subject)
    }

    /// Validate a token of the expected kind and return its claims.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        self.token_issuer.verify(token, expected)
    }

    /// Sign arbitrary claims with the configured key.
    pub fn sign_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        self.token_issuer.encode(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(b"test_secret_key_at_least_32_bytes!", TokenLifetimes::default())
    }

    #[test]
    fn test_verify_credentials() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        assert!(authenticator.verify_credentials("my_password", &hash).is_ok());
        assert!(matches!(
            authenticator.verify_credentials("wrong_password", &hash),
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_credentials_with_corrupt_hash() {
        let authenticator = authenticator();

        assert!(matches!(
            authenticator.verify_credentials("my_password", "not-a-phc-string"),
            Err(AuthenticationError::PasswordError(_))
        ));
    }

    #[test]
    fn test_issue_and_validate_tokens() {
        let authenticator = authenticator();

        let tokens = authenticator
            .issue_tokens("user123")
            .expect("Failed to issue tokens");

        let decoded = authenticator
            .validate_token(&tokens.refresh.token, TokenType::Refresh)
            .expect("Failed to validate token");

        assert_eq!(decoded.sub, Some("user123".to_string()));
        assert_eq!(decoded.jti, tokens.refresh.claims.jti);
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = authenticator();

        let result = authenticator.validate_token("invalid.token.here", TokenType::Refresh);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_password_strength() {
        let authenticator = authenticator();

        assert!(authenticator
            .check_password_strength("StrongPass#2026", "owner@example.com")
            .is_ok());
        assert!(authenticator
            .check_password_strength("12345678", "owner@example.com")
            .is_err());
    }
}
