use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::account::models::AccountId;
use crate::token::errors::TokenError;
use crate::token::models::RevokedToken;
use crate::token::models::TokenId;
use crate::token::models::TokenPair;
use crate::token::models::TokenType;
use crate::token::models::VerifiedToken;

/// Port for the token primitive: issuance, verification and revocation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenServicePort: Send + Sync + 'static {
    /// Issue a new access/refresh pair bound to an account.
    ///
    /// # Errors
    /// * `IssuanceFailed` - Token signing failed
    fn issue(&self, account_id: &AccountId) -> Result<TokenPair, TokenError>;

    /// Verify a token of the expected kind.
    ///
    /// Refresh tokens are additionally checked against the denylist. Access tokens
    /// are never denylisted and are valid until they expire.
    ///
    /// # Errors
    /// * `Malformed` - Bad encoding, bad signature or wrong token kind
    /// * `Expired` - Token has expired
    /// * `Revoked` - Refresh token is denylisted
    /// * `StorageError` - Denylist lookup failed
    async fn verify(&self, token: &str, expected: TokenType)
        -> Result<VerifiedToken, TokenError>;

    /// Denylist a verified token.
    ///
    /// # Returns
    /// `true` if this call revoked the token, `false` if it was already revoked
    ///
    /// # Errors
    /// * `StorageError` - Denylist write failed
    async fn revoke(&self, token: &VerifiedToken) -> Result<bool, TokenError>;

    /// Check whether a token identity is denylisted.
    ///
    /// # Errors
    /// * `StorageError` - Denylist lookup failed
    async fn is_revoked(&self, id: &TokenId) -> Result<bool, TokenError>;
}

/// Persistence of the token denylist.
///
/// Entries are never removed while the token they describe could still verify.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RevocationRepository: Send + Sync + 'static {
    /// Record a revocation.
    ///
    /// Must be atomic per token identity: of several concurrent inserts for the same
    /// identity exactly one returns `true`.
    ///
    /// # Returns
    /// `true` if the entry was created, `false` if it already existed
    ///
    /// # Errors
    /// * `StorageError` - Database operation failed
    async fn insert(&self, token: RevokedToken) -> Result<bool, TokenError>;

    /// # Errors
    /// * `StorageError` - Database operation failed
    async fn contains(&self, id: &TokenId) -> Result<bool, TokenError>;

    /// Drop entries for tokens that expired before `now`.
    ///
    /// # Returns
    /// Number of entries removed
    ///
    /// # Errors
    /// * `StorageError` - Database operation failed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenError>;
}
