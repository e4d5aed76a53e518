use std::fmt;

use chrono::DateTime;
use chrono::Utc;

pub use auth::TokenType;

use crate::account::models::AccountId;

/// Access and refresh tokens handed to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenPair {
    /// Authorization scheme clients must present the access token with.
    pub const TOKEN_TYPE: &'static str = "Bearer";
}

/// Unique token identity (the `jti` claim), the key of the denylist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A token whose signature, expiry and kind have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub id: TokenId,
    pub subject: Option<String>,
    pub token_type: TokenType,
    pub expires_at: DateTime<Utc>,
}

impl VerifiedToken {
    /// Account the token is bound to, if its subject is a well-formed identifier.
    pub fn account_id(&self) -> Option<AccountId> {
        self.subject
            .as_deref()
            .and_then(|subject| AccountId::from_string(subject).ok())
    }
}

/// Denylist entry for one revoked token identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedToken {
    pub id: TokenId,
    pub account_id: Option<AccountId>,
    pub token_type: TokenType,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: DateTime<Utc>,
}

impl RevokedToken {
    pub fn from_verified(token: &VerifiedToken) -> Self {
        Self {
            id: token.id.clone(),
            account_id: token.account_id(),
            token_type: token.token_type,
            expires_at: token.expires_at,
            revoked_at: Utc::now(),
        }
    }
}
