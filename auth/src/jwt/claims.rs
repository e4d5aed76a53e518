use std::fmt;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Discriminates access tokens from refresh tokens.
///
/// Serialized into the `token_type` claim so one kind can never be presented as the other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims carried by every access and refresh token.
///
/// `sub` is optional on the wire: a token that verifies but names no subject is
/// still decodable, and callers decide what that means for them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account identifier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID (unique token identity, the denylist key)
    pub jti: String,

    /// Access or refresh
    pub token_type: TokenType,
}

impl Claims {
    /// Create claims for a subject with a fresh token identity.
    ///
    /// # Arguments
    /// * `token_type` - Kind of token these claims describe
    /// * `subject` - Account identifier
    /// * `lifetime` - Time until the token expires
    ///
    /// # Returns
    /// Claims with sub, exp, iat, jti and token_type set
    pub fn new(token_type: TokenType, subject: impl ToString, lifetime: Duration) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: Some(subject.to_string()),
            exp: now.saturating_add(lifetime.num_seconds()),
            iat: now,
            jti: Uuid::new_v4().simple().to_string(),
            token_type,
        }
    }

    /// Override expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    /// Drop the subject claim.
    pub fn without_subject(mut self) -> Self {
        self.sub = None;
        self
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
