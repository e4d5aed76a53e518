use auth::JwtError;
use thiserror::Error;

/// Errors raised by the token lifecycle
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token has been revoked")]
    Revoked,

    #[error("Token issuance failed: {0}")]
    IssuanceFailed(String),

    #[error("Revocation storage error: {0}")]
    StorageError(String),
}

impl TokenError {
    /// Whether this error means the presented token is unusable, as opposed to an
    /// infrastructure failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            TokenError::Malformed(_) | TokenError::Expired | TokenError::Revoked
        )
    }
}

impl From<JwtError> for TokenError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EncodingFailed(msg) => TokenError::IssuanceFailed(msg),
            JwtError::TokenExpired => TokenError::Expired,
            JwtError::DecodingFailed(_)
            | JwtError::InvalidSignature
            | JwtError::WrongTokenType { .. } => TokenError::Malformed(err.to_string()),
        }
    }
}
