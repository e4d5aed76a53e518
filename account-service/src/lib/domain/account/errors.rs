use thiserror::Error;

use crate::token::errors::TokenError;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("This field may not be blank.")]
    Blank,

    #[error("Enter a valid email address.")]
    InvalidFormat(String),
}

/// Errors raised by account persistence
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    #[error("Invalid account ID: {0}")]
    InvalidAccountId(#[from] AccountIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Outcome of a failed register/login/refresh/logout.
///
/// The client-facing variants are coarse: `InvalidCredentials` and
/// `InvalidToken` never say which check failed.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("A user with this email already exists.")]
    DuplicateAccount,

    #[error("Password does not satisfy the password policy: {}", .0.join(" "))]
    WeakPassword(Vec<String>),

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Token is invalid or expired")]
    InvalidToken,

    #[error("You cannot revoke a token that does not belong to the authenticated user.")]
    Forbidden,

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Token service error: {0}")]
    TokenService(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AuthError {
    pub fn validation(field: &'static str, message: impl ToString) -> Self {
        AuthError::Validation {
            field,
            message: message.to_string(),
        }
    }
}

impl From<AccountError> for AuthError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::EmailAlreadyExists(_) => AuthError::DuplicateAccount,
            AccountError::InvalidEmail(e) => AuthError::validation("email", e),
            AccountError::InvalidAccountId(e) => AuthError::DatabaseError(e.to_string()),
            AccountError::DatabaseError(msg) => AuthError::DatabaseError(msg),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        if err.is_rejection() {
            AuthError::InvalidToken
        } else {
            AuthError::TokenService(err.to_string())
        }
    }
}
