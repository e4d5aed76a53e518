use std::collections::BTreeMap;
use std::fmt::Display;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::account::errors::AuthError;
use crate::account::models::Account;
use crate::token::models::TokenPair;

pub mod health;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(ApiErrorData),
    Unauthorized(ApiErrorData),
    Forbidden(ApiErrorData),
    TooManyRequests(Duration),
}

impl ApiError {
    pub fn not_authenticated() -> Self {
        ApiError::Unauthorized(ApiErrorData::new(
            "not_authenticated",
            "Authentication credentials were not provided.",
        ))
    }

    pub fn token_not_valid() -> Self {
        ApiError::Unauthorized(ApiErrorData::new(
            "token_not_valid",
            "Token is invalid or expired",
        ))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(ApiErrorData::new("invalid", rejection.body_text()))
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::BadRequest(ApiErrorData::new("invalid", "Invalid input.").with_errors(errors))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiErrorData::new(
                        "internal_error",
                        "A server error occurred.",
                    )),
                )
                    .into_response()
            }
            ApiError::BadRequest(data) => (StatusCode::BAD_REQUEST, Json(data)).into_response(),
            ApiError::Unauthorized(data) => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
                Json(data),
            )
                .into_response(),
            ApiError::Forbidden(data) => (StatusCode::FORBIDDEN, Json(data)).into_response(),
            ApiError::TooManyRequests(wait) => {
                let seconds = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, HeaderValue::from(seconds))],
                    Json(ApiErrorData::new(
                        "throttled",
                        format!(
                            "Request was throttled. Expected available in {} seconds.",
                            seconds
                        ),
                    )),
                )
                    .into_response()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation { field, ref message } => {
                let mut errors = FieldErrors::default();
                errors.add(field, message);
                errors.into()
            }
            AuthError::DuplicateAccount => {
                let mut errors = FieldErrors::default();
                errors.add("email", &err);
                ApiError::BadRequest(
                    ApiErrorData::new("duplicate_account", err.to_string()).with_errors(errors),
                )
            }
            AuthError::WeakPassword(ref messages) => {
                let mut errors = FieldErrors::default();
                for message in messages {
                    errors.add("password", message);
                }
                ApiError::BadRequest(
                    ApiErrorData::new(
                        "weak_password",
                        "Password does not satisfy the password policy.",
                    )
                    .with_errors(errors),
                )
            }
            AuthError::InvalidCredentials => ApiError::Unauthorized(ApiErrorData::new(
                "invalid_credentials",
                err.to_string(),
            )),
            AuthError::InvalidToken => ApiError::token_not_valid(),
            AuthError::Forbidden => {
                ApiError::Forbidden(ApiErrorData::new("permission_denied", err.to_string()))
            }
            AuthError::Password(_) | AuthError::TokenService(_) | AuthError::DatabaseError(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

/// Uniform error body: a machine code, a human message and optional per-field messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub code: &'static str,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ApiErrorData {
    pub fn new(code: &'static str, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Messages collected while validating a request body, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Display) {
        self.0.entry(field).or_default().push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Require a present, non-blank value; surrounding whitespace is removed.
    pub fn require(&mut self, field: &'static str, value: Option<String>) -> Option<String> {
        match value {
            None => {
                self.add(field, "This field is required.");
                None
            }
            Some(value) if value.trim().is_empty() => {
                self.add(field, "This field may not be blank.");
                None
            }
            Some(value) => Some(value.trim().to_string()),
        }
    }

    /// Require a present, non-empty value, kept verbatim (passwords).
    pub fn require_raw(&mut self, field: &'static str, value: Option<String>) -> Option<String> {
        match value {
            None => {
                self.add(field, "This field is required.");
                None
            }
            Some(value) if value.is_empty() => {
                self.add(field, "This field may not be blank.");
                None
            }
            Some(value) => Some(value),
        }
    }

    /// Record the error of a failed parse under `field`.
    pub fn check<T, E: Display>(&mut self, field: &'static str, result: Result<T, E>) -> Option<T> {
        result.map_err(|e| self.add(field, e)).ok()
    }
}

/// `{id, email}` as returned by register and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountData {
    pub id: String,
    pub email: String,
}

impl From<&Account> for AccountData {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokensData {
    pub access: String,
    pub refresh: String,
    pub token_type: &'static str,
}

impl From<&TokenPair> for TokensData {
    fn from(tokens: &TokenPair) -> Self {
        Self {
            access: tokens.access.clone(),
            refresh: tokens.refresh.clone(),
            token_type: TokenPair::TOKEN_TYPE,
        }
    }
}
