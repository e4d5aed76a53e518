use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use super::FieldErrors;
use super::TokensData;
use crate::account::models::AuthenticatedSession;
use crate::account::models::EmailAddress;
use crate::account::models::RegisterCommand;
use crate::account::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn register<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    let Json(body) = body?;

    state
        .auth_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::CREATED, session.into()))
}

/// HTTP request body for registering an account (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    email: Option<String>,
    password: Option<String>,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, FieldErrors> {
        let mut errors = FieldErrors::default();

        let email = errors
            .require("email", self.email)
            .and_then(|raw| errors.check("email", EmailAddress::new(raw)));
        let password = errors.require_raw("password", self.password);

        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => {
                Ok(RegisterCommand::new(email, password))
            }
            _ => Err(errors),
        }
    }
}

/// `{user, tokens}` returned by register and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResponseData {
    pub user: AccountData,
    pub tokens: TokensData,
}

impl From<&AuthenticatedSession> for SessionResponseData {
    fn from(session: &AuthenticatedSession) -> Self {
        Self {
            user: (&session.account).into(),
            tokens: (&session.tokens).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: Option<&str>, password: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: email.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn test_command_normalizes_email() {
        let command = request(Some("  A@B.COM "), Some("StrongPass#2026"))
            .try_into_command()
            .unwrap();

        assert_eq!(command.email.as_str(), "a@b.com");
        assert_eq!(command.password, "StrongPass#2026");
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let errors = request(None, None).try_into_command().unwrap_err();

        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({
                "email": ["This field is required."],
                "password": ["This field is required."],
            })
        );
    }

    #[test]
    fn test_invalid_email_is_reported() {
        let errors = request(Some("not-an-email"), Some("StrongPass#2026"))
            .try_into_command()
            .unwrap_err();

        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"email": ["Enter a valid email address."]})
        );
    }
}
