use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use super::refresh::RefreshRequest;
use super::ApiError;
use super::ApiSuccess;
use super::FieldErrors;
use crate::account::ports::AuthServicePort;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

pub async fn logout<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Extension(caller): Extension<AuthenticatedAccount>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<ApiSuccess<LogoutResponseData>, ApiError> {
    let Json(body) = body?;

    let mut errors = FieldErrors::default();
    let Some(refresh_token) = errors.require("refresh", body.refresh) else {
        return Err(errors.into());
    };

    state
        .auth_service
        .logout(&caller.account_id, &refresh_token)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LogoutResponseData {
            detail: "Logout successful.",
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponseData {
    pub detail: &'static str,
}
