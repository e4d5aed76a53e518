use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::FieldErrors;
use crate::account::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::token::models::TokenPair;

pub async fn refresh<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<ApiSuccess<RefreshResponseData>, ApiError> {
    let Json(body) = body?;

    let mut errors = FieldErrors::default();
    let Some(refresh_token) = errors.require("refresh", body.refresh) else {
        return Err(errors.into());
    };

    state
        .auth_service
        .refresh(&refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|ref tokens| ApiSuccess::new(StatusCode::OK, tokens.into()))
}

/// Body shared by refresh and logout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    pub access: String,
    pub refresh: String,
}

impl From<&TokenPair> for RefreshResponseData {
    fn from(tokens: &TokenPair) -> Self {
        Self {
            access: tokens.access.clone(),
            refresh: tokens.refresh.clone(),
        }
    }
}
