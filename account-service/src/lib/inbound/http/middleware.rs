use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::account::errors::AuthError;
use crate::account::models::AccountId;
use crate::account::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extension type to store the authenticated account in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub account_id: AccountId,
}

/// Middleware that validates the bearer access token and adds the account to request extensions
pub async fn authenticate<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?.to_string();

    let account = state.auth_service.authenticate(&token).await.map_err(|e| {
        if matches!(e, AuthError::InvalidToken) {
            tracing::warn!("Bearer token rejected");
        }
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(AuthenticatedAccount {
        account_id: account.id,
    });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let Some(auth_header) = req.headers().get(header::AUTHORIZATION) else {
        return Err(ApiError::not_authenticated());
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::token_not_valid())?;

    // Any other scheme is treated as absent credentials
    let Some(token) = auth_str.strip_prefix(BEARER_PREFIX) else {
        return Err(ApiError::not_authenticated());
    };

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::token_not_valid());
    }

    Ok(token)
}
