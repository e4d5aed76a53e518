use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::DateTime;
use chrono::Utc;

use crate::account::models::AccountId;
use crate::token::errors::TokenError;
use crate::token::models::RevokedToken;
use crate::token::models::TokenId;
use crate::token::models::TokenPair;
use crate::token::models::TokenType;
use crate::token::models::VerifiedToken;
use crate::token::ports::RevocationRepository;
use crate::token::ports::TokenServicePort;

/// JWT-backed token service with a persisted denylist.
pub struct TokenService<RR>
where
    RR: RevocationRepository,
{
    authenticator: Arc<Authenticator>,
    revocations: Arc<RR>,
}

impl<RR> TokenService<RR>
where
    RR: RevocationRepository,
{
    /// # Arguments
    /// * `authenticator` - Signs and verifies tokens
    /// * `revocations` - Denylist persistence
    pub fn new(authenticator: Arc<Authenticator>, revocations: Arc<RR>) -> Self {
        Self {
            authenticator,
            revocations,
        }
    }

    /// Remove denylist entries whose tokens can no longer verify anyway.
    pub async fn purge_expired(&self) -> Result<u64, TokenError> {
        self.revocations.purge_expired(Utc::now()).await
    }
}

#[async_trait]
impl<RR> TokenServicePort for TokenService<RR>
where
    RR: RevocationRepository,
{
    fn issue(&self, account_id: &AccountId) -> Result<TokenPair, TokenError> {
        let issued = self.authenticator.issue_tokens(account_id)?;

        Ok(TokenPair {
            access: issued.access.token,
            refresh: issued.refresh.token,
        })
    }

    async fn verify(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<VerifiedToken, TokenError> {
        let claims = self.authenticator.validate_token(token, expected)?;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::Malformed(format!("exp out of range: {}", claims.exp)))?;

        let verified = VerifiedToken {
            id: TokenId(claims.jti),
            subject: claims.sub,
            token_type: claims.token_type,
            expires_at,
        };

        if verified.token_type == TokenType::Refresh && self.is_revoked(&verified.id).await? {
            return Err(TokenError::Revoked);
        }

        Ok(verified)
    }

    async fn revoke(&self, token: &VerifiedToken) -> Result<bool, TokenError> {
        let revoked = self
            .revocations
            .insert(RevokedToken::from_verified(token))
            .await?;

        if revoked {
            tracing::debug!(jti = %token.id, token_type = %token.token_type, "Token revoked");
        }

        Ok(revoked)
    }

    async fn is_revoked(&self, id: &TokenId) -> Result<bool, TokenError> {
        self.revocations.contains(id).await
    }
}
