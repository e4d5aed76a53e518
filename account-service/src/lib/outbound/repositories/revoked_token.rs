use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::token::errors::TokenError;
use crate::token::models::RevokedToken;
use crate::token::models::TokenId;
use crate::token::ports::RevocationRepository;

/// Token denylist stored in the `revoked_tokens` table, keyed by `jti`.
pub struct PostgresRevocationRepository {
    pool: PgPool,
}

impl PostgresRevocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationRepository for PostgresRevocationRepository {
    async fn insert(&self, token: RevokedToken) -> Result<bool, TokenError> {
        let result = sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, account_id, token_type, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(token.id.as_str())
        .bind(token.account_id.map(|id| id.0))
        .bind(token.token_type.as_str())
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .execute(&self.pool)
        .await
        .map_err(|e| TokenError::StorageError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn contains(&self, id: &TokenId) -> Result<bool, TokenError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| TokenError::StorageError(e.to_string()))?;

        Ok(exists)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| TokenError::StorageError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
