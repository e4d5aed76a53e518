use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;

use crate::account::errors::AuthError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AuthenticatedSession;
use crate::account::models::Capabilities;
use crate::account::models::EmailAddress;
use crate::account::models::LoginCommand;
use crate::account::models::RegisterCommand;
use crate::account::ports::AccountRepository;
use crate::account::ports::AuthServicePort;
use crate::token::models::TokenPair;
use crate::token::models::TokenType;
use crate::token::ports::TokenServicePort;

/// Domain service implementing the authentication protocol.
///
/// Stateless apart from the injected store, token service and authenticator.
pub struct AuthService<AR, TS>
where
    AR: AccountRepository,
    TS: TokenServicePort,
{
    accounts: Arc<AR>,
    tokens: Arc<TS>,
    authenticator: Arc<Authenticator>,
}

impl<AR, TS> AuthService<AR, TS>
where
    AR: AccountRepository,
    TS: TokenServicePort,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `accounts` - Account persistence implementation
    /// * `tokens` - Token issuance, verification and revocation
    /// * `authenticator` - Password hashing and policy
    pub fn new(accounts: Arc<AR>, tokens: Arc<TS>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            accounts,
            tokens,
            authenticator,
        }
    }

    /// Shared path of register and create_superuser: existence pre-check, policy,
    /// hashing, insert. The insert's uniqueness violation is the final arbiter.
    async fn create_account(
        &self,
        command: RegisterCommand,
        capabilities: Capabilities,
    ) -> Result<Account, AuthError> {
        if self.accounts.find_by_email(&command.email).await?.is_some() {
            return Err(AuthError::DuplicateAccount);
        }

        self.authenticator
            .check_password_strength(&command.password, command.email.as_str())
            .map_err(|violations| {
                AuthError::WeakPassword(violations.iter().map(ToString::to_string).collect())
            })?;

        let password_hash = self.authenticator.hash_password(&command.password)?;
        let account = Account::new(command.email, password_hash, capabilities);

        let created = self.accounts.create(account).await.map_err(|e| {
            let err = AuthError::from(e);
            if matches!(err, AuthError::DuplicateAccount) {
                tracing::info!("Concurrent registration lost the uniqueness race");
            }
            err
        })?;

        Ok(created)
    }

    async fn active_account(&self, id: &AccountId) -> Result<Option<Account>, AuthError> {
        Ok(self
            .accounts
            .find_by_id(id)
            .await?
            .filter(Account::is_active))
    }
}

#[async_trait]
impl<AR, TS> AuthServicePort for AuthService<AR, TS>
where
    AR: AccountRepository,
    TS: TokenServicePort,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthenticatedSession, AuthError> {
        let account = self
            .create_account(command, Capabilities::default())
            .await?;
        let tokens = self.tokens.issue(&account.id)?;

        tracing::info!(account_id = %account.id, "Account registered");

        Ok(AuthenticatedSession { account, tokens })
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthenticatedSession, AuthError> {
        let account = match EmailAddress::new(&command.email) {
            Ok(email) => self.accounts.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(account) = account else {
            self.authenticator.reject_unknown(&command.password);
            tracing::warn!("Login failed: unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        match self
            .authenticator
            .verify_credentials(&command.password, &account.password_hash)
        {
            Ok(()) => {}
            Err(AuthenticationError::InvalidCredentials) => {
                tracing::warn!(account_id = %account.id, "Login failed: wrong password");
                return Err(AuthError::InvalidCredentials);
            }
            Err(AuthenticationError::PasswordError(e)) => return Err(e.into()),
        }

        if !account.is_active() {
            tracing::warn!(account_id = %account.id, "Login failed: inactive account");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.tokens.issue(&account.id)?;

        tracing::info!(account_id = %account.id, "Account logged in");

        Ok(AuthenticatedSession { account, tokens })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let verified = self
            .tokens
            .verify(refresh_token, TokenType::Refresh)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token rejected");
                AuthError::from(e)
            })?;

        let account_id = verified.account_id().ok_or(AuthError::InvalidToken)?;
        let account = self
            .active_account(&account_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !self.tokens.revoke(&verified).await? {
            tracing::warn!(
                account_id = %account.id,
                jti = %verified.id,
                "Refresh token redeemed concurrently"
            );
            return Err(AuthError::InvalidToken);
        }

        let tokens = self.tokens.issue(&account.id)?;

        tracing::info!(account_id = %account.id, "Refresh token rotated");

        Ok(tokens)
    }

    async fn logout(&self, caller: &AccountId, refresh_token: &str) -> Result<(), AuthError> {
        let verified = match self.tokens.verify(refresh_token, TokenType::Refresh).await {
            Ok(verified) => verified,
            Err(e) if e.is_rejection() => {
                tracing::debug!(account_id = %caller, error = %e, "Logout with unusable token");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let Some(subject) = verified.subject.as_deref() else {
            return Ok(());
        };

        if subject != caller.to_string() {
            tracing::warn!(
                account_id = %caller,
                jti = %verified.id,
                "Attempt to revoke another account's token"
            );
            return Err(AuthError::Forbidden);
        }

        if self.tokens.revoke(&verified).await? {
            tracing::info!(account_id = %caller, "Account logged out");
        }

        Ok(())
    }

    async fn authenticate(&self, access_token: &str) -> Result<Account, AuthError> {
        let verified = self.tokens.verify(access_token, TokenType::Access).await?;
        let account_id = verified.account_id().ok_or(AuthError::InvalidToken)?;

        self.active_account(&account_id)
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    async fn create_superuser(&self, command: RegisterCommand) -> Result<Account, AuthError> {
        let account = self
            .create_account(command, Capabilities::superuser())
            .await?;

        tracing::info!(account_id = %account.id, "Superuser created");

        Ok(account)
    }
}
