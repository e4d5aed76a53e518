use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::errors::AuthError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AuthenticatedSession;
use crate::account::models::EmailAddress;
use crate::account::models::LoginCommand;
use crate::account::models::RegisterCommand;
use crate::token::models::TokenPair;

/// Port for the authentication protocol: register, login, refresh, logout.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account and issue its first token pair.
    ///
    /// # Errors
    /// * `DuplicateAccount` - An account with this normalized e-mail exists, including
    ///   when a concurrent registration wins the race
    /// * `WeakPassword` - Password breaks the password policy
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<AuthenticatedSession, AuthError>;

    /// Authenticate with e-mail and password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown e-mail, wrong password or inactive account,
    ///   indistinguishably
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, command: LoginCommand) -> Result<AuthenticatedSession, AuthError>;

    /// Redeem a refresh token for a new pair, revoking the presented one.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, expired, already used or revoked token, or the
    ///   account is gone or inactive
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Revoke one of the caller's refresh tokens.
    ///
    /// Tokens that are already meaningless (malformed, expired, revoked, subject-less)
    /// are accepted silently.
    ///
    /// # Errors
    /// * `Forbidden` - The token belongs to another account
    async fn logout(&self, caller: &AccountId, refresh_token: &str) -> Result<(), AuthError>;

    /// Resolve an access token to the active account it was issued to.
    ///
    /// # Errors
    /// * `InvalidToken` - Token does not verify, or the account is gone or inactive
    async fn authenticate(&self, access_token: &str) -> Result<Account, AuthError>;

    /// Create an account holding every administrative capability.
    ///
    /// # Errors
    /// Same as `register`
    async fn create_superuser(&self, command: RegisterCommand) -> Result<Account, AuthError>;
}

/// Persistence operations for the account aggregate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new account.
    ///
    /// Uniqueness of the e-mail is enforced atomically by the store.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - E-mail is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, account: Account) -> Result<Account, AccountError>;

    /// Retrieve account by identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Retrieve account by normalized e-mail.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError>;
}
