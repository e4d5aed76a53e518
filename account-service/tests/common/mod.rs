use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use account_service::account::errors::AccountError;
use account_service::account::models::Account;
use account_service::account::models::AccountId;
use account_service::account::models::EmailAddress;
use account_service::account::ports::AccountRepository;
use account_service::account::service::AuthService;
use account_service::config::Config;
use account_service::config::CorsConfig;
use account_service::config::DatabaseConfig;
use account_service::config::JwtConfig;
use account_service::config::ServerConfig;
use account_service::config::ThrottleConfig;
use account_service::config::ThrottleRate;
use account_service::inbound::http::router::create_router;
use account_service::token::errors::TokenError;
use account_service::token::models::RevokedToken;
use account_service::token::models::TokenId;
use account_service::token::ports::RevocationRepository;
use account_service::token::service::TokenService;
use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenIssuer;
use chrono::DateTime;
use chrono::Utc;
use serde_json::json;
use serde_json::Value;
use tokio::sync::Barrier;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const STRONG_PASSWORD: &str = "StrongPass#2026";

/// Test application that spawns a real server over in-memory storage
pub struct TestApp {
    pub address: String,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub revocations: Arc<InMemoryRevocationRepository>,
    pub api_client: reqwest::Client,
    pub token_issuer: TokenIssuer,
}

impl TestApp {
    /// Spawn the application with limits high enough to never throttle
    pub async fn spawn() -> Self {
        let generous = ThrottleRate::per_minute(10_000);
        Self::spawn_with_throttle(ThrottleConfig {
            enabled: true,
            register: generous,
            login: generous,
            refresh: generous,
            logout: generous,
        })
        .await
    }

    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with_throttle(throttle: ThrottleConfig) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let config = Config {
            database: DatabaseConfig {
                url: "postgresql://unused".to_string(),
                max_connections: 1,
            },
            server: ServerConfig { http_port: port },
            jwt: JwtConfig {
                secret: String::from_utf8(JWT_SECRET.to_vec()).unwrap(),
                access_token_minutes: 15,
                refresh_token_days: 7,
            },
            cors: CorsConfig::default(),
            throttle,
        };

        let accounts = Arc::new(InMemoryAccountRepository::default());
        let revocations = Arc::new(InMemoryRevocationRepository::default());

        let lifetimes = config.jwt.lifetimes().expect("Invalid token lifetimes");
        let authenticator = Arc::new(Authenticator::new(JWT_SECRET, lifetimes));
        let token_service = Arc::new(TokenService::new(
            Arc::clone(&authenticator),
            Arc::clone(&revocations),
        ));
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&accounts),
            token_service,
            authenticator,
        ));

        let router = create_router(auth_service, &config);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server error");
        });

        Self {
            address,
            accounts,
            revocations,
            api_client: reqwest::Client::new(),
            token_issuer: TokenIssuer::new(JWT_SECRET, lifetimes),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/register")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn refresh(&self, refresh: &str) -> reqwest::Response {
        self.post("/api/auth/refresh")
            .json(&json!({ "refresh": refresh }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn logout(&self, access: &str, refresh: &str) -> reqwest::Response {
        self.post_authenticated("/api/auth/logout", access)
            .json(&json!({ "refresh": refresh }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register an account and return the `{user, tokens}` body
    pub async fn register_account(&self, email: &str) -> Value {
        let response = self.register(email, STRONG_PASSWORD).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }
}

/// Holds callers after a read until the armed number of them have all read.
///
/// Lets a test line up concurrent requests behind the same stale view so the
/// write that follows has to settle the conflict.
#[derive(Default)]
pub struct LookupGate(Mutex<Option<Arc<Barrier>>>);

impl LookupGate {
    pub fn arm(&self, callers: usize) {
        *self.0.lock().unwrap() = Some(Arc::new(Barrier::new(callers)));
    }

    async fn pass(&self) {
        let barrier = self.0.lock().unwrap().clone();
        if let Some(barrier) = barrier {
            if barrier.wait().await.is_leader() {
                self.0.lock().unwrap().take();
            }
        }
    }
}

/// Account store with the same atomic e-mail uniqueness as the database
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<HashMap<AccountId, Account>>,
    conflicts: AtomicUsize,
    pub email_lookups: LookupGate,
}

impl InMemoryAccountRepository {
    pub fn count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    /// Inserts refused by the uniqueness check
    pub fn conflicts(&self) -> usize {
        self.conflicts.load(Ordering::SeqCst)
    }

    pub fn set_active(&self, email: &str, is_active: bool) {
        let mut accounts = self.accounts.lock().unwrap();
        for account in accounts.values_mut() {
            if account.email.as_str() == email {
                account.capabilities.is_active = is_active;
            }
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.lock().unwrap();

        if accounts.values().any(|existing| existing.email == account.email) {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(AccountError::EmailAlreadyExists(
                account.email.as_str().to_string(),
            ));
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.lock().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError> {
        let found = self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|account| &account.email == email)
            .cloned();

        self.email_lookups.pass().await;
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryRevocationRepository {
    entries: Mutex<HashMap<TokenId, RevokedToken>>,
    conflicts: AtomicUsize,
    pub denylist_checks: LookupGate,
}

impl InMemoryRevocationRepository {
    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Inserts refused because the token was already revoked
    pub fn conflicts(&self) -> usize {
        self.conflicts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RevocationRepository for InMemoryRevocationRepository {
    async fn insert(&self, token: RevokedToken) -> Result<bool, TokenError> {
        let mut entries = self.entries.lock().unwrap();

        if entries.contains_key(&token.id) {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
            return Ok(false);
        }

        entries.insert(token.id.clone(), token);
        Ok(true)
    }

    async fn contains(&self, id: &TokenId) -> Result<bool, TokenError> {
        let revoked = self.entries.lock().unwrap().contains_key(id);

        self.denylist_checks.pass().await;
        Ok(revoked)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenError> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at >= now);
        Ok((before - entries.len()) as u64)
    }
}
