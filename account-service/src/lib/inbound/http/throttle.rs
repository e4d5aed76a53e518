use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;

use super::handlers::ApiError;
use super::middleware::AuthenticatedAccount;
use crate::config::ThrottleRate;

/// Above this many tracked clients, windows that have already ended are dropped.
const PURGE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter for one throttle scope.
///
/// Clients are identified by account when the request is authenticated, by peer IP
/// otherwise.
pub struct FixedWindowThrottle {
    scope: &'static str,
    rate: ThrottleRate,
    windows: DashMap<String, Window>,
}

impl FixedWindowThrottle {
    pub fn new(scope: &'static str, rate: ThrottleRate) -> Self {
        Self {
            scope,
            rate,
            windows: DashMap::new(),
        }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    /// Count one request for `client`.
    ///
    /// # Errors
    /// Time until the client's current window ends, when its budget is spent
    pub fn check(&self, client: &str) -> Result<(), Duration> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Result<(), Duration> {
        // Must run before an entry guard is held: retain locks every shard.
        if self.windows.len() > PURGE_THRESHOLD {
            self.purge_stale(now);
        }

        let mut window = self.windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        let elapsed = now.saturating_duration_since(window.started);
        if elapsed >= self.rate.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.rate.requests {
            let elapsed = now.saturating_duration_since(window.started);
            return Err(self.rate.window.saturating_sub(elapsed));
        }

        window.count += 1;
        Ok(())
    }

    fn purge_stale(&self, now: Instant) {
        let window = self.rate.window;
        self.windows
            .retain(|_, entry| now.saturating_duration_since(entry.started) < window);
    }
}

/// Middleware rejecting requests over the scope's budget with 429.
pub async fn throttle(
    State(throttle): State<Arc<FixedWindowThrottle>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = client_key(&req);

    if let Err(wait) = throttle.check(&client) {
        tracing::warn!(
            scope = throttle.scope(),
            client = %client,
            retry_after_secs = wait.as_secs(),
            "Request throttled"
        );
        return Err(ApiError::TooManyRequests(wait));
    }

    Ok(next.run(req).await)
}

fn client_key(req: &Request) -> String {
    if let Some(account) = req.extensions().get::<AuthenticatedAccount>() {
        return format!("account:{}", account.account_id);
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
        .unwrap_or_else(|| "unknown".to_string())
}
