use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::MethodRouter;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use super::throttle::throttle;
use super::throttle::FixedWindowThrottle;
use crate::account::ports::AuthServicePort;
use crate::config::Config;
use crate::config::CorsConfig;
use crate::config::ThrottleConfig;
use crate::config::ThrottleRate;

pub struct AppState<S: AuthServicePort> {
    pub auth_service: Arc<S>,
}

impl<S: AuthServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
        }
    }
}

pub fn create_router<S: AuthServicePort>(auth_service: Arc<S>, config: &Config) -> Router {
    let state = AppState { auth_service };
    let limits = &config.throttle;

    let auth_routes = Router::new()
        .route(
            "/register",
            throttled(post(register::<S>), "auth_register", limits, limits.register),
        )
        .route(
            "/login",
            throttled(post(login::<S>), "auth_login", limits, limits.login),
        )
        .route(
            "/refresh",
            throttled(post(refresh::<S>), "auth_refresh", limits, limits.refresh),
        )
        .route(
            "/logout",
            // The throttle runs after authentication so it can key on the account
            throttled(post(logout::<S>), "auth_logout", limits, limits.logout).route_layer(
                middleware::from_fn_with_state(state.clone(), auth_middleware::<S>),
            ),
        );

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", auth_routes)
        .layer(trace_layer)
        .layer(cors_layer(&config.cors))
        .with_state(state)
}

fn throttled<S: AuthServicePort>(
    route: MethodRouter<AppState<S>>,
    scope: &'static str,
    limits: &ThrottleConfig,
    rate: ThrottleRate,
) -> MethodRouter<AppState<S>> {
    if !limits.enabled {
        return route;
    }

    let limiter = Arc::new(FixedWindowThrottle::new(scope, rate));
    route.route_layer(middleware::from_fn_with_state(limiter, throttle))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
