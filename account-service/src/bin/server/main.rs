mod cli;

use std::net::SocketAddr;
use std::sync::Arc;

use account_service::account::models::EmailAddress;
use account_service::account::models::RegisterCommand;
use account_service::account::ports::AuthServicePort;
use account_service::account::service::AuthService;
use account_service::config::Config;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::PostgresAccountRepository;
use account_service::outbound::repositories::PostgresRevocationRepository;
use account_service::token::service::TokenService;
use anyhow::Context;
use auth::Authenticator;
use cli::Action;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type Service = AuthService<PostgresAccountRepository, TokenService<PostgresRevocationRepository>>;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let action = cli::dispatch(&cli::new().get_matches())?;

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        access_token_minutes = config.jwt.access_token_minutes,
        refresh_token_days = config.jwt.refresh_token_days,
        throttle_enabled = config.throttle.enabled,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let authenticator = Arc::new(Authenticator::new(
        config.jwt.secret.as_bytes(),
        config.jwt.lifetimes()?,
    ));
    let account_repository = Arc::new(PostgresAccountRepository::new(pg_pool.clone()));
    let revocation_repository = Arc::new(PostgresRevocationRepository::new(pg_pool));

    let token_service = Arc::new(TokenService::new(
        Arc::clone(&authenticator),
        revocation_repository,
    ));
    let auth_service: Arc<Service> = Arc::new(AuthService::new(
        account_repository,
        Arc::clone(&token_service),
        authenticator,
    ));

    match action {
        Action::CreateSuperuser { email, password } => {
            create_superuser(&auth_service, &email, password).await
        }
        Action::Serve => {
            match token_service.purge_expired().await {
                Ok(purged) => tracing::info!(purged, "Expired denylist entries purged"),
                Err(e) => tracing::warn!(error = %e, "Denylist purge failed"),
            }

            serve(auth_service, &config).await
        }
    }
}

async fn serve(auth_service: Arc<Service>, config: &Config) -> Result<(), anyhow::Error> {
    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, config);

    axum::serve(
        http_listener,
        http_application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

async fn create_superuser(
    auth_service: &Service,
    email: &str,
    password: String,
) -> Result<(), anyhow::Error> {
    let email = EmailAddress::new(email).context("invalid e-mail address")?;

    let account = auth_service
        .create_superuser(RegisterCommand::new(email, password))
        .await
        .context("superuser creation failed")?;

    tracing::info!(account_id = %account.id, email = %account.email, "Superuser created");

    Ok(())
}
