use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use auth::TokenLifetimes;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Minimum size of the HS256 signing secret, in bytes.
const MIN_SECRET_LENGTH: usize = 32;
const MAX_ACCESS_TOKEN_MINUTES: i64 = 24 * 60;
const MAX_REFRESH_TOKEN_DAYS: i64 = 365;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: i64,
    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_days: i64,
}

impl JwtConfig {
    /// Token lifetimes, with access tokens capped at a day and refresh tokens at a year.
    pub fn lifetimes(&self) -> Result<TokenLifetimes, ConfigError> {
        let access = within(self.access_token_minutes, MAX_ACCESS_TOKEN_MINUTES)
            .and_then(chrono::Duration::try_minutes)
            .ok_or_else(|| out_of_range("jwt.access_token_minutes", MAX_ACCESS_TOKEN_MINUTES))?;
        let refresh = within(self.refresh_token_days, MAX_REFRESH_TOKEN_DAYS)
            .and_then(chrono::Duration::try_days)
            .ok_or_else(|| out_of_range("jwt.refresh_token_days", MAX_REFRESH_TOKEN_DAYS))?;

        Ok(TokenLifetimes { access, refresh })
    }
}

fn within(value: i64, max: i64) -> Option<i64> {
    (1..=max).contains(&value).then_some(value)
}

fn out_of_range(key: &str, max: i64) -> ConfigError {
    ConfigError::Message(format!("{} must be between 1 and {}", key, max))
}

/// Allowed browser origins. Empty means any origin.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Per-scope request rates for the auth endpoints.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ThrottleConfig {
    pub enabled: bool,
    pub register: ThrottleRate,
    pub login: ThrottleRate,
    pub refresh: ThrottleRate,
    pub logout: ThrottleRate,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            register: ThrottleRate::per_minute(5),
            login: ThrottleRate::per_minute(10),
            refresh: ThrottleRate::per_minute(30),
            logout: ThrottleRate::per_minute(30),
        }
    }
}

/// A request budget per fixed window, written as `"<n>/<second|minute|hour|day>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ThrottleRate {
    pub requests: u32,
    pub window: Duration,
}

impl ThrottleRate {
    pub fn new(requests: u32, window: Duration) -> Self {
        Self { requests, window }
    }

    pub fn per_minute(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(60))
    }
}

impl FromStr for ThrottleRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (count, period) = s
            .split_once('/')
            .ok_or_else(|| format!("invalid throttle rate '{}': expected <n>/<period>", s))?;

        let requests = count
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid throttle count '{}': {}", count, e))?;

        let seconds = match period.trim() {
            "s" | "sec" | "second" => 1,
            "m" | "min" | "minute" => 60,
            "h" | "hour" => 60 * 60,
            "d" | "day" => 24 * 60 * 60,
            other => return Err(format!("invalid throttle period '{}'", other)),
        };

        Ok(Self::new(requests, Duration::from_secs(seconds)))
    }
}

impl TryFrom<String> for ThrottleRate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ThrottleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}s", self.requests, self.window.as_secs())
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_token_minutes() -> i64 {
    15
}

fn default_refresh_token_days() -> i64 {
    7
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, THROTTLE__LOGIN, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }

        self.jwt.lifetimes().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(toml: &str) -> Result<Config, ConfigError> {
        ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    const MINIMAL: &str = r#"
        [database]
        url = "postgresql://localhost/accounts"

        [server]
        http_port = 8000

        [jwt]
        secret = "0123456789abcdef0123456789abcdef"
    "#;

    #[test]
    fn test_parse_throttle_rate() {
        assert_eq!(
            "5/minute".parse::<ThrottleRate>(),
            Ok(ThrottleRate::per_minute(5))
        );
        assert_eq!(
            "100/day".parse::<ThrottleRate>(),
            Ok(ThrottleRate::new(100, Duration::from_secs(86_400)))
        );
        assert_eq!(
            " 3 / s ".parse::<ThrottleRate>(),
            Ok(ThrottleRate::new(3, Duration::from_secs(1)))
        );
    }

    #[test]
    fn test_parse_throttle_rate_rejects_garbage() {
        assert!("5".parse::<ThrottleRate>().is_err());
        assert!("five/minute".parse::<ThrottleRate>().is_err());
        assert!("5/fortnight".parse::<ThrottleRate>().is_err());
    }

    #[test]
    fn test_defaults_apply() {
        let config = from_toml(MINIMAL).unwrap();

        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.lifetimes().unwrap(), TokenLifetimes::default());
        assert!(config.cors.allowed_origins.is_empty());
        assert!(config.throttle.enabled);
        assert_eq!(config.throttle.login, ThrottleRate::per_minute(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_throttle_rates_from_file() {
        let toml = format!(
            "{}\n[throttle]\nenabled = false\nlogin = \"2/second\"\n",
            MINIMAL
        );

        let config = from_toml(&toml).unwrap();

        assert!(!config.throttle.enabled);
        assert_eq!(
            config.throttle.login,
            ThrottleRate::new(2, Duration::from_secs(1))
        );
        assert_eq!(config.throttle.register, ThrottleRate::per_minute(5));
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let toml = MINIMAL.replace("0123456789abcdef0123456789abcdef", "too-short");

        let config = from_toml(&toml).unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_lifetimes_are_bounded() {
        let with_jwt = |extra: &str| {
            let toml = format!("{}\n{}", MINIMAL.trim_end(), extra);
            from_toml(&toml).unwrap()
        };

        for extra in [
            "refresh_token_days = 1000000000",
            "refresh_token_days = 366",
            "access_token_minutes = 1441",
            "access_token_minutes = 0",
            "refresh_token_days = -1",
        ] {
            let config = with_jwt(extra);
            assert!(config.validate().is_err(), "{} should be rejected", extra);
            assert!(config.jwt.lifetimes().is_err());
        }

        let config = with_jwt("access_token_minutes = 1440\nrefresh_token_days = 365");
        assert!(config.validate().is_ok());
        assert_eq!(
            config.jwt.lifetimes().unwrap().refresh,
            chrono::Duration::days(365)
        );
    }
}
