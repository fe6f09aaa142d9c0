use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.hostaway.com/v1";
pub const DEFAULT_BOOKING_ENGINE_BASE_URL: &str = "https://182003_1.holidayfuture.com";
/// Provider tokens are reused for one week unless overridden.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub provider: ProviderConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            provider: ProviderConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Upstream provider access and the listing allow-list.
///
/// Secrets and listing ids are optional here; their absence is reported per
/// request so the service can still start and answer health checks.
#[derive(Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub account_id: Option<String>,
    pub api_key: Option<String>,
    pub listing_ids: Vec<String>,
    pub token_ttl: Duration,
    pub request_timeout: Option<Duration>,
    pub booking_engine_base_url: String,
}

impl ProviderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = non_empty_var("HOSTAWAY_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PROVIDER_BASE_URL.to_string());

        let token_ttl = match non_empty_var("HOSTAWAY_TOKEN_TTL_SECS") {
            None => Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidTokenTtl)?,
        };

        let request_timeout = match non_empty_var("HOSTAWAY_REQUEST_TIMEOUT_SECS") {
            None => None,
            Some(raw) => Some(
                raw.parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or(ConfigError::InvalidTimeout)?,
            ),
        };

        Ok(Self {
            base_url,
            account_id: non_empty_var("HOSTAWAY_ACCOUNT_ID"),
            api_key: non_empty_var("HOSTAWAY_API_KEY"),
            listing_ids: parse_listing_ids(
                &env::var("OCEANVILLAS_LISTING_IDS").unwrap_or_default(),
            ),
            token_ttl,
            request_timeout,
            booking_engine_base_url: non_empty_var("BOOKING_ENGINE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BOOKING_ENGINE_BASE_URL.to_string()),
        })
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("listing_ids", &self.listing_ids)
            .field("token_ttl", &self.token_ttl)
            .field("request_timeout", &self.request_timeout)
            .field("booking_engine_base_url", &self.booking_engine_base_url)
            .finish()
    }
}

/// Comma-separated ids, trimmed, blanks dropped, first occurrence kept.
pub fn parse_listing_ids(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTokenTtl,
    InvalidTimeout,
    MissingListingIds,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTokenTtl => {
                write!(f, "HOSTAWAY_TOKEN_TTL_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "HOSTAWAY_REQUEST_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::MissingListingIds => write!(f, "Missing OCEANVILLAS_LISTING_IDS"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTokenTtl
            | ConfigError::InvalidTimeout
            | ConfigError::MissingListingIds => None,
        }
    }
}
