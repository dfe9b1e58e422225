use crate::queue::QueueScope;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

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
    pub queue: QueueConfig,
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

        let snapshot_path = env::var("QUEUE_SNAPSHOT_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let refresh_secs = env::var("QUEUE_REFRESH_SECS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_SECS.to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidRefreshInterval)?;
        let scope = queue_scope(
            &env::var("QUEUE_SCOPE").unwrap_or_else(|_| "team".to_string()),
            env::var("QUEUE_SCOPE_TOKEN").ok(),
        )?;
        let roster_path = env::var("QUEUE_ROSTER_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            queue: QueueConfig {
                snapshot_path,
                refresh_interval: Duration::from_secs(refresh_secs),
                scope,
                roster_path,
            },
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

pub const DEFAULT_REFRESH_SECS: u64 = 5;

/// Where the queue snapshot comes from and how often it is pulled again.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub snapshot_path: Option<PathBuf>,
    pub refresh_interval: Duration,
    pub scope: QueueScope,
    /// JSON array of staff identities used to label workloads.
    pub roster_path: Option<PathBuf>,
}

/// `QUEUE_SCOPE=assigned` serves only items assigned to the token holder and
/// requires `QUEUE_SCOPE_TOKEN`; `team` serves every row.
fn queue_scope(kind: &str, token: Option<String>) -> Result<QueueScope, ConfigError> {
    let token = token
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    match kind.trim().to_ascii_lowercase().as_str() {
        "team" => Ok(QueueScope::Team(token.unwrap_or_else(|| "team".to_string()))),
        "assigned" | "assigned_to" | "mine" => token
            .map(QueueScope::AssignedTo)
            .ok_or(ConfigError::MissingScopeToken),
        _ => Err(ConfigError::InvalidScope),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRefreshInterval,
    InvalidScope,
    MissingScopeToken,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRefreshInterval => {
                write!(f, "QUEUE_REFRESH_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidScope => write!(f, "QUEUE_SCOPE must be 'team' or 'assigned'"),
            ConfigError::MissingScopeToken => {
                write!(f, "QUEUE_SCOPE_TOKEN is required when QUEUE_SCOPE=assigned")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidRefreshInterval
            | ConfigError::InvalidScope
            | ConfigError::MissingScopeToken => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
