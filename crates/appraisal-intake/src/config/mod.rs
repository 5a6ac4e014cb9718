use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_SUPABASE_URL: &str = "https://mouhzmxwelqpofntplxc.supabase.co";
pub const DEFAULT_SUPABASE_TABLE: &str = "property_evaluations";
pub const DEFAULT_WEBHOOK_URL: &str = "https://n8n.felipeteti.com/webhook/formulario";
pub const DEFAULT_CEP_LOOKUP_URL: &str = "https://viacep.com.br/ws";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

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
    pub channels: ChannelsConfig,
    pub report: ReportConfig,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        let timeout_secs = var_or("HTTP_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let channels = ChannelsConfig {
            supabase_url: var_or("SUPABASE_URL", DEFAULT_SUPABASE_URL),
            supabase_key: optional_var("SUPABASE_KEY"),
            supabase_table: var_or("SUPABASE_TABLE", DEFAULT_SUPABASE_TABLE),
            webhook_url: var_or("WEBHOOK_URL", DEFAULT_WEBHOOK_URL),
            cep_lookup_url: var_or("CEP_LOOKUP_URL", DEFAULT_CEP_LOOKUP_URL),
            timeout: Duration::from_secs(timeout_secs),
        };

        let report = ReportConfig {
            api_key: optional_var("GEMINI_API_KEY"),
            model: var_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            channels,
            report,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Endpoints of the persistence store, notification hook and postal-code
/// lookup, sharing one outbound timeout.
#[derive(Debug, Clone)]
pub struct ChannelsConfig {
    pub supabase_url: String,
    pub supabase_key: Option<String>,
    pub supabase_table: String,
    pub webhook_url: String,
    pub cep_lookup_url: String,
    pub timeout: Duration,
}

impl ChannelsConfig {
    pub fn supabase_key(&self) -> Result<&str, ConfigError> {
        self.supabase_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential {
                name: "SUPABASE_KEY",
            })
    }
}

/// Report generation is enabled only when an API key is present.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
    MissingCredential { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "HTTP_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::MissingCredential { name } => write!(f, "{} must be set", name),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout
            | ConfigError::MissingCredential { .. } => None,
        }
    }
}
