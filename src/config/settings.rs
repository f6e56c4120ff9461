//! Server and reporting settings for Spendwise
//!
//! Settings persist as `config.json` in the base directory. Every field has a
//! serde default so older files keep loading, and the bind address and port
//! can be overridden from the environment at startup.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::paths::SpendwisePaths;
use crate::error::SpendError;

/// Environment variable overriding the bind address
pub const BIND_ENV: &str = "SPENDWISE_BIND";
/// Environment variable overriding the port
pub const PORT_ENV: &str = "SPENDWISE_PORT";

/// User settings for Spendwise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Address the HTTP API binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// Port the HTTP API listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS; empty allows any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    /// Months shown by the trends report when none are requested
    #[serde(default = "default_trend_months")]
    pub default_trend_months: u32,

    /// Maximum number of rows a CSV export may contain
    #[serde(default = "default_export_row_limit")]
    pub export_row_limit: usize,

    /// Date format used in terminal output (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_bind_address() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    3000
}

fn default_trend_months() -> u32 {
    6
}

fn default_export_row_limit() -> usize {
    5000
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            bind_address: default_bind_address(),
            port: default_port(),
            cors_allowed_origins: Vec::new(),
            default_trend_months: default_trend_months(),
            export_row_limit: default_export_row_limit(),
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &SpendwisePaths) -> Result<Self, SpendError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| SpendError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                SpendError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SpendwisePaths) -> Result<(), SpendError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| SpendError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| SpendError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Apply `SPENDWISE_BIND` / `SPENDWISE_PORT` overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), SpendError> {
        if let Some(bind) = env_override(BIND_ENV)? {
            self.bind_address = bind;
        }
        if let Some(port) = env_override(PORT_ENV)? {
            self.port = port;
        }
        Ok(())
    }

    /// The socket address the server listens on
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

fn env_override<T>(key: &str) -> Result<Option<T>, SpendError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => {
            let value = raw.trim().parse().map_err(|e| {
                warn!("Invalid {key} value: {e}");
                SpendError::Config(format!("Invalid {} value '{}': {}", key, raw, e))
            })?;
            info!("{key} set, overriding configured value");
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}
