//! HTTP Server Configuration
//!
//! Precedence, lowest to highest: built-in defaults, JSON config file,
//! environment variables, command-line flags.
//!
//! | Field | Env | Default |
//! |---|---|---|
//! | `host` | `HOST` | `0.0.0.0` |
//! | `port` | `PORT` | `3000` |
//! | `store_uri` | `STUDENTDB_URI` | `file://./data/studentdb` |
//! | `log_level` | `LOG_LEVEL` | `info` |
//! | `log_json` | `LOG_JSON` | `false` |

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_STORE_URI: &str = "STUDENTDB_URI";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "LOG_JSON";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Store connection string (default: "file://./data/studentdb")
    #[serde(default = "default_store_uri")]
    pub store_uri: String,

    /// CORS allowed origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Log filter used when RUST_LOG is unset (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines (default: false)
    #[serde(default)]
    pub log_json: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_store_uri() -> String {
    "file://./data/studentdb".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            store_uri: default_store_uri(),
            cors_origins: Vec::new(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl ServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Load a JSON config file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Apply overrides from the process environment
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(std::env::vars().collect())
    }

    /// Apply overrides from an explicit variable map
    pub fn apply_vars(mut self, vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        if let Some(host) = non_empty(&vars, ENV_HOST) {
            self.host = host.to_string();
        }
        if let Some(port) = non_empty(&vars, ENV_PORT) {
            self.port = port.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: ENV_PORT,
                    value: port.to_string(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(uri) = non_empty(&vars, ENV_STORE_URI) {
            self.store_uri = uri.to_string();
        }
        if let Some(level) = non_empty(&vars, ENV_LOG_LEVEL) {
            self.log_level = level.to_string();
        }
        if let Some(json) = non_empty(&vars, ENV_LOG_JSON) {
            self.log_json = parse_bool(ENV_LOG_JSON, json)?;
        }
        Ok(self)
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
