//! Structured logging setup
//!
//! `RUST_LOG` takes precedence over the configured level. JSON output emits
//! one object per line with a `fields` map for the structured values.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `studentdb=debug,tower_http=info`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Build the filter: `RUST_LOG` when set, otherwise the configured level
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logging(config: &LogConfig) {
    let filter = env_filter(config);

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()
    };

    if result.is_ok() {
        tracing::debug!(level = %config.level, json = config.json, "logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
    }

    #[test]
    fn test_invalid_level_falls_back() {
        let config = LogConfig {
            level: "[[not a filter".to_string(),
            json: false,
        };
        // Must not panic
        let _filter = env_filter(&config);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logging(&LogConfig::default());
        init_logging(&LogConfig {
            level: "debug".to_string(),
            json: true,
        });
    }
}
