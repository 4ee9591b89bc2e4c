//! Logging configuration
//!
//! The agent's diagnostics are emitted through `tracing`. [`LoggingConfig`]
//! turns the configuration's `logging` setting into a [`Dispatch`] that the
//! agent and its injectors run under, leaving the host's global subscriber
//! alone.

use serde_json::Value;
use tracing::level_filters::LevelFilter;
use tracing::Dispatch;

/// Diagnostic level of the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingConfig {
    level: LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(LevelFilter::INFO)
    }
}

impl LoggingConfig {
    /// Create with level
    #[inline]
    #[must_use]
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Maximum level emitted
    #[inline]
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Level named by `name`, case-insensitively
    ///
    /// Accepts `OFF`, `SEVERE`, `WARNING`, `INFO`, `CONFIG`, `FINE`, `FINER`,
    /// `FINEST`, `ALL`, the `tracing` level names and numeric severities
    /// (`800` is `INFO`).
    #[must_use]
    pub fn parse_level(name: &str) -> Option<LevelFilter> {
        let name = name.trim().to_ascii_uppercase();
        let level = match name.as_str() {
            "OFF" => LevelFilter::OFF,
            "SEVERE" | "ERROR" => LevelFilter::ERROR,
            "WARNING" | "WARN" => LevelFilter::WARN,
            "INFO" | "CONFIG" => LevelFilter::INFO,
            "FINE" | "DEBUG" => LevelFilter::DEBUG,
            "FINER" | "FINEST" | "ALL" | "TRACE" => LevelFilter::TRACE,
            numeric => return numeric.parse::<i64>().ok().map(numeric_level),
        };
        Some(level)
    }

    /// Build from the configuration's `logging` value
    ///
    /// Unusable values keep the default level and are reported.
    #[must_use]
    pub fn from_setting(setting: Option<&Value>) -> Self {
        let name = match setting {
            None | Some(Value::Null) => return Self::default(),
            Some(Value::String(name)) => name.clone(),
            Some(Value::Number(number)) => number.to_string(),
            Some(other) => other.to_string(),
        };
        match Self::parse_level(&name) {
            Some(level) => Self::new(level),
            None => {
                let config = Self::default();
                tracing::warn!(
                    setting = %name,
                    level = %config.level,
                    "unknown logging level, keeping default"
                );
                config
            }
        }
    }

    /// Subscriber writing formatted diagnostics to standard error
    #[must_use]
    pub fn dispatch(&self) -> Dispatch {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.level)
            .with_writer(std::io::stderr)
            .with_target(true)
            .finish();
        Dispatch::new(subscriber)
    }
}

fn numeric_level(severity: i64) -> LevelFilter {
    match severity {
        i64::MAX => LevelFilter::OFF,
        1000.. => LevelFilter::ERROR,
        900.. => LevelFilter::WARN,
        700.. => LevelFilter::INFO,
        500.. => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}
