use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The loosely-typed attribute map standalone checks are configured with.
///
/// Recognized keys are `command` (string) and `interval` (number, seconds);
/// everything else is ignored.
pub type Attributes = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    /// An attribute key is present but carries the wrong JSON type.
    #[error("attribute '{key}' must be {expected}")]
    InvalidType {
        key: &'static str,
        expected: &'static str,
    },
    /// The check has no command (and no other check capability) configured.
    #[error("no command for check '{check}'")]
    NoCommand { check: String },
    /// The check has no interval, or a non-positive one.
    #[error("no interval for check '{check}'")]
    NoInterval { check: String },
}

// ---------------------------------------------------------------------------
// StandaloneConfig
// ---------------------------------------------------------------------------

/// Statically validated configuration for one standalone check.
///
/// Both fields are optional at construction; whether their absence is fatal
/// is decided at start time, when the scheduler checks its preconditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandaloneConfig {
    /// Command line to run through the platform shell.
    pub command: Option<String>,
    /// Seconds between executions.
    pub interval: Option<f64>,
}

impl StandaloneConfig {
    /// Validate an attribute map into a typed configuration.
    ///
    /// A present-but-wrong-typed key is a [`ConfigError::InvalidType`]
    /// naming the key; unknown keys pass through silently.
    pub fn from_attributes(attributes: &Attributes) -> Result<Self, ConfigError> {
        let command = match attributes.get("command") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(ConfigError::InvalidType {
                    key: "command",
                    expected: "a string",
                })
            }
        };

        let interval = match attributes.get("interval") {
            None => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(_) => {
                return Err(ConfigError::InvalidType {
                    key: "interval",
                    expected: "a number of seconds",
                })
            }
        };

        Ok(Self { command, interval })
    }

    /// The configured interval as a duration, if it is usable for
    /// scheduling. Absent, non-positive, and non-finite values all yield
    /// `None`.
    pub fn interval_duration(&self) -> Option<Duration> {
        self.interval
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
