//! Configuration for the Waypoint Demo
//!
//! Defaults are compiled in; environment variables override them.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::warn;

use crate::error::{DemoError, DemoResult};

/// Demo configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Whether the user went through onboarding before
    #[serde(default)]
    pub onboarded: bool,

    /// Log level filter
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format, `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// How long the scripted user waits for a screen before giving up
    #[serde(default = "default_step_timeout_ms")]
    pub step_timeout_ms: u64,
}

fn default_log_level() -> String {
    "info,waypoint_core=debug".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_step_timeout_ms() -> u64 {
    2000
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            onboarded: false,
            log_level: default_log_level(),
            log_format: default_log_format(),
            step_timeout_ms: default_step_timeout_ms(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from environment variables
    pub fn load() -> DemoResult<Self> {
        // Start with defaults
        let mut config = Self::default();

        if let Ok(onboarded) = env::var("DEMO_ONBOARDED") {
            config.onboarded = onboarded.to_lowercase() == "true" || onboarded == "1";
        }

        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Ok(log_format) = env::var("LOG_FORMAT") {
            config.log_format = log_format.to_lowercase();
        }

        if let Ok(timeout) = env::var("DEMO_STEP_TIMEOUT_MS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                config.step_timeout_ms = timeout;
            } else {
                warn!("Invalid DEMO_STEP_TIMEOUT_MS value: {}", timeout);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that have no sensible fallback
    pub fn validate(&self) -> DemoResult<()> {
        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            return Err(DemoError::ConfigError(format!(
                "Unknown log format: {}",
                self.log_format
            )));
        }

        if self.step_timeout_ms == 0 {
            return Err(DemoError::ConfigError(
                "Step timeout must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether logs are emitted as JSON lines
    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }

    /// The scripted user's patience
    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }
}
