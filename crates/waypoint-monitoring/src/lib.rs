//! Monitoring module for the Waypoint platform: log setup and navigation
//! observation.

use std::env;
use tracing::{info, warn};

pub mod logging;
pub mod metrics;
pub mod observer;

/// Environment variable overriding [`MonitoringConfig::service_name`]
pub const SERVICE_NAME_ENV: &str = "WAYPOINT_SERVICE_NAME";

/// Environment variable overriding [`MonitoringConfig::log_filter`]
pub const LOG_FILTER_ENV: &str = "WAYPOINT_LOG";

/// Environment variable selecting the log format, `json` or `pretty`
pub const LOG_FORMAT_ENV: &str = "WAYPOINT_LOG_FORMAT";

/// Environment variable toggling [`MonitoringConfig::enable_metrics`]
pub const METRICS_ENV: &str = "WAYPOINT_METRICS";

/// Configuration for initializing the monitoring system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Record navigation metrics from observed events
    pub enable_metrics: bool,
    /// Log level filter (e.g., "info,waypoint_core=debug")
    pub log_filter: String,
    /// Emit JSON lines instead of human readable output
    pub enable_json_logging: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: "waypoint".to_string(),
            enable_metrics: true,
            log_filter: "info".to_string(),
            enable_json_logging: false,
        }
    }
}

impl MonitoringConfig {
    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = env::var(SERVICE_NAME_ENV) {
            config.service_name = name;
        }

        if let Ok(filter) = env::var(LOG_FILTER_ENV) {
            config.log_filter = filter;
        }

        if let Ok(format) = env::var(LOG_FORMAT_ENV) {
            match format.to_lowercase().as_str() {
                "json" => config.enable_json_logging = true,
                "pretty" => config.enable_json_logging = false,
                _ => warn!("Invalid {} value: {}", LOG_FORMAT_ENV, format),
            }
        }

        if let Ok(metrics) = env::var(METRICS_ENV) {
            match metrics.parse::<bool>() {
                Ok(enabled) => config.enable_metrics = enabled,
                Err(_) => warn!("Invalid {} value: {}", METRICS_ENV, metrics),
            }
        }

        config
    }
}

/// Initialize the monitoring system
pub fn init(config: &MonitoringConfig) -> anyhow::Result<()> {
    logging::init_logging(config)?;
    info!(
        service_name = %config.service_name,
        metrics = config.enable_metrics,
        "Monitoring initialized"
    );
    Ok(())
}

/// Shutdown the monitoring system
pub fn shutdown() {
    info!("Shutting down monitoring system");
}


// Exported types
pub use crate::metrics::{NavigationMetrics, NavigationStats};
pub use crate::observer::NavigationObserver;
