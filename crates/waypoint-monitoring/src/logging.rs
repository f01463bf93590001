//! Log subscriber setup.
//!
//! Every coordinator runs inside a `coordinator` span carrying its id and flow
//! name, so the events of one flow can be followed through a tree. JSON output
//! also reports when each coordinator span closes.

use anyhow::Context;
use once_cell::sync::OnceCell;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::MonitoringConfig;

static LOGGING: OnceCell<()> = OnceCell::new();

/// Install the global subscriber described by `config`
///
/// `RUST_LOG` takes precedence over the configured filter. Only the first
/// call installs a subscriber; later calls return `Ok(())`.
pub fn init_logging(config: &MonitoringConfig) -> anyhow::Result<()> {
    LOGGING.get_or_try_init(|| install(config)).map(|_| ())
}

/// Whether [`init_logging`] installed a subscriber
pub fn is_initialized() -> bool {
    LOGGING.get().is_some()
}

/// The filter `init_logging` would install
pub fn filter_for(config: &MonitoringConfig) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.log_filter)
            .with_context(|| format!("Invalid log filter: {}", config.log_filter)),
    }
}

fn install(config: &MonitoringConfig) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(filter_for(config)?);

    let installed = if config.enable_json_logging {
        let layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_span_events(FmtSpan::CLOSE);
        tracing::subscriber::set_global_default(registry.with(layer))
    } else {
        let layer = fmt::layer().pretty().with_target(false);
        tracing::subscriber::set_global_default(registry.with(layer))
    };
    installed.context("Failed to set global default subscriber")?;

    info!(
        service_name = %config.service_name,
        log_format = if config.enable_json_logging { "json" } else { "pretty" },
        "Logging initialized"
    );
    Ok(())
}

/// Route coordinator logs to the test output; safe to call from every test
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("waypoint_core=debug,waypoint_monitoring=debug")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_filter_is_used() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = MonitoringConfig {
            log_filter: "waypoint_core=trace".to_string(),
            ..MonitoringConfig::default()
        };
        let filter = filter_for(&config).unwrap();
        assert_eq!(filter.to_string(), "waypoint_core=trace");
    }

    #[test]
    fn test_invalid_filter_is_reported() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = MonitoringConfig {
            log_filter: "waypoint_core=[".to_string(),
            ..MonitoringConfig::default()
        };
        let error = filter_for(&config).unwrap_err();
        assert!(error.to_string().contains("Invalid log filter"));
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        let config = MonitoringConfig::default();
        // A test subscriber may already be installed; only the second call is certain
        let _ = init_logging(&config);
        if is_initialized() {
            assert!(init_logging(&config).is_ok());
        }
    }
}
