use anyhow::{Context, Result};
use waypoint_demo::config::DemoConfig;
use waypoint_monitoring::MonitoringConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment variables
    let config = DemoConfig::load().context("Failed to load configuration")?;

    // Set up monitoring
    let monitoring_config = MonitoringConfig {
        service_name: "waypoint-demo".to_string(),
        log_filter: config.log_level.clone(),
        enable_json_logging: config.json_logs(),
        ..MonitoringConfig::from_env()
    };

    waypoint_monitoring::init(&monitoring_config).context("Failed to initialize monitoring")?;

    let report = waypoint_demo::run(config, &monitoring_config)
        .await
        .context("Demo error")?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    waypoint_monitoring::shutdown();
    Ok(())
}
