use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::{sleep, timeout};
use tracing::info;
use waypoint_core::{CoordinatorConfig, FlowCoordinator, NavigationEvent};
use waypoint_monitoring::{MonitoringConfig, NavigationObserver, NavigationStats};

use crate::config::DemoConfig;
use crate::error::{DemoError, DemoResult};
use crate::flows::{AppFlow, AppStepper, DashboardFlow, OnboardingFlow};
use crate::screen::Window;
use crate::services::AppServices;
use crate::steps::DemoStep;

/// The movie the scripted user picks on the dashboard
pub const PICKED_MOVIE: u32 = 42;

/// What happened during a run
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    /// Whether the user was onboarded when the run started
    pub started_onboarded: bool,
    /// Every resolved step, as `flow: step`, in order
    pub navigation: Vec<String>,
    /// Observer counters per flow
    pub stats: HashMap<String, NavigationStats>,
    /// Movies picked during the run
    pub picked_movies: Vec<u32>,
    /// Root attached to the window when the run ended
    pub final_root: Option<String>,
}

/// Run the application and script a user through it
///
/// Newcomers go through onboarding first. Every user then picks a movie on the
/// dashboard and logs out, which brings the onboarding back.
pub async fn run(config: DemoConfig, monitoring: &MonitoringConfig) -> DemoResult<DemoReport> {
    let patience = config.step_timeout();
    let services = Arc::new(AppServices::new(config.onboarded));
    let window = Arc::new(Window::new());
    let app_flow = AppFlow::new(window.clone(), services.clone());

    let coordinator = FlowCoordinator::with_config(CoordinatorConfig::from_env());
    let observer = NavigationObserver::attach(&coordinator, monitoring);
    let mut resolved = coordinator.did_navigate();

    info!(onboarded = config.onboarded, "Starting demo application");
    coordinator.coordinate(app_flow.clone(), Arc::new(AppStepper::new(&services)))?;

    if !config.onboarded {
        onboard(&app_flow, &window, patience).await?;
    }

    window.wait_for_root(DashboardFlow::NAME, patience).await?;
    let dashboard = app_flow
        .dashboard()
        .ok_or_else(|| DemoError::ScriptError("dashboard attached but not running".to_string()))?;

    dashboard.wishlist().wait_interactive(patience).await?;
    dashboard.wishlist().tap(DemoStep::MoviePicked(PICKED_MOVIE));
    wait_for(patience, "movie to be picked", || {
        services.movies.picked().contains(&PICKED_MOVIE)
    })
    .await?;

    dashboard.settings().wait_interactive(patience).await?;
    dashboard.settings().tap(DemoStep::Logout);
    window.wait_for_root(OnboardingFlow::NAME, patience).await?;

    let navigation = drain(&mut resolved);
    wait_for(patience, "observer to catch up", || {
        observer.total_resolved() >= navigation.len() as u64
    })
    .await?;

    let report = DemoReport {
        started_onboarded: config.onboarded,
        navigation: navigation
            .iter()
            .map(|event| format!("{}: {:?}", event.flow_name(), event.step))
            .collect(),
        stats: observer.stats(),
        picked_movies: services.movies.picked(),
        final_root: window.attached().map(str::to_string),
    };

    coordinator.dispose();
    info!(steps = report.navigation.len(), "Demo finished");
    Ok(report)
}

async fn onboard(app_flow: &AppFlow, window: &Window, patience: Duration) -> DemoResult<()> {
    window.wait_for_root(OnboardingFlow::NAME, patience).await?;
    let onboarding = app_flow
        .onboarding()
        .ok_or_else(|| DemoError::ScriptError("onboarding attached but not running".to_string()))?;

    onboarding.login().wait_interactive(patience).await?;
    onboarding.login().tap(DemoStep::UserIsLoggedIn);

    onboarding.api_key().wait_interactive(patience).await?;
    onboarding.api_key().tap(DemoStep::ApiKeyIsComplete);
    Ok(())
}

async fn wait_for<F>(patience: Duration, what: &str, mut condition: F) -> DemoResult<()>
where
    F: FnMut() -> bool,
{
    timeout(patience, async {
        while !condition() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .map_err(|_| DemoError::Timeout(what.to_string()))
}

fn drain(receiver: &mut broadcast::Receiver<NavigationEvent>) -> Vec<NavigationEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return events,
        }
    }
}
