//! Observation of a coordinator tree's navigation events.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use waypoint_core::{FlowCoordinator, NavigationEvent, NavigationPhase};

use crate::metrics::{NavigationMetrics, NavigationStats};
use crate::MonitoringConfig;

type StatsByFlow = Arc<Mutex<HashMap<String, NavigationStats>>>;

/// Logs every will/did event of a coordinator and everything below it, and
/// keeps per-flow counters
///
/// Observation stops when the observer is dropped or the coordinator goes away.
pub struct NavigationObserver {
    stats: StatsByFlow,
    task: JoinHandle<()>,
}

impl NavigationObserver {
    /// Start observing `coordinator`; must be called within a tokio runtime
    pub fn attach(coordinator: &FlowCoordinator, config: &MonitoringConfig) -> Self {
        let stats = StatsByFlow::default();
        let task = tokio::spawn(observe(
            coordinator.will_navigate(),
            coordinator.did_navigate(),
            Arc::clone(&stats),
            config.enable_metrics,
        ));
        Self { stats, task }
    }

    /// Counters of every flow seen so far, keyed by flow name
    pub fn stats(&self) -> HashMap<String, NavigationStats> {
        self.stats.lock().clone()
    }

    /// Counters of one flow
    pub fn stats_for(&self, flow: &str) -> Option<NavigationStats> {
        self.stats.lock().get(flow).cloned()
    }

    /// Steps resolved across every flow
    pub fn total_resolved(&self) -> u64 {
        self.stats.lock().values().map(|stats| stats.did_navigate).sum()
    }

    /// Whether the observed coordinator is gone and no more events will come
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for NavigationObserver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn observe(
    mut will: broadcast::Receiver<NavigationEvent>,
    mut did: broadcast::Receiver<NavigationEvent>,
    stats: StatsByFlow,
    metrics: bool,
) {
    let mut will_open = true;
    let mut did_open = true;

    while will_open || did_open {
        tokio::select! {
            received = will.recv(), if will_open => {
                will_open = record(received, NavigationPhase::Will, &stats, metrics);
            }
            received = did.recv(), if did_open => {
                did_open = record(received, NavigationPhase::Did, &stats, metrics);
            }
        }
    }

    debug!("Navigation observer finished");
}

fn record(
    received: Result<NavigationEvent, RecvError>,
    phase: NavigationPhase,
    stats: &StatsByFlow,
    metrics: bool,
) -> bool {
    match received {
        Ok(event) => {
            debug!(
                coordinator = %event.coordinator_id,
                flow = event.flow_name(),
                step = ?event.step,
                "{}",
                event.event_type()
            );
            stats
                .lock()
                .entry(event.flow_name().to_string())
                .or_default()
                .record(&event);
            if metrics && phase == NavigationPhase::Did {
                NavigationMetrics::record_navigation(&event);
            }
            true
        }
        Err(RecvError::Lagged(skipped)) => {
            warn!(phase = ?phase, skipped, "Navigation observer lagged, events were dropped");
            if metrics {
                NavigationMetrics::record_lag(phase, skipped);
            }
            true
        }
        Err(RecvError::Closed) => false,
    }
}
