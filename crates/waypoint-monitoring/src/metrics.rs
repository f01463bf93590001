//! Navigation metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use waypoint_core::{NavigationEvent, NavigationPhase};

/// Navigation counters of one flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationStats {
    /// Steps the flow was about to resolve
    pub will_navigate: u64,
    /// Steps the flow resolved
    pub did_navigate: u64,
    /// The last step resolved, as debug text
    pub last_step: Option<String>,
    /// When the last step was resolved
    pub last_navigated_at: Option<DateTime<Utc>>,
}

impl NavigationStats {
    /// Account for one event
    pub fn record(&mut self, event: &NavigationEvent) {
        match event.phase {
            NavigationPhase::Will => self.will_navigate += 1,
            NavigationPhase::Did => {
                self.did_navigate += 1;
                self.last_step = Some(format!("{:?}", event.step));
                self.last_navigated_at = Some(event.timestamp);
            }
        }
    }

    /// Steps announced but not resolved yet
    pub fn in_flight(&self) -> u64 {
        self.will_navigate.saturating_sub(self.did_navigate)
    }
}

/// Navigation specific metrics
pub struct NavigationMetrics;

impl NavigationMetrics {
    /// Record a resolved step
    pub fn record_navigation(event: &NavigationEvent) {
        info!(
            "Navigation: flow={}, step={}, coordinator={}",
            event.flow_name(),
            event.step.kind(),
            event.coordinator_id
        );
    }

    /// Record events an observer missed because it fell behind
    pub fn record_lag(phase: NavigationPhase, skipped: u64) {
        info!("Navigation lag: phase={:?}, skipped={}", phase, skipped);
    }
}
