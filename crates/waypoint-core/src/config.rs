//! Configuration for coordinators
//!
//! Defaults are compiled in; environment variables override them.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Environment variable overriding [`CoordinatorConfig::event_capacity`]
pub const EVENT_CAPACITY_ENV: &str = "WAYPOINT_EVENT_CAPACITY";

/// Environment variable overriding [`CoordinatorConfig::initial_ungated_steps`]
pub const INITIAL_UNGATED_STEPS_ENV: &str = "WAYPOINT_INITIAL_UNGATED_STEPS";

/// Coordinator configuration, inherited by every child coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Buffer of each will/did navigation channel; slow observers past it lag
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Emissions of the initial stepper delivered before the root's
    /// visibility gate applies
    #[serde(default = "default_initial_ungated_steps")]
    pub initial_ungated_steps: usize,
}

fn default_event_capacity() -> usize {
    64
}

fn default_initial_ungated_steps() -> usize {
    1
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
            initial_ungated_steps: default_initial_ungated_steps(),
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(capacity) = env::var(EVENT_CAPACITY_ENV) {
            match capacity.parse::<usize>() {
                Ok(capacity) if capacity > 0 => config.event_capacity = capacity,
                _ => warn!("Invalid {} value: {}", EVENT_CAPACITY_ENV, capacity),
            }
        }

        if let Ok(ungated) = env::var(INITIAL_UNGATED_STEPS_ENV) {
            if let Ok(ungated) = ungated.parse::<usize>() {
                config.initial_ungated_steps = ungated;
            } else {
                warn!("Invalid {} value: {}", INITIAL_UNGATED_STEPS_ENV, ungated);
            }
        }

        config
    }

    /// Set the will/did channel buffer
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set how many initial emissions bypass the root gate
    pub fn with_initial_ungated_steps(mut self, count: usize) -> Self {
        self.initial_ungated_steps = count;
        self
    }
}
