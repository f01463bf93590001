use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::coordinator_id::CoordinatorId;
use crate::domain::flow::Flow;
use crate::domain::step::Step;

/// When, relative to resolution, a navigation event is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationPhase {
    /// Before the flow resolves the step
    Will,

    /// After the flow resolved the step
    Did,
}

/// Event: a flow is about to resolve, or just resolved, a step
#[derive(Clone)]
pub struct NavigationEvent {
    /// Phase of the event
    pub phase: NavigationPhase,

    /// The coordinator dispatching the step
    pub coordinator_id: CoordinatorId,

    /// The flow resolving the step
    pub flow: Arc<dyn Flow>,

    /// The step being resolved
    pub step: Step,

    /// The timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
}

impl NavigationEvent {
    /// Returns the type of the event as a string
    pub fn event_type(&self) -> &'static str {
        match self.phase {
            NavigationPhase::Will => "navigation.will",
            NavigationPhase::Did => "navigation.did",
        }
    }

    /// Name of the flow resolving the step
    pub fn flow_name(&self) -> &str {
        self.flow.name()
    }
}

impl fmt::Debug for NavigationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationEvent")
            .field("phase", &self.phase)
            .field("coordinator_id", &self.coordinator_id)
            .field("flow", &self.flow.name())
            .field("step", &self.step)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// The will/did channels of one coordinator
#[derive(Clone)]
pub(crate) struct NavigationTaps {
    will: broadcast::Sender<NavigationEvent>,
    did: broadcast::Sender<NavigationEvent>,
}

impl NavigationTaps {
    pub(crate) fn new(capacity: usize) -> Self {
        let (will, _) = broadcast::channel(capacity.max(1));
        let (did, _) = broadcast::channel(capacity.max(1));
        Self { will, did }
    }

    pub(crate) fn subscribe(&self, phase: NavigationPhase) -> broadcast::Receiver<NavigationEvent> {
        match phase {
            NavigationPhase::Will => self.will.subscribe(),
            NavigationPhase::Did => self.did.subscribe(),
        }
    }

    /// Fire and forget: no observer is not an error
    pub(crate) fn emit(&self, event: NavigationEvent) {
        let sender = match event.phase {
            NavigationPhase::Will => &self.will,
            NavigationPhase::Did => &self.did,
        };
        let _ = sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flow::{FlowContributors, Readiness};
    use crate::domain::presentable::{Presentable, SignalPresentable};
    use crate::error::NavigationError;

    struct NamedFlow {
        readiness: Readiness,
    }

    impl Flow for NamedFlow {
        fn root(&self) -> Arc<dyn Presentable> {
            Arc::new(SignalPresentable::new())
        }

        fn navigate(&self, _step: &Step) -> Result<FlowContributors, NavigationError> {
            Ok(FlowContributors::None)
        }

        fn readiness(&self) -> &Readiness {
            &self.readiness
        }

        fn name(&self) -> &str {
            "named"
        }
    }

    fn event(phase: NavigationPhase) -> NavigationEvent {
        NavigationEvent {
            phase,
            coordinator_id: CoordinatorId::from("root"),
            flow: Arc::new(NamedFlow {
                readiness: Readiness::new(),
            }),
            step: Step::start(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_event_type() {
        assert_eq!(event(NavigationPhase::Will).event_type(), "navigation.will");
        assert_eq!(event(NavigationPhase::Did).event_type(), "navigation.did");
        assert_eq!(event(NavigationPhase::Did).flow_name(), "named");
    }

    #[test]
    fn test_taps_route_by_phase() {
        let taps = NavigationTaps::new(8);
        let mut will = taps.subscribe(NavigationPhase::Will);
        let mut did = taps.subscribe(NavigationPhase::Did);

        taps.emit(event(NavigationPhase::Will));

        assert_eq!(will.try_recv().unwrap().phase, NavigationPhase::Will);
        assert!(did.try_recv().is_err());
    }

    #[test]
    fn test_emit_without_observers_is_silent() {
        let taps = NavigationTaps::new(8);
        taps.emit(event(NavigationPhase::Did));
    }
}
