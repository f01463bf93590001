//! Steppers driven by the test.

use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use waypoint_core::{RelayStepper, Step, StepStream, Stepper, StepperFault};

use crate::error::TestError;
use crate::steps::TestStep;
use crate::util::wait_until;

/// A relay stepper that also counts its subscriptions
///
/// Steps emitted before the coordinator subscribed are lost, so tests wait
/// for [`TestStepper::wait_for_subscribers`] before emitting.
#[derive(Debug, Default)]
pub struct TestStepper {
    relay: RelayStepper,
    subscriptions: AtomicUsize,
}

impl TestStepper {
    /// Create a stepper with no initial step
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stepper greeting each subscriber with `step`
    pub fn with_initial(step: TestStep) -> Self {
        Self {
            relay: RelayStepper::with_initial(Step::new(step)),
            subscriptions: AtomicUsize::new(0),
        }
    }

    /// Emit a test step
    pub fn emit(&self, step: TestStep) {
        self.relay.emit(Step::new(step));
    }

    /// Emit any step, including the none step
    pub fn emit_step(&self, step: Step) {
        self.relay.emit(step);
    }

    /// Live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.relay.subscriber_count()
    }

    /// Subscriptions made so far, live or not
    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    /// Wait until `count` subscriptions are live
    pub async fn wait_for_subscribers(&self, count: usize) -> Result<(), TestError> {
        wait_until(&format!("{} stepper subscribers", count), || {
            self.subscriber_count() >= count
        })
        .await
    }
}

impl Stepper for TestStepper {
    fn steps(&self) -> StepStream {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        self.relay.steps()
    }
}

/// Emits some steps, then faults
#[derive(Debug, Clone)]
pub struct FaultyStepper {
    steps: Vec<TestStep>,
    fault: String,
}

impl FaultyStepper {
    /// Emit `steps` in order, then fail with `fault`
    pub fn new(steps: Vec<TestStep>, fault: &str) -> Self {
        Self {
            steps,
            fault: fault.to_string(),
        }
    }
}

impl Stepper for FaultyStepper {
    fn steps(&self) -> StepStream {
        let items = self
            .steps
            .iter()
            .cloned()
            .map(|step| Ok(Step::new(step)))
            .chain(std::iter::once(Err(StepperFault(self.fault.clone()))))
            .collect::<Vec<Result<Step, StepperFault>>>();
        StepStream::fallible(stream::iter(items))
    }
}
