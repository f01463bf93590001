use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tracing::warn;

use crate::domain::step::Step;
use crate::error::StepperFault;

/// Default buffer of a [`RelayStepper`]
pub const DEFAULT_RELAY_CAPACITY: usize = 64;

/// The lazy, possibly infinite sequence of steps a stepper emits
///
/// Items are `Result`s so that a faulty source can report its failure; the
/// coordinator turns a fault into a terminal none step.
pub struct StepStream(BoxStream<'static, Result<Step, StepperFault>>);

impl StepStream {
    /// Wrap an infallible stream of steps
    pub fn new<S>(steps: S) -> Self
    where
        S: Stream<Item = Step> + Send + 'static,
    {
        Self(steps.map(Ok).boxed())
    }

    /// Wrap a stream whose items may fail
    pub fn fallible<S, E>(steps: S) -> Self
    where
        S: Stream<Item = Result<Step, E>> + Send + 'static,
        E: Into<StepperFault>,
    {
        Self(steps.map(|item| item.map_err(Into::into)).boxed())
    }

    /// A stream that ends immediately
    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    /// A stream of a single step
    pub fn once(step: Step) -> Self {
        Self::new(stream::iter([step]))
    }

    /// Unwrap into the boxed stream
    pub fn into_inner(self) -> BoxStream<'static, Result<Step, StepperFault>> {
        self.0
    }
}

impl Stream for StepStream {
    type Item = Result<Step, StepperFault>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.0.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for StepStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StepStream")
    }
}

/// A source of navigation intent
///
/// `steps` is called once per coordination context; a stepper is not expected
/// to replay what it emitted before that call.
pub trait Stepper: Send + Sync {
    /// Subscribe to the steps of this stepper
    fn steps(&self) -> StepStream;
}

/// Emits a single none step
///
/// Used when a flow is coordinated without a dedicated stepper: the none step
/// consumes the ungated bootstrap emission and is never resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStepper;

impl Stepper for DefaultStepper {
    fn steps(&self) -> StepStream {
        StepStream::once(Step::none())
    }
}

/// Emits exactly one step
#[derive(Debug, Clone)]
pub struct OneStepper {
    step: Step,
}

impl OneStepper {
    /// Create a stepper emitting `step` once
    pub fn new(step: Step) -> Self {
        Self { step }
    }
}

impl Stepper for OneStepper {
    fn steps(&self) -> StepStream {
        StepStream::once(self.step.clone())
    }
}

/// A stepper fed by explicit `emit` calls
///
/// Subscribers see the optional initial step first, then every step emitted
/// after they subscribed. Steps emitted with no subscriber are lost.
#[derive(Debug)]
pub struct RelayStepper {
    sender: broadcast::Sender<Step>,
    initial: Option<Step>,
}

impl RelayStepper {
    /// Create a relay without an initial step
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RELAY_CAPACITY)
    }

    /// Create a relay buffering at most `capacity` steps per slow subscriber
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            initial: None,
        }
    }

    /// Create a relay that greets every subscriber with `step`
    pub fn with_initial(step: Step) -> Self {
        let mut relay = Self::new();
        relay.initial = Some(step);
        relay
    }

    /// Emit a step to every current subscriber
    pub fn emit(&self, step: Step) {
        // No subscriber means nobody listens yet, which is not an error for a relay
        let _ = self.sender.send(step);
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for RelayStepper {
    fn default() -> Self {
        Self::new()
    }
}

impl Stepper for RelayStepper {
    fn steps(&self) -> StepStream {
        let receiver = self.sender.subscribe();
        let relayed = stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(step) => return Some((step, receiver)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Relay subscriber lagged, steps were dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        StepStream::new(stream::iter(self.initial.clone()).chain(relayed))
    }
}

/// Merges the steps of several steppers
#[derive(Clone, Default)]
pub struct CompositeStepper {
    steppers: Vec<Arc<dyn Stepper>>,
}

impl CompositeStepper {
    /// Combine the given steppers
    pub fn new(steppers: Vec<Arc<dyn Stepper>>) -> Self {
        Self { steppers }
    }

    /// Add one more stepper
    pub fn with(mut self, stepper: Arc<dyn Stepper>) -> Self {
        self.steppers.push(stepper);
        self
    }
}

impl Stepper for CompositeStepper {
    fn steps(&self) -> StepStream {
        let merged = stream::select_all(self.steppers.iter().map(|stepper| stepper.steps()));
        StepStream(merged.boxed())
    }
}

impl fmt::Debug for CompositeStepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeStepper")
            .field("stepper_count", &self.steppers.len())
            .finish()
    }
}
