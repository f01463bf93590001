//! A flow that records every step it is asked to resolve.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use waypoint_core::{
    Flow, FlowContributors, NavigationError, Presentable, Readiness, SignalPresentable, Step,
};

use crate::error::TestError;
use crate::steps::TestStep;
use crate::util::wait_until;

/// Resolution logic plugged into a [`RecordingFlow`]
pub type Resolver = Box<dyn Fn(&Step) -> Result<FlowContributors, NavigationError> + Send + Sync>;

/// A flow resolving steps with a closure and recording them, in order
pub struct RecordingFlow {
    name: String,
    root: Arc<SignalPresentable>,
    readiness: Readiness,
    resolver: Resolver,
    resolved: Mutex<Vec<Step>>,
}

impl RecordingFlow {
    /// Create a flow whose root is already displayed
    pub fn new<F>(name: &str, resolver: F) -> Arc<Self>
    where
        F: Fn(&Step) -> Result<FlowContributors, NavigationError> + Send + Sync + 'static,
    {
        Self::with_root(name, SignalPresentable::shown(), resolver)
    }

    /// Create a flow whose root is not displayed yet
    pub fn hidden<F>(name: &str, resolver: F) -> Arc<Self>
    where
        F: Fn(&Step) -> Result<FlowContributors, NavigationError> + Send + Sync + 'static,
    {
        Self::with_root(name, SignalPresentable::new(), resolver)
    }

    /// Create a displayed flow that resolves everything to nothing
    pub fn inert(name: &str) -> Arc<Self> {
        Self::new(name, |_| Ok(FlowContributors::None))
    }

    fn with_root<F>(name: &str, root: SignalPresentable, resolver: F) -> Arc<Self>
    where
        F: Fn(&Step) -> Result<FlowContributors, NavigationError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.to_string(),
            root: Arc::new(root),
            readiness: Readiness::new(),
            resolver: Box::new(resolver),
            resolved: Mutex::new(Vec::new()),
        })
    }

    /// The root presentable, to drive visibility and dismissal from a test
    pub fn presenter(&self) -> &Arc<SignalPresentable> {
        &self.root
    }

    /// Every step resolved so far
    pub fn resolved(&self) -> Vec<Step> {
        self.resolved.lock().clone()
    }

    /// Resolved steps that are [`TestStep`]s
    pub fn resolved_test_steps(&self) -> Vec<TestStep> {
        self.resolved
            .lock()
            .iter()
            .filter_map(|step| step.downcast_ref::<TestStep>().cloned())
            .collect()
    }

    /// Number of steps resolved so far
    pub fn resolved_count(&self) -> usize {
        self.resolved.lock().len()
    }

    /// Wait until at least `count` steps were resolved
    pub async fn wait_for_resolved(&self, count: usize) -> Result<Vec<Step>, TestError> {
        wait_until(&format!("{} to resolve {} steps", self.name, count), || {
            self.resolved_count() >= count
        })
        .await?;
        Ok(self.resolved())
    }
}

impl Flow for RecordingFlow {
    fn root(&self) -> Arc<dyn Presentable> {
        self.root.clone()
    }

    fn navigate(&self, step: &Step) -> Result<FlowContributors, NavigationError> {
        self.resolved.lock().push(step.clone());
        (self.resolver)(step)
    }

    fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for RecordingFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingFlow")
            .field("name", &self.name)
            .field("resolved", &self.resolved_count())
            .finish()
    }
}
