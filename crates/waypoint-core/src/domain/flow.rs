use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::presentable::{Artifact, Presentable};
use crate::domain::step::Step;
use crate::domain::stepper::Stepper;
use crate::error::NavigationError;

/// A unit of navigation logic
///
/// A flow owns a root presentable and resolves each step it is handed into
/// the contributors that should be listened to next.
pub trait Flow: Send + Sync {
    /// The presentable that represents this flow as a whole
    fn root(&self) -> Arc<dyn Presentable>;

    /// Resolve a step; errors resolve to nothing
    fn navigate(&self, step: &Step) -> Result<FlowContributors, NavigationError>;

    /// Readiness marker toggled by the coordinator after the first resolution
    fn readiness(&self) -> &Readiness;

    /// Human readable name used in logs and navigation events
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// One-shot marker a flow carries to signal its first resolution happened
#[derive(Debug)]
pub struct Readiness {
    ready: watch::Sender<bool>,
}

impl Readiness {
    /// Create a marker that is not ready yet
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self { ready }
    }

    /// Mark as ready; later calls have no effect
    pub fn mark_ready(&self) -> bool {
        self.ready.send_if_modified(|ready| !std::mem::replace(ready, true))
    }

    /// Whether the flow has been ready at least once
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Wait until the flow is ready
    pub async fn wait(&self) {
        let mut ready = self.ready.subscribe();
        loop {
            let is_ready = *ready.borrow_and_update();
            // The sender lives in `self`, so the channel cannot close while we wait
            if is_ready || ready.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait until every flow is ready and return their roots, in order
///
/// Lets an embedding application attach a flow's root to its window only once
/// the flow produced its first screen.
pub async fn when_ready(flows: &[Arc<dyn Flow>]) -> Vec<Arc<dyn Presentable>> {
    join_all(flows.iter().map(|flow| flow.readiness().wait())).await;
    flows.iter().map(|flow| flow.root()).collect()
}

/// The next thing to handle after a step: what is presented and who emits next
#[derive(Clone)]
pub struct FlowContributor {
    artifact: Artifact,
    stepper: Arc<dyn Stepper>,
}

impl FlowContributor {
    /// Pair an artifact with the stepper listened to while it is displayed
    pub fn new(artifact: Artifact, stepper: Arc<dyn Stepper>) -> Self {
        Self { artifact, stepper }
    }

    /// Contributor for a plain presentable
    pub fn presentable(presentable: Arc<dyn Presentable>, stepper: Arc<dyn Stepper>) -> Self {
        Self::new(Artifact::Presentable(presentable), stepper)
    }

    /// Contributor for a nested flow
    pub fn flow(flow: Arc<dyn Flow>, stepper: Arc<dyn Stepper>) -> Self {
        Self::new(Artifact::Flow(flow), stepper)
    }

    /// The artifact to handle
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// The stepper to listen to
    pub fn stepper(&self) -> &Arc<dyn Stepper> {
        &self.stepper
    }
}

impl fmt::Debug for FlowContributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowContributor")
            .field("artifact", &self.artifact)
            .finish()
    }
}

/// How a single step resolves
#[derive(Debug, Clone)]
pub enum FlowContributors {
    /// Several contributors at once for the same step
    Multiple(Vec<FlowContributor>),

    /// Exactly one contributor
    One(FlowContributor),

    /// The flow is over; the step goes to the parent flow
    End(Step),

    /// The step goes to the parent flow; this flow keeps running
    TriggerParentFlow(Step),

    /// No further navigation
    None,
}

impl FlowContributors {
    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            FlowContributors::Multiple(_) => "multiple",
            FlowContributors::One(_) => "one",
            FlowContributors::End(_) => "end",
            FlowContributors::TriggerParentFlow(_) => "trigger_parent_flow",
            FlowContributors::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::presentable::SignalPresentable;
    use crate::domain::stepper::DefaultStepper;
    use std::time::Duration;
    use tokio::time::timeout;

    struct EmptyFlow {
        root: Arc<SignalPresentable>,
        readiness: Readiness,
    }

    impl EmptyFlow {
        fn new() -> Self {
            Self {
                root: Arc::new(SignalPresentable::new()),
                readiness: Readiness::new(),
            }
        }
    }

    impl Flow for EmptyFlow {
        fn root(&self) -> Arc<dyn Presentable> {
            self.root.clone()
        }

        fn navigate(&self, _step: &Step) -> Result<FlowContributors, NavigationError> {
            Ok(FlowContributors::None)
        }

        fn readiness(&self) -> &Readiness {
            &self.readiness
        }
    }

    #[test]
    fn test_readiness_is_one_shot() {
        let readiness = Readiness::new();
        assert!(!readiness.is_ready());
        assert!(readiness.mark_ready());
        assert!(!readiness.mark_ready());
        assert!(readiness.is_ready());
    }

    #[test]
    fn test_default_flow_name() {
        let flow = EmptyFlow::new();
        assert!(flow.name().ends_with("EmptyFlow"));
    }

    #[tokio::test]
    async fn test_when_ready_waits_for_every_flow() {
        let first = Arc::new(EmptyFlow::new());
        let second = Arc::new(EmptyFlow::new());
        let flows: Vec<Arc<dyn Flow>> = vec![first.clone(), second.clone()];

        let waiter = tokio::spawn(async move { when_ready(&flows).await.len() });

        first.readiness().mark_ready();
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        second.readiness().mark_ready();
        let roots = timeout(Duration::from_secs(1), waiter)
            .await
            .expect("flows should become ready")
            .expect("waiter should not panic");
        assert_eq!(roots, 2);
    }

    #[test]
    fn test_contributor_accessors() {
        let flow: Arc<dyn Flow> = Arc::new(EmptyFlow::new());
        let contributor = FlowContributor::flow(flow, Arc::new(DefaultStepper));
        assert!(contributor.artifact().is_flow());
        assert_eq!(FlowContributors::One(contributor).label(), "one");
        assert_eq!(FlowContributors::End(Step::none()).label(), "end");
    }
}
