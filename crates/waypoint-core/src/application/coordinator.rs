use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info_span, trace, warn, Instrument};

use crate::application::command::Command;
use crate::application::gate::{self, Gate};
use crate::config::CoordinatorConfig;
use crate::domain::coordinator_id::CoordinatorId;
use crate::domain::events::{NavigationEvent, NavigationPhase, NavigationTaps};
use crate::domain::flow::{Flow, FlowContributor, FlowContributors};
use crate::domain::presentable::Artifact;
use crate::domain::step::Step;
use crate::domain::stepper::{DefaultStepper, Stepper};
use crate::error::CoordinatorError;

/// Drives one flow: listens to steppers, resolves their steps and spawns a
/// child coordinator for every nested flow
///
/// A coordinator is an owning handle. Dropping it disposes it, together with
/// every coordinator below it. Children hold only a weak link back to their
/// parent.
pub struct FlowCoordinator {
    shared: Arc<Shared>,
}

/// What happens to the dispatch loop after a command
enum Outcome {
    Continue,
    Ended,
}

struct Shared {
    id: CoordinatorId,
    config: CoordinatorConfig,

    commands: UnboundedSender<Command>,
    // Taken by the first `coordinate` call
    inbox: Mutex<Option<UnboundedReceiver<Command>>>,
    task: Mutex<Option<JoinHandle<()>>>,

    children: DashMap<CoordinatorId, FlowCoordinator>,
    parent: Option<Weak<Shared>>,

    taps: NavigationTaps,
    // Taps of every ancestor, nearest first
    upstream: Vec<NavigationTaps>,

    started: AtomicBool,
    disposed: AtomicBool,
}

impl FlowCoordinator {
    /// Create a root coordinator with the default configuration
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default())
    }

    /// Create a root coordinator
    pub fn with_config(config: CoordinatorConfig) -> Self {
        Self::build(config, None, Vec::new())
    }

    fn child_of(parent: &Arc<Shared>) -> Self {
        let mut upstream = Vec::with_capacity(parent.upstream.len() + 1);
        upstream.push(parent.taps.clone());
        upstream.extend(parent.upstream.iter().cloned());

        Self::build(parent.config.clone(), Some(Arc::downgrade(parent)), upstream)
    }

    fn build(
        config: CoordinatorConfig,
        parent: Option<Weak<Shared>>,
        upstream: Vec<NavigationTaps>,
    ) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        let taps = NavigationTaps::new(config.event_capacity);

        Self {
            shared: Arc::new(Shared {
                id: CoordinatorId::generate(),
                config,
                commands,
                inbox: Mutex::new(Some(inbox)),
                task: Mutex::new(None),
                children: DashMap::new(),
                parent,
                taps,
                upstream,
                started: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Start coordinating `flow`, bootstrapped by the steps of `stepper`
    ///
    /// The first emission of `stepper` is delivered whether or not the flow's
    /// root is displayed; later ones only while it is. Must be called from
    /// within a tokio runtime.
    pub fn coordinate(
        &self,
        flow: Arc<dyn Flow>,
        stepper: Arc<dyn Stepper>,
    ) -> Result<(), CoordinatorError> {
        self.shared.coordinate(flow, stepper)
    }

    /// Start coordinating `flow` with a stepper that emits nothing to resolve
    pub fn coordinate_default(&self, flow: Arc<dyn Flow>) -> Result<(), CoordinatorError> {
        self.coordinate(flow, Arc::new(DefaultStepper))
    }

    /// Stop coordinating and dispose every descendant; idempotent
    pub fn dispose(&self) {
        self.shared.dispose();
    }

    /// Unique identifier of this coordinator
    pub fn id(&self) -> &CoordinatorId {
        &self.shared.id
    }

    /// Configuration this coordinator and its children run with
    pub fn config(&self) -> &CoordinatorConfig {
        &self.shared.config
    }

    /// Whether `dispose` has run
    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    /// Whether a flow is bound and the coordinator is not disposed
    pub fn is_coordinating(&self) -> bool {
        self.shared.started.load(Ordering::Acquire) && !self.is_disposed()
    }

    /// Identifiers of the live direct children
    pub fn child_ids(&self) -> Vec<CoordinatorId> {
        self.shared
            .children
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Number of live direct children
    pub fn child_count(&self) -> usize {
        self.shared.children.len()
    }

    /// Number of live coordinators below this one
    pub fn descendant_count(&self) -> usize {
        self.shared
            .children
            .iter()
            .map(|entry| 1 + entry.value().descendant_count())
            .sum()
    }

    /// Events emitted right before a step is resolved, here or anywhere below
    pub fn will_navigate(&self) -> broadcast::Receiver<NavigationEvent> {
        self.shared.taps.subscribe(NavigationPhase::Will)
    }

    /// Events emitted right after a step was resolved, here or anywhere below
    pub fn did_navigate(&self) -> broadcast::Receiver<NavigationEvent> {
        self.shared.taps.subscribe(NavigationPhase::Did)
    }
}

impl Default for FlowCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FlowCoordinator {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

impl fmt::Debug for FlowCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowCoordinator")
            .field("id", &self.shared.id)
            .field("children", &self.child_count())
            .field("coordinating", &self.is_coordinating())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Shared {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn coordinate(
        self: &Arc<Self>,
        flow: Arc<dyn Flow>,
        stepper: Arc<dyn Stepper>,
    ) -> Result<(), CoordinatorError> {
        if self.is_disposed() {
            return Err(CoordinatorError::Disposed(self.id.clone()));
        }

        let runtime =
            Handle::try_current().map_err(|e| CoordinatorError::NoRuntime(e.to_string()))?;

        let inbox = self
            .inbox
            .lock()
            .take()
            .ok_or_else(|| CoordinatorError::AlreadyCoordinated(self.id.clone()))?;
        self.started.store(true, Ordering::Release);

        let span = info_span!("coordinator", id = %self.id, flow = flow.name());
        let handle = runtime.spawn(Arc::clone(self).run(flow, stepper, inbox).instrument(span));
        *self.task.lock() = Some(handle);

        // Disposed while spawning: the handle was not there to abort yet
        if self.is_disposed() {
            if let Some(task) = self.task.lock().take() {
                task.abort();
            }
        }

        Ok(())
    }

    async fn run(
        self: Arc<Self>,
        flow: Arc<dyn Flow>,
        stepper: Arc<dyn Stepper>,
        mut inbox: UnboundedReceiver<Command>,
    ) {
        let root = flow.root();
        let mut gates = JoinSet::new();
        gates.spawn(gate::forward(
            self.id.clone(),
            stepper.steps(),
            Gate::for_root(root.as_ref(), self.config.initial_ungated_steps),
            self.commands.clone(),
        ));

        let mut dismissed = root.dismissed();
        debug!("Coordination started");

        loop {
            tokio::select! {
                biased;

                _ = &mut dismissed => {
                    debug!("Root dismissed, ending coordination");
                    break;
                }

                command = inbox.recv() => {
                    let Some(command) = command else { break };
                    if self.is_disposed() {
                        break;
                    }
                    if let Outcome::Ended = self.handle(command, &flow, &mut gates) {
                        debug!("Dispatch loop stopped");
                        break;
                    }
                }

                Some(finished) = gates.join_next(), if !gates.is_empty() => {
                    if let Err(e) = finished {
                        if e.is_panic() {
                            warn!(error = %e, "Stepper subscription panicked");
                        }
                    }
                }
            }
        }

        inbox.close();
        drop(gates);
        self.dispose();
    }

    fn handle(
        self: &Arc<Self>,
        command: Command,
        flow: &Arc<dyn Flow>,
        gates: &mut JoinSet<()>,
    ) -> Outcome {
        match command {
            Command::Step(step) => self.dispatch(step, flow, gates),
            Command::ChildEnded { child_id, step } => {
                self.release_child(&child_id);
                self.dispatch(step, flow, gates)
            }
            Command::ChildDetached(child_id) => {
                self.release_child(&child_id);
                Outcome::Continue
            }
        }
    }

    fn dispatch(
        self: &Arc<Self>,
        step: Step,
        flow: &Arc<dyn Flow>,
        gates: &mut JoinSet<()>,
    ) -> Outcome {
        // `dispose` may run on another thread while commands are still queued
        if self.is_disposed() {
            trace!(step = ?step, "Coordinator disposed, dropping step");
            return Outcome::Ended;
        }
        if step.is_none() {
            trace!("Ignoring none step");
            return Outcome::Continue;
        }

        self.emit(NavigationPhase::Will, flow, &step);
        let contributors = match flow.navigate(&step) {
            Ok(contributors) => contributors,
            Err(e) => {
                warn!(step = ?step, error = %e, "Flow failed to resolve step");
                FlowContributors::None
            }
        };
        self.emit(NavigationPhase::Did, flow, &step);
        if self.is_disposed() {
            debug!(step = ?step, "Coordinator disposed while resolving");
            return Outcome::Ended;
        }

        if flow.readiness().mark_ready() {
            debug!("Flow ready");
        }
        debug!(step = ?step, contributors = contributors.label(), "Resolved step");

        match contributors {
            FlowContributors::None => Outcome::Continue,
            FlowContributors::One(contributor) => {
                self.contribute(contributor, gates);
                Outcome::Continue
            }
            FlowContributors::Multiple(contributors) => {
                for contributor in contributors {
                    self.contribute(contributor, gates);
                }
                Outcome::Continue
            }
            FlowContributors::End(step) => {
                if self.parent.is_none() {
                    debug!(step = ?step, "Root flow ended, nothing to hand the step to");
                    return Outcome::Continue;
                }
                self.escalate(Command::ChildEnded {
                    child_id: self.id.clone(),
                    step,
                });
                Outcome::Ended
            }
            FlowContributors::TriggerParentFlow(step) => {
                if self.parent.is_none() {
                    debug!(step = ?step, "No parent flow to trigger");
                } else {
                    self.escalate(Command::Step(step));
                }
                Outcome::Continue
            }
        }
    }

    fn contribute(self: &Arc<Self>, contributor: FlowContributor, gates: &mut JoinSet<()>) {
        if self.is_disposed() {
            return;
        }

        match contributor.artifact() {
            Artifact::Flow(child_flow) => {
                let child = FlowCoordinator::child_of(self);
                let child_id = child.id().clone();
                let child_shared = Arc::clone(&child.shared);

                // Registered first so the child is never running unowned
                self.children.insert(child_id.clone(), child);
                let stepper = Arc::clone(contributor.stepper());
                match child_shared.coordinate(Arc::clone(child_flow), stepper) {
                    Ok(()) => {
                        debug!(
                            child = %child_id,
                            flow = child_flow.name(),
                            "Spawned child coordinator"
                        );
                    }
                    Err(e) => {
                        warn!(child = %child_id, error = %e, "Failed to coordinate child flow");
                        self.release_child(&child_id);
                    }
                }
            }
            artifact => {
                gates.spawn(gate::forward(
                    self.id.clone(),
                    contributor.stepper().steps(),
                    Gate::for_artifact(artifact),
                    self.commands.clone(),
                ));
            }
        }
    }

    fn release_child(&self, child_id: &CoordinatorId) {
        // Dropping the handle disposes the whole subtree
        if let Some((_, child)) = self.children.remove(child_id) {
            debug!(child = %child_id, "Released child coordinator");
            drop(child);
        }
    }

    fn escalate(&self, command: Command) {
        let Some(parent) = self.parent.as_ref().and_then(Weak::upgrade) else {
            trace!(coordinator = %self.id, "Parent gone, dropping {:?}", command);
            return;
        };
        if parent.commands.send(command).is_err() {
            trace!(coordinator = %self.id, "Parent stopped listening");
        }
    }

    fn emit(&self, phase: NavigationPhase, flow: &Arc<dyn Flow>, step: &Step) {
        if self.is_disposed() {
            return;
        }
        let event = NavigationEvent {
            phase,
            coordinator_id: self.id.clone(),
            flow: Arc::clone(flow),
            step: step.clone(),
            timestamp: Utc::now(),
        };
        for taps in &self.upstream {
            taps.emit(event.clone());
        }
        self.taps.emit(event);
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        self.inbox.lock().take();

        let child_ids: Vec<CoordinatorId> =
            self.children.iter().map(|entry| entry.key().clone()).collect();
        for child_id in child_ids {
            self.release_child(&child_id);
        }

        if self.parent.is_some() {
            self.escalate(Command::ChildDetached(self.id.clone()));
        }
        debug!(coordinator = %self.id, "Coordinator disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flow::Readiness;
    use crate::domain::presentable::{Presentable, SignalPresentable};
    use crate::domain::stepper::{OneStepper, RelayStepper};
    use crate::error::NavigationError;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    #[derive(Debug, PartialEq)]
    enum TestStep {
        Start,
        Child,
        Done,
    }

    struct ParentFlow {
        root: Arc<SignalPresentable>,
        readiness: Readiness,
        resolved: Mutex<Vec<Step>>,
    }

    impl ParentFlow {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                root: Arc::new(SignalPresentable::shown()),
                readiness: Readiness::new(),
                resolved: Mutex::new(Vec::new()),
            })
        }

        fn resolved(&self) -> Vec<Step> {
            self.resolved.lock().clone()
        }
    }

    impl Flow for ParentFlow {
        fn root(&self) -> Arc<dyn Presentable> {
            self.root.clone()
        }

        fn navigate(&self, step: &Step) -> Result<FlowContributors, NavigationError> {
            self.resolved.lock().push(step.clone());
            match step.downcast_ref::<TestStep>() {
                Some(TestStep::Child) => Ok(FlowContributors::One(FlowContributor::flow(
                    ChildFlow::new(),
                    Arc::new(OneStepper::new(Step::new(TestStep::Start))),
                ))),
                _ => Ok(FlowContributors::None),
            }
        }

        fn readiness(&self) -> &Readiness {
            &self.readiness
        }
    }

    struct ChildFlow {
        root: Arc<SignalPresentable>,
        readiness: Readiness,
    }

    impl ChildFlow {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                root: Arc::new(SignalPresentable::shown()),
                readiness: Readiness::new(),
            })
        }
    }

    impl Flow for ChildFlow {
        fn root(&self) -> Arc<dyn Presentable> {
            self.root.clone()
        }

        fn navigate(&self, _step: &Step) -> Result<FlowContributors, NavigationError> {
            Ok(FlowContributors::End(Step::new(TestStep::Done)))
        }

        fn readiness(&self) -> &Readiness {
            &self.readiness
        }
    }

    async fn eventually(mut condition: impl FnMut() -> bool) {
        timeout(Duration::from_secs(1), async {
            while !condition() {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition should hold eventually");
    }

    #[tokio::test]
    async fn test_child_end_hands_step_to_parent() {
        let flow = ParentFlow::new();
        let coordinator = FlowCoordinator::new();
        let relay = Arc::new(RelayStepper::with_initial(Step::new(TestStep::Child)));

        coordinator.coordinate(flow.clone(), relay).unwrap();

        eventually(|| flow.resolved().len() == 2).await;
        assert_eq!(
            flow.resolved(),
            vec![Step::new(TestStep::Child), Step::new(TestStep::Done)]
        );
        eventually(|| coordinator.child_count() == 0).await;
        assert!(flow.readiness().is_ready());
    }

    #[tokio::test]
    async fn test_dispose_tears_down_children() {
        struct StayingChild {
            root: Arc<SignalPresentable>,
            readiness: Readiness,
        }

        impl Flow for StayingChild {
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

        struct HostFlow {
            root: Arc<SignalPresentable>,
            readiness: Readiness,
        }

        impl Flow for HostFlow {
            fn root(&self) -> Arc<dyn Presentable> {
                self.root.clone()
            }

            fn navigate(&self, _step: &Step) -> Result<FlowContributors, NavigationError> {
                let child = Arc::new(StayingChild {
                    root: Arc::new(SignalPresentable::shown()),
                    readiness: Readiness::new(),
                });
                Ok(FlowContributors::One(FlowContributor::flow(
                    child,
                    Arc::new(OneStepper::new(Step::start())),
                )))
            }

            fn readiness(&self) -> &Readiness {
                &self.readiness
            }
        }

        let coordinator = FlowCoordinator::new();
        coordinator
            .coordinate(
                Arc::new(HostFlow {
                    root: Arc::new(SignalPresentable::shown()),
                    readiness: Readiness::new(),
                }),
                Arc::new(OneStepper::new(Step::start())),
            )
            .unwrap();

        eventually(|| coordinator.child_count() == 1).await;
        coordinator.dispose();

        assert!(coordinator.is_disposed());
        assert_eq!(coordinator.child_count(), 0);
        assert_eq!(coordinator.descendant_count(), 0);
    }
}
