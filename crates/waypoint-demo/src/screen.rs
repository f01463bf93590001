use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, info};
use waypoint_core::{FlowContributor, RelayStepper, SignalPresentable, Step};

use crate::error::{DemoError, DemoResult};
use crate::steps::DemoStep;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A headless screen: something displayable plus the steps its user triggers
#[derive(Debug)]
pub struct Screen {
    name: &'static str,
    presentable: Arc<SignalPresentable>,
    stepper: Arc<RelayStepper>,
}

impl Screen {
    /// Create a screen that is not displayed yet
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            presentable: Arc::new(SignalPresentable::new()),
            stepper: Arc::new(RelayStepper::new()),
        })
    }

    /// Screen name, for logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Put the screen on display
    pub fn present(&self) {
        debug!(screen = self.name, "Presenting screen");
        self.presentable.show();
    }

    /// Cover the screen with another one
    pub fn hide(&self) {
        self.presentable.hide();
    }

    /// Remove the screen for good
    pub fn dismiss(&self) {
        debug!(screen = self.name, "Dismissing screen");
        self.presentable.dismiss();
    }

    /// Whether the screen is displayed
    pub fn is_presented(&self) -> bool {
        self.presentable.is_visible()
    }

    /// The user interacts with the screen
    pub fn tap(&self, step: DemoStep) {
        info!(screen = self.name, step = ?step, "User action");
        self.stepper.emit(Step::new(step));
    }

    /// Displayed and listened to by a coordinator
    pub fn is_interactive(&self) -> bool {
        self.is_presented() && self.stepper.subscriber_count() > 0
    }

    /// Wait until the screen can be tapped
    pub async fn wait_interactive(&self, patience: Duration) -> DemoResult<()> {
        timeout(patience, async {
            while !self.is_interactive() {
                sleep(POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| DemoError::Timeout(format!("{} screen", self.name)))
    }

    /// What the coordinator should listen to while this screen is displayed
    pub fn contributor(&self) -> FlowContributor {
        FlowContributor::presentable(self.presentable.clone(), self.stepper.clone())
    }
}

/// The top-level container flow roots are attached to
#[derive(Debug)]
pub struct Window {
    presentable: Arc<SignalPresentable>,
    root: watch::Sender<Option<&'static str>>,
}

impl Window {
    /// Create a displayed, empty window
    pub fn new() -> Self {
        let (root, _) = watch::channel(None);
        Self {
            presentable: Arc::new(SignalPresentable::shown()),
            root,
        }
    }

    /// The window as a presentable, the root of the application flow
    pub fn presentable(&self) -> Arc<SignalPresentable> {
        self.presentable.clone()
    }

    /// Make `root` the displayed root of the window
    pub fn attach(&self, name: &'static str, root: &SignalPresentable) {
        info!(root = name, "Attaching root to window");
        root.show();
        self.root.send_replace(Some(name));
    }

    /// Name of the attached root
    pub fn attached(&self) -> Option<&'static str> {
        *self.root.borrow()
    }

    /// Wait until the root named `name` is attached
    pub async fn wait_for_root(&self, name: &'static str, patience: Duration) -> DemoResult<()> {
        let mut root = self.root.subscribe();
        timeout(patience, async move {
            loop {
                if *root.borrow_and_update() == Some(name) {
                    return;
                }
                // The sender lives in `self`, so the channel stays open
                if root.changed().await.is_err() {
                    return;
                }
            }
        })
        .await
        .map_err(|_| DemoError::Timeout(format!("{} root", name)))
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}
