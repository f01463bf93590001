use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::flow::Flow;
use crate::signals::{self, Dismissal, VisibilityStream};

/// Something that can be displayed and dismissed
///
/// The coordinator never displays anything itself. It only observes these two
/// signals to decide whether the stepper paired with the presentable is listened to.
pub trait Presentable: Send + Sync {
    /// Push-based "is currently displayed" values
    fn visible(&self) -> VisibilityStream;

    /// Resolves once the presentable is dismissed for good
    fn dismissed(&self) -> Dismissal;
}

/// What a contributor asks the coordinator to handle
///
/// The flow capability is decided once, when the contributor is built, rather
/// than discovered at dispatch time.
#[derive(Clone)]
pub enum Artifact {
    /// A plain displayable unit whose stepper is gated by its visibility
    Presentable(Arc<dyn Presentable>),

    /// A nested flow, coordinated by a child coordinator
    Flow(Arc<dyn Flow>),
}

impl Artifact {
    /// The nested flow, if this artifact is one
    pub fn as_flow(&self) -> Option<&Arc<dyn Flow>> {
        match self {
            Artifact::Flow(flow) => Some(flow),
            Artifact::Presentable(_) => None,
        }
    }

    /// Whether this artifact is a nested flow
    pub fn is_flow(&self) -> bool {
        self.as_flow().is_some()
    }

    /// Visibility of the artifact, a flow is visible when its root is
    pub fn visible(&self) -> VisibilityStream {
        match self {
            Artifact::Presentable(presentable) => presentable.visible(),
            Artifact::Flow(flow) => flow.root().visible(),
        }
    }

    /// Dismissal of the artifact, a flow is dismissed with its root
    pub fn dismissed(&self) -> Dismissal {
        match self {
            Artifact::Presentable(presentable) => presentable.dismissed(),
            Artifact::Flow(flow) => flow.root().dismissed(),
        }
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Presentable(_) => f.write_str("Artifact::Presentable"),
            Artifact::Flow(flow) => write!(f, "Artifact::Flow({})", flow.name()),
        }
    }
}

/// A presentable driven by explicit calls
///
/// Embedding applications attach one to each screen they build and forward
/// their UI lifecycle to it. Dropping it counts as a dismissal.
#[derive(Debug)]
pub struct SignalPresentable {
    visible: watch::Sender<bool>,
    dismissed: watch::Sender<bool>,
}

impl SignalPresentable {
    /// Create a hidden, not yet dismissed presentable
    pub fn new() -> Self {
        let (visible, _) = watch::channel(false);
        let (dismissed, _) = watch::channel(false);
        Self { visible, dismissed }
    }

    /// Create a presentable that is already displayed
    pub fn shown() -> Self {
        let presentable = Self::new();
        presentable.show();
        presentable
    }

    /// Mark as displayed
    pub fn show(&self) {
        self.set_visible(true);
    }

    /// Mark as hidden
    pub fn hide(&self) {
        self.set_visible(false);
    }

    /// Set the displayed state
    pub fn set_visible(&self, visible: bool) {
        self.visible.send_replace(visible);
    }

    /// Dismiss for good; also hides
    pub fn dismiss(&self) {
        self.visible.send_replace(false);
        self.dismissed.send_replace(true);
    }

    /// Current displayed state
    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    /// Whether `dismiss` has been called
    pub fn is_dismissed(&self) -> bool {
        *self.dismissed.borrow()
    }
}

impl Default for SignalPresentable {
    fn default() -> Self {
        Self::new()
    }
}

impl Presentable for SignalPresentable {
    fn visible(&self) -> VisibilityStream {
        signals::watch_stream(self.visible.subscribe())
    }

    fn dismissed(&self) -> Dismissal {
        signals::dismissal(self.dismissed.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_signal_presentable_visibility() {
        let presentable = SignalPresentable::new();
        assert!(!presentable.is_visible());

        let mut visible = presentable.visible();
        assert_eq!(visible.next().await, Some(false));

        presentable.show();
        assert_eq!(visible.next().await, Some(true));
        assert!(presentable.is_visible());

        presentable.hide();
        assert_eq!(visible.next().await, Some(false));
    }

    #[tokio::test]
    async fn test_signal_presentable_dismiss() {
        let presentable = SignalPresentable::shown();
        let dismissed = presentable.dismissed();

        presentable.dismiss();
        assert!(presentable.is_dismissed());
        assert!(!presentable.is_visible());
        timeout(Duration::from_secs(1), dismissed)
            .await
            .expect("dismissal should resolve");
    }

    #[test]
    fn test_plain_artifact_is_not_a_flow() {
        let artifact = Artifact::Presentable(Arc::new(SignalPresentable::new()));
        assert!(!artifact.is_flow());
        assert_eq!(format!("{:?}", artifact), "Artifact::Presentable");
    }
}
