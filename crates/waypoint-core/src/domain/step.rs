use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Payload carried by a [`Step`]
///
/// Implemented for every `'static` type that is `Debug + PartialEq + Send + Sync`,
/// so application step enums never implement it by hand.
pub trait StepValue: Any + fmt::Debug + Send + Sync {
    /// Access the payload as `Any` for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Compare with another payload, false when the concrete types differ
    fn eq_value(&self, other: &dyn StepValue) -> bool;
}

impl<T> StepValue for T
where
    T: Any + fmt::Debug + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_value(&self, other: &dyn StepValue) -> bool {
        <dyn StepValue as StepValue>::as_any(other)
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }
}

/// A point of navigation inside a flow
///
/// Steps are opaque to the coordinator. Flows recover the payload they understand
/// with [`Step::downcast_ref`] and resolve anything else to nothing.
#[derive(Clone)]
pub struct Step {
    value: Option<Arc<dyn StepValue>>,
    kind: &'static str,
}

impl Step {
    /// Kind reported by the none step
    pub const NONE_KIND: &'static str = "none";

    /// Wrap an application value into a step
    pub fn new<T>(value: T) -> Self
    where
        T: Any + fmt::Debug + PartialEq + Send + Sync,
    {
        Self {
            value: Some(Arc::new(value)),
            kind: type_name::<T>(),
        }
    }

    /// The step that has no navigation effect
    pub fn none() -> Self {
        Self {
            value: None,
            kind: Self::NONE_KIND,
        }
    }

    /// Conventional first step of a flow
    pub fn start() -> Self {
        Self::new(RootStep::Start)
    }

    /// Whether this is the none step
    #[inline]
    pub fn is_none(&self) -> bool {
        self.value.is_none()
    }

    /// Kind discriminator, the payload's type name
    #[inline]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Borrow the payload as `T` if that is its concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value
            .as_deref()
            .and_then(|value| <dyn StepValue as StepValue>::as_any(value).downcast_ref::<T>())
    }

    /// Whether the payload is a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::none()
    }
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        match (&self.value, &other.value) {
            (None, None) => true,
            (Some(a), Some(b)) => a.eq_value(b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => fmt::Debug::fmt(value, f),
            None => f.write_str("NoneStep"),
        }
    }
}

/// Steps understood by every flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootStep {
    /// Bootstraps a flow
    Start,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum DemoStep {
        Login,
        Movie { id: u32 },
    }

    #[derive(Debug, PartialEq)]
    struct Other(u32);

    #[test]
    fn test_none_step() {
        let step = Step::none();
        assert!(step.is_none());
        assert_eq!(step.kind(), Step::NONE_KIND);
        assert_eq!(step, Step::default());
        assert_eq!(format!("{:?}", step), "NoneStep");
    }

    #[test]
    fn test_downcast() {
        let step = Step::new(DemoStep::Movie { id: 7 });
        assert!(!step.is_none());
        assert!(step.is::<DemoStep>());
        assert!(!step.is::<Other>());
        assert_eq!(
            step.downcast_ref::<DemoStep>(),
            Some(&DemoStep::Movie { id: 7 })
        );
        assert!(step.kind().ends_with("DemoStep"));
    }

    #[test]
    fn test_equality_across_kinds() {
        assert_eq!(Step::new(DemoStep::Login), Step::new(DemoStep::Login));
        assert_ne!(Step::new(DemoStep::Login), Step::new(DemoStep::Movie { id: 1 }));
        assert_ne!(Step::new(Other(1)), Step::new(DemoStep::Login));
        assert_ne!(Step::new(Other(1)), Step::none());
        assert_eq!(Step::start(), Step::new(RootStep::Start));
    }

    #[test]
    fn test_debug_shows_payload() {
        let step = Step::new(DemoStep::Movie { id: 3 });
        assert_eq!(format!("{:?}", step), "Movie { id: 3 }");
    }
}
