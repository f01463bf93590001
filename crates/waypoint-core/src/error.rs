use thiserror::Error;

use crate::domain::coordinator_id::CoordinatorId;

/// Structural errors raised by a [`FlowCoordinator`](crate::FlowCoordinator)
///
/// These signal programmer errors: a coordinator is bound to exactly one flow,
/// once, and never after it has been disposed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// `coordinate` was called a second time on the same coordinator
    #[error("Coordinator already coordinating a flow: {0}")]
    AlreadyCoordinated(CoordinatorId),

    /// `coordinate` was called on a disposed coordinator
    #[error("Coordinator has been disposed: {0}")]
    Disposed(CoordinatorId),

    /// No tokio runtime is available to drive the dispatch loop
    #[error("No async runtime available: {0}")]
    NoRuntime(String),
}

/// Errors a flow reports when it cannot resolve a step
///
/// The coordinator logs these and resolves the step to nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// The flow does not handle steps of this kind
    #[error("Unsupported step kind: {0}")]
    UnsupportedStep(String),

    /// The flow understood the step but could not build its contributors
    #[error("Navigation failed: {0}")]
    Failed(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for NavigationError {
    fn from(err: String) -> Self {
        NavigationError::Other(err)
    }
}

impl From<&str> for NavigationError {
    fn from(err: &str) -> Self {
        NavigationError::Other(err.to_string())
    }
}

/// A fault raised by a stepper's stream
///
/// Faults end the faulty subscription only; the rest of the tree keeps running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Stepper fault: {0}")]
pub struct StepperFault(pub String);

impl From<String> for StepperFault {
    fn from(err: String) -> Self {
        StepperFault(err)
    }
}

impl From<&str> for StepperFault {
    fn from(err: &str) -> Self {
        StepperFault(err.to_string())
    }
}

impl From<std::io::Error> for StepperFault {
    fn from(err: std::io::Error) -> Self {
        StepperFault(err.to_string())
    }
}

impl From<serde_json::Error> for StepperFault {
    fn from(err: serde_json::Error) -> Self {
        StepperFault(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_error_display() {
        let id = CoordinatorId::from("c-1");
        let errors = vec![
            (
                CoordinatorError::AlreadyCoordinated(id.clone()).to_string(),
                "Coordinator already coordinating a flow: c-1",
            ),
            (
                CoordinatorError::Disposed(id).to_string(),
                "Coordinator has been disposed: c-1",
            ),
            (
                NavigationError::UnsupportedStep("Login".to_string()).to_string(),
                "Unsupported step kind: Login",
            ),
            (
                NavigationError::Failed("no session".to_string()).to_string(),
                "Navigation failed: no session",
            ),
            (StepperFault::from("socket closed").to_string(), "Stepper fault: socket closed"),
        ];

        for (actual, expected) in errors {
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_from_io_error() {
        let fault: StepperFault = IoError::new(ErrorKind::BrokenPipe, "pipe gone").into();
        assert!(fault.0.contains("pipe gone"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let fault: StepperFault = json_error.into();
        assert!(fault.0.contains("EOF"));
    }

    #[test]
    fn test_navigation_error_from_str() {
        match NavigationError::from("boom") {
            NavigationError::Other(msg) => assert_eq!(msg, "boom"),
            other => panic!("Expected Other variant, got {:?}", other),
        }
    }
}
