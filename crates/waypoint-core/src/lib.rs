//!
//! Waypoint Core - Navigation coordination engine for the Waypoint platform
//!
//! Screens and flows emit steps; flows resolve steps into contributors; the
//! coordinator tree listens to the contributors' steppers while their
//! presentables are displayed and spawns a child coordinator for every nested
//! flow. Nothing here draws anything: presentation is left to the embedding
//! application, which only reports visibility and dismissal.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - steps, steppers, presentables and flows
pub mod domain;

/// Application layer - the coordinator tree
pub mod application;

/// Visibility and dismissal signal helpers
pub mod signals;

/// Coordinator configuration
pub mod config;

/// Error types
pub mod error;

/// Helpers for embedding applications that deal with several flows at once
pub mod flows {
    pub use crate::domain::flow::when_ready;
}

// Re-export main API types for easy use
pub use application::coordinator::FlowCoordinator;
pub use config::CoordinatorConfig;
pub use domain::coordinator_id::CoordinatorId;
pub use domain::events::{NavigationEvent, NavigationPhase};
pub use domain::flow::{Flow, FlowContributor, FlowContributors, Readiness};
pub use domain::presentable::{Artifact, Presentable, SignalPresentable};
pub use domain::step::{RootStep, Step, StepValue};
pub use domain::stepper::{
    CompositeStepper, DefaultStepper, OneStepper, RelayStepper, StepStream, Stepper,
};
pub use error::{CoordinatorError, NavigationError, StepperFault};
pub use signals::{Dismissal, VisibilityStream};
