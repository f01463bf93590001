//! Testing utilities for the Waypoint Platform.
//!
//! Fakes for flows and steppers, async wait helpers and assertions over
//! navigation events, shared by the tests of every crate.

pub mod assertions;
pub mod error;
pub mod implementations;
pub mod steps;
pub mod util;

pub use error::TestError;
pub use implementations::recording_flow::{RecordingFlow, Resolver};
pub use implementations::test_stepper::{FaultyStepper, TestStepper};
pub use steps::TestStep;
pub use util::{wait_until, DEFAULT_TIMEOUT};
