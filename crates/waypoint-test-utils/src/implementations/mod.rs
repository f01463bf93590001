//! Fakes of the domain traits.

pub mod recording_flow;
pub mod test_stepper;
