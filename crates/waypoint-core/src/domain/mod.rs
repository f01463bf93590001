/// Steps: the intent to navigate
pub mod step;

/// Steppers and the step streams they emit
pub mod stepper;

/// Presentables and contributor artifacts
pub mod presentable;

/// Flows, their contributors and readiness
pub mod flow;

/// Navigation events
pub mod events;

/// Coordinator identity
pub mod coordinator_id;
