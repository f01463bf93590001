//!
//! Waypoint Demo - Headless replay of the onboarding/dashboard application
//!
//! The application flow starts either on the onboarding flow or, for users who
//! already went through it, on the dashboard flow. A scripted user taps through
//! the screens while the navigation trace is logged and reported.

/// Configuration module
pub mod config;

/// Error module
pub mod error;

/// Application steps
pub mod steps;

/// Application services
pub mod services;

/// Screens and the window hosting flow roots
pub mod screen;

/// Application flows
pub mod flows;

/// Scripted run of the application
pub mod app;

// Re-export key types
pub use app::{run, DemoReport};
pub use config::DemoConfig;
pub use error::{DemoError, DemoResult};
pub use steps::DemoStep;
