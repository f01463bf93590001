//! Error types for the Waypoint Demo

use thiserror::Error;
use waypoint_core::CoordinatorError;

/// Demo error types
#[derive(Error, Debug)]
pub enum DemoError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The coordinator refused to start
    #[error("Coordinator error: {0}")]
    CoordinatorError(#[from] CoordinatorError),

    /// A screen or flow did not show up in time
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// The scripted user found the application in an unexpected state
    #[error("Script error: {0}")]
    ScriptError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for demo operations
pub type DemoResult<T> = Result<T, DemoError>;
