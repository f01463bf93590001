use thiserror::Error;

/// Error types for the test utilities
#[derive(Debug, Error)]
pub enum TestError {
    /// A condition did not hold in time
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// An event channel closed or lagged while collecting
    #[error("Channel error: {0}")]
    Channel(String),
}
