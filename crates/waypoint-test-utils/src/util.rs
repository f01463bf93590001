//! Async wait helpers.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::error::TestError;

/// How long helpers wait before giving up
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Poll `condition` until it holds or [`DEFAULT_TIMEOUT`] elapses
pub async fn wait_until<F>(what: &str, mut condition: F) -> Result<(), TestError>
where
    F: FnMut() -> bool,
{
    timeout(DEFAULT_TIMEOUT, async {
        while !condition() {
            sleep(POLL_INTERVAL).await;
        }
    })
    .await
    .map_err(|_| TestError::Timeout(what.to_string()))
}

/// Await `future` for at most [`DEFAULT_TIMEOUT`]
pub async fn within<F: Future>(what: &str, future: F) -> Result<F::Output, TestError> {
    timeout(DEFAULT_TIMEOUT, future)
        .await
        .map_err(|_| TestError::Timeout(what.to_string()))
}

/// Give spawned tasks a moment to process what is already queued
pub async fn settle() {
    sleep(Duration::from_millis(30)).await;
}
