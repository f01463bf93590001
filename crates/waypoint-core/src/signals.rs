//! Push-based signal shapes consumed by the coordinator
//!
//! Presentables report visibility as a stream of booleans and dismissal as a
//! future that resolves once. The helpers here adapt `tokio::sync::watch`
//! channels, the most common backing store, into those shapes.

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream};
use futures::{FutureExt, StreamExt};
use tokio::sync::watch;

/// Stream of "is currently displayed" values
pub type VisibilityStream = BoxStream<'static, bool>;

/// Resolves once, when the presentable is dismissed
pub type Dismissal = BoxFuture<'static, ()>;

/// Stream the current value of a watch channel followed by every change
///
/// The stream ends when the sender is dropped.
pub fn watch_stream(rx: watch::Receiver<bool>) -> VisibilityStream {
    stream::unfold((rx, true), |(mut rx, first)| async move {
        if first {
            let current = *rx.borrow_and_update();
            return Some((current, (rx, false)));
        }
        match rx.changed().await {
            Ok(()) => {
                let current = *rx.borrow_and_update();
                Some((current, (rx, false)))
            }
            Err(_) => None,
        }
    })
    .boxed()
}

/// Resolve once the watch channel holds `true`
///
/// A dropped sender counts as dismissed: nothing can display the presentable
/// any more.
pub fn dismissal(mut rx: watch::Receiver<bool>) -> Dismissal {
    async move {
        loop {
            let dismissed = *rx.borrow_and_update();
            if dismissed || rx.changed().await.is_err() {
                return;
            }
        }
    }
    .boxed()
}

/// A dismissal that never fires
pub fn never_dismissed() -> Dismissal {
    futures::future::pending().boxed()
}

/// A visibility stream stuck at `visible`
pub fn constant_visibility(visible: bool) -> VisibilityStream {
    stream::once(async move { visible })
        .chain(stream::pending())
        .boxed()
}
