use tokio::sync::broadcast::{self, error::TryRecvError};
use waypoint_core::{NavigationEvent, Step};

use crate::error::TestError;
use crate::steps::TestStep;
use crate::util::within;

/// Receive exactly `count` events, failing if they do not arrive in time
pub async fn collect_events(
    receiver: &mut broadcast::Receiver<NavigationEvent>,
    count: usize,
) -> Result<Vec<NavigationEvent>, TestError> {
    let mut events = Vec::with_capacity(count);
    while events.len() < count {
        let event = within(&format!("{} navigation events", count), receiver.recv())
            .await?
            .map_err(|e| TestError::Channel(e.to_string()))?;
        events.push(event);
    }
    Ok(events)
}

/// Events already queued on `receiver`, without waiting
pub fn drain_events(receiver: &mut broadcast::Receiver<NavigationEvent>) -> Vec<NavigationEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return events,
        }
    }
}

/// The test steps carried by `events`, in order
pub fn test_steps(events: &[NavigationEvent]) -> Vec<TestStep> {
    events
        .iter()
        .filter_map(|event| event.step.downcast_ref::<TestStep>().cloned())
        .collect()
}

/// Assert that `events` carry exactly `expected`, in order
pub fn assert_steps(events: &[NavigationEvent], expected: &[TestStep]) {
    assert_eq!(
        test_steps(events),
        expected,
        "unexpected navigation: {:?}",
        events.iter().map(|event| &event.step).collect::<Vec<&Step>>()
    );
}

/// Assert that no event is queued on `receiver`
pub fn assert_no_events(receiver: &mut broadcast::Receiver<NavigationEvent>) {
    let events = drain_events(receiver);
    assert!(events.is_empty(), "unexpected navigation events: {:?}", events);
}
