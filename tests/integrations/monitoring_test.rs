//! The navigation observer watching a live coordinator tree

use waypoint_core::FlowCoordinator;
use waypoint_integration_tests::fixtures::Tree;
use waypoint_monitoring::logging::init_test_tracing;
use waypoint_monitoring::{MonitoringConfig, NavigationObserver};
use waypoint_test_utils::{wait_until, TestStep};

fn monitoring(enable_metrics: bool) -> MonitoringConfig {
    MonitoringConfig {
        enable_metrics,
        ..MonitoringConfig::default()
    }
}

#[tokio::test]
async fn test_observer_counts_every_level() -> anyhow::Result<()> {
    init_test_tracing();
    let tree = Tree::new();
    let coordinator = FlowCoordinator::new();
    let observer = NavigationObserver::attach(&coordinator, &monitoring(true));

    coordinator.coordinate(tree.app.clone(), tree.app_stepper.clone())?;
    wait_until("tree opened", || observer.total_resolved() == 3).await?;

    tree.detail_stepper.emit(TestStep::Next);
    wait_until("detail ended", || observer.total_resolved() == 5).await?;

    let stats = observer.stats();
    assert_eq!(stats["app"].did_navigate, 1);
    assert_eq!(stats["section"].did_navigate, 2);
    assert_eq!(stats["detail"].did_navigate, 2);
    assert!(stats.values().all(|flow| flow.in_flight() == 0));

    let section = observer.stats_for("section").expect("section observed");
    assert_eq!(section.last_step.as_deref(), Some("Done"));
    Ok(())
}

#[tokio::test]
async fn test_stats_serialize_for_reporting() -> anyhow::Result<()> {
    let tree = Tree::new();
    let coordinator = FlowCoordinator::new();
    let observer = NavigationObserver::attach(&coordinator, &monitoring(false));

    coordinator.coordinate(tree.app.clone(), tree.app_stepper.clone())?;
    wait_until("tree opened", || {
        observer.total_resolved() == 3
            && observer
                .stats_for("detail")
                .map_or(false, |detail| detail.will_navigate == 1)
    })
    .await?;

    let json = serde_json::to_value(observer.stats())?;
    assert_eq!(json["app"]["did_navigate"], 1);
    assert_eq!(json["detail"]["will_navigate"], 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_observer_finishes_with_the_tree() -> anyhow::Result<()> {
    let tree = Tree::new();
    let coordinator = FlowCoordinator::new();
    let observer = NavigationObserver::attach(&coordinator, &monitoring(false));

    coordinator.coordinate(tree.app.clone(), tree.app_stepper.clone())?;
    wait_until("tree opened", || observer.total_resolved() == 3).await?;
    assert!(!observer.is_finished());

    drop(coordinator);
    wait_until("observer finished", || observer.is_finished()).await?;
    assert_eq!(observer.total_resolved(), 3);
    Ok(())
}
