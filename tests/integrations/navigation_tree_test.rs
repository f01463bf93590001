//! End-to-end navigation through a three level flow tree

use std::sync::Arc;
use waypoint_core::{flows, Flow, FlowCoordinator, NavigationPhase};
use waypoint_integration_tests::fixtures::Tree;
use waypoint_monitoring::logging::init_test_tracing;
use waypoint_test_utils::assertions::{collect_events, drain_events, test_steps};
use waypoint_test_utils::util::{settle, within};
use waypoint_test_utils::{wait_until, TestStep};

#[tokio::test]
async fn test_tree_is_built_then_unwound() -> anyhow::Result<()> {
    init_test_tracing();
    let tree = Tree::new();
    let coordinator = FlowCoordinator::new();
    let mut did = coordinator.did_navigate();

    coordinator.coordinate(tree.app.clone(), tree.app_stepper.clone())?;

    // app: Child, section: Child, detail: Start
    let opened = collect_events(&mut did, 3).await?;
    let flows: Vec<&str> = opened.iter().map(|event| event.flow_name()).collect();
    assert_eq!(flows, vec!["app", "section", "detail"]);
    assert_eq!(coordinator.child_count(), 1);
    assert_eq!(coordinator.descendant_count(), 2);

    tree.detail_stepper.emit(TestStep::Next);
    let unwound = collect_events(&mut did, 2).await?;
    assert_eq!(test_steps(&unwound), vec![TestStep::Next, TestStep::Done]);
    assert_eq!(unwound[1].flow_name(), "section");

    wait_until("detail released", || coordinator.descendant_count() == 1).await?;
    assert_eq!(
        tree.section.resolved_test_steps(),
        vec![TestStep::Child, TestStep::Done]
    );
    assert_eq!(tree.app.resolved_test_steps(), vec![TestStep::Child]);
    Ok(())
}

#[tokio::test]
async fn test_every_level_becomes_ready() -> anyhow::Result<()> {
    let tree = Tree::new();
    let coordinator = FlowCoordinator::new();
    coordinator.coordinate(tree.app.clone(), tree.app_stepper.clone())?;

    let awaited: Vec<Arc<dyn Flow>> =
        vec![tree.app.clone(), tree.section.clone(), tree.detail.clone()];
    let roots = within("tree ready", flows::when_ready(&awaited)).await?;
    assert_eq!(roots.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_trigger_from_the_middle_reaches_the_root() -> anyhow::Result<()> {
    let tree = Tree::new();
    let coordinator = FlowCoordinator::new();
    let mut will = coordinator.will_navigate();

    coordinator.coordinate(tree.app.clone(), tree.app_stepper.clone())?;
    collect_events(&mut will, 3).await?;

    tree.section_stepper.emit(TestStep::Notify);
    tree.app.wait_for_resolved(2).await?;
    assert_eq!(
        tree.app.resolved_test_steps(),
        vec![TestStep::Child, TestStep::Notify]
    );

    // The whole tree is still alive
    assert_eq!(coordinator.descendant_count(), 2);
    let events = collect_events(&mut will, 2).await?;
    assert!(events.iter().all(|event| event.phase == NavigationPhase::Will));
    assert_eq!(test_steps(&events), vec![TestStep::Notify, TestStep::Notify]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_disposing_the_root_silences_the_tree() -> anyhow::Result<()> {
    let tree = Tree::new();
    let coordinator = FlowCoordinator::new();
    let mut did = coordinator.did_navigate();

    coordinator.coordinate(tree.app.clone(), tree.app_stepper.clone())?;
    collect_events(&mut did, 3).await?;

    coordinator.dispose();
    wait_until("detail unsubscribed", || {
        tree.detail_stepper.subscriber_count() == 0
    })
    .await?;
    assert_eq!(coordinator.descendant_count(), 0);

    tree.detail_stepper.emit(TestStep::Next);
    tree.section_stepper.emit(TestStep::Notify);
    settle().await;
    assert!(drain_events(&mut did).is_empty());
    assert_eq!(tree.detail.resolved_test_steps(), vec![TestStep::Start]);
    Ok(())
}
