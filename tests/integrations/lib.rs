// Waypoint Integration Tests
//
// Scenarios spanning the engine, the monitoring crate and the test fakes

/// Shared fixtures for the integration tests
pub mod fixtures {
    use std::sync::Arc;
    use waypoint_core::{FlowContributor, FlowContributors, Step};
    use waypoint_test_utils::{RecordingFlow, TestStep, TestStepper};

    fn test_step(step: &Step) -> Option<&TestStep> {
        step.downcast_ref::<TestStep>()
    }

    /// Three nested flows: `app` opens `section` which opens `detail`
    ///
    /// `detail` ends with `Done` when it sees `Next`, handing `Done` to `section`.
    pub struct Tree {
        pub app: Arc<RecordingFlow>,
        pub section: Arc<RecordingFlow>,
        pub detail: Arc<RecordingFlow>,
        pub app_stepper: Arc<TestStepper>,
        pub section_stepper: Arc<TestStepper>,
        pub detail_stepper: Arc<TestStepper>,
    }

    impl Tree {
        /// Build the tree; the root starts by opening `section`
        pub fn new() -> Self {
            let detail_stepper = Arc::new(TestStepper::with_initial(TestStep::Start));
            let detail = RecordingFlow::new("detail", |step| match test_step(step) {
                Some(TestStep::Next) => Ok(FlowContributors::End(Step::new(TestStep::Done))),
                _ => Ok(FlowContributors::None),
            });

            let section_stepper = Arc::new(TestStepper::with_initial(TestStep::Child));
            let section = {
                let detail = detail.clone();
                let detail_stepper = detail_stepper.clone();
                RecordingFlow::new("section", move |step| match test_step(step) {
                    Some(TestStep::Child) => Ok(FlowContributors::One(FlowContributor::flow(
                        detail.clone(),
                        detail_stepper.clone(),
                    ))),
                    Some(TestStep::Notify) => Ok(FlowContributors::TriggerParentFlow(
                        Step::new(TestStep::Notify),
                    )),
                    _ => Ok(FlowContributors::None),
                })
            };

            let app_stepper = Arc::new(TestStepper::with_initial(TestStep::Child));
            let app = {
                let section = section.clone();
                let section_stepper = section_stepper.clone();
                RecordingFlow::new("app", move |step| match test_step(step) {
                    Some(TestStep::Child) => Ok(FlowContributors::One(FlowContributor::flow(
                        section.clone(),
                        section_stepper.clone(),
                    ))),
                    _ => Ok(FlowContributors::None),
                })
            };

            Self {
                app,
                section,
                detail,
                app_stepper,
                section_stepper,
                detail_stepper,
            }
        }
    }

    impl Default for Tree {
        fn default() -> Self {
            Self::new()
        }
    }
}
