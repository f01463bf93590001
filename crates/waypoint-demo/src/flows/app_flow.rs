use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::warn;
use waypoint_core::{
    flows, Flow, FlowContributor, FlowContributors, NavigationError, OneStepper, Presentable,
    Readiness, RelayStepper, SignalPresentable, Step, StepStream, Stepper,
};

use crate::flows::{DashboardFlow, OnboardingFlow};
use crate::screen::Window;
use crate::services::AppServices;
use crate::steps::DemoStep;

/// Switches the window between the onboarding and the dashboard flows
pub struct AppFlow {
    window: Arc<Window>,
    services: Arc<AppServices>,
    readiness: Readiness,
    onboarding: Mutex<Option<Arc<OnboardingFlow>>>,
    dashboard: Mutex<Option<Arc<DashboardFlow>>>,
}

impl AppFlow {
    /// Flow name
    pub const NAME: &'static str = "app";

    /// Create the application flow over `window`
    pub fn new(window: Arc<Window>, services: Arc<AppServices>) -> Arc<Self> {
        Arc::new(Self {
            window,
            services,
            readiness: Readiness::new(),
            onboarding: Mutex::new(None),
            dashboard: Mutex::new(None),
        })
    }

    /// The current onboarding flow, if one was started
    pub fn onboarding(&self) -> Option<Arc<OnboardingFlow>> {
        self.onboarding.lock().clone()
    }

    /// The current dashboard flow, if one was started
    pub fn dashboard(&self) -> Option<Arc<DashboardFlow>> {
        self.dashboard.lock().clone()
    }

    fn navigate_to_onboarding(&self) -> FlowContributors {
        if let Some(dashboard) = self.dashboard.lock().take() {
            dashboard.tabs().dismiss();
        }

        let onboarding = OnboardingFlow::new(self.services.clone());
        self.attach_when_ready(onboarding.clone(), OnboardingFlow::NAME, onboarding.navigation());
        *self.onboarding.lock() = Some(onboarding.clone());

        FlowContributors::One(FlowContributor::flow(
            onboarding,
            Arc::new(OneStepper::new(Step::new(DemoStep::Login))),
        ))
    }

    fn navigate_to_dashboard(&self) -> FlowContributors {
        if let Some(onboarding) = self.onboarding.lock().take() {
            onboarding.navigation().dismiss();
        }

        let dashboard = DashboardFlow::new(self.services.clone());
        self.attach_when_ready(dashboard.clone(), DashboardFlow::NAME, dashboard.tabs());
        *self.dashboard.lock() = Some(dashboard.clone());

        FlowContributors::One(FlowContributor::flow(
            dashboard,
            Arc::new(OneStepper::new(Step::new(DemoStep::Dashboard))),
        ))
    }

    /// Attach the flow's root to the window once it produced its first screen
    fn attach_when_ready(
        &self,
        flow: Arc<dyn Flow>,
        name: &'static str,
        root: &Arc<SignalPresentable>,
    ) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(flow = name, "No runtime, the flow root will not be attached");
            return;
        };

        let window = self.window.clone();
        let root = root.clone();
        runtime.spawn(async move {
            flows::when_ready(&[flow]).await;
            window.attach(name, &root);
        });
    }
}

impl Flow for AppFlow {
    fn root(&self) -> Arc<dyn Presentable> {
        self.window.presentable()
    }

    fn navigate(&self, step: &Step) -> Result<FlowContributors, NavigationError> {
        let Some(step) = step.downcast_ref::<DemoStep>() else {
            return Ok(FlowContributors::None);
        };

        match step {
            DemoStep::Onboarding => Ok(self.navigate_to_onboarding()),
            DemoStep::Logout => {
                self.services.preferences.set_onboarded(false);
                Ok(self.navigate_to_onboarding())
            }
            DemoStep::OnboardingIsComplete | DemoStep::Dashboard => Ok(self.navigate_to_dashboard()),
            _ => Ok(FlowContributors::None),
        }
    }

    fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

/// Opens the dashboard for onboarded users and the onboarding otherwise
#[derive(Debug)]
pub struct AppStepper {
    relay: RelayStepper,
}

impl AppStepper {
    /// Decide the first step from the user's preferences
    pub fn new(services: &AppServices) -> Self {
        let first = if services.preferences.is_onboarded() {
            DemoStep::Dashboard
        } else {
            DemoStep::Onboarding
        };
        Self {
            relay: RelayStepper::with_initial(Step::new(first)),
        }
    }
}

impl Stepper for AppStepper {
    fn steps(&self) -> StepStream {
        self.relay.steps()
    }
}
