use std::sync::Arc;
use waypoint_core::{
    Flow, FlowContributors, NavigationError, Presentable, Readiness, SignalPresentable, Step,
};

use crate::screen::Screen;
use crate::services::AppServices;
use crate::steps::DemoStep;

/// Login, then API key entry; ends once the user is onboarded
pub struct OnboardingFlow {
    navigation: Arc<SignalPresentable>,
    services: Arc<AppServices>,
    readiness: Readiness,
    login: Arc<Screen>,
    api_key: Arc<Screen>,
}

impl OnboardingFlow {
    /// Flow name, also the window root name
    pub const NAME: &'static str = "onboarding";

    /// Create the flow and its screens
    pub fn new(services: Arc<AppServices>) -> Arc<Self> {
        Arc::new(Self {
            navigation: Arc::new(SignalPresentable::new()),
            services,
            readiness: Readiness::new(),
            login: Screen::new("login"),
            api_key: Screen::new("api_key"),
        })
    }

    /// The navigation stack holding the screens
    pub fn navigation(&self) -> &Arc<SignalPresentable> {
        &self.navigation
    }

    /// The login screen
    pub fn login(&self) -> &Arc<Screen> {
        &self.login
    }

    /// The API key screen
    pub fn api_key(&self) -> &Arc<Screen> {
        &self.api_key
    }

    fn navigate_to_login(&self) -> FlowContributors {
        self.login.present();
        FlowContributors::One(self.login.contributor())
    }

    fn navigate_to_api_key(&self) -> FlowContributors {
        self.login.hide();
        self.api_key.present();
        FlowContributors::One(self.api_key.contributor())
    }

    fn complete(&self) -> FlowContributors {
        self.services.preferences.set_onboarded(true);
        self.api_key.dismiss();
        self.login.dismiss();
        FlowContributors::End(Step::new(DemoStep::OnboardingIsComplete))
    }
}

impl Flow for OnboardingFlow {
    fn root(&self) -> Arc<dyn Presentable> {
        self.navigation.clone()
    }

    fn navigate(&self, step: &Step) -> Result<FlowContributors, NavigationError> {
        let Some(step) = step.downcast_ref::<DemoStep>() else {
            return Ok(FlowContributors::None);
        };

        match step {
            DemoStep::Login => Ok(self.navigate_to_login()),
            DemoStep::UserIsLoggedIn | DemoStep::ApiKey => Ok(self.navigate_to_api_key()),
            DemoStep::ApiKeyIsComplete => Ok(self.complete()),
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
