use std::sync::Arc;
use tracing::info;
use waypoint_core::{
    Flow, FlowContributors, NavigationError, Presentable, Readiness, SignalPresentable, Step,
};

use crate::screen::Screen;
use crate::services::AppServices;
use crate::steps::DemoStep;

/// Two tabs: the wishlist and the settings
pub struct DashboardFlow {
    tabs: Arc<SignalPresentable>,
    services: Arc<AppServices>,
    readiness: Readiness,
    wishlist: Arc<Screen>,
    settings: Arc<Screen>,
}

impl DashboardFlow {
    /// Flow name, also the window root name
    pub const NAME: &'static str = "dashboard";

    /// Create the flow and its tabs
    pub fn new(services: Arc<AppServices>) -> Arc<Self> {
        Arc::new(Self {
            tabs: Arc::new(SignalPresentable::new()),
            services,
            readiness: Readiness::new(),
            wishlist: Screen::new("wishlist"),
            settings: Screen::new("settings"),
        })
    }

    /// The tab container
    pub fn tabs(&self) -> &Arc<SignalPresentable> {
        &self.tabs
    }

    /// The wishlist tab
    pub fn wishlist(&self) -> &Arc<Screen> {
        &self.wishlist
    }

    /// The settings tab
    pub fn settings(&self) -> &Arc<Screen> {
        &self.settings
    }

    fn navigate_to_tabs(&self) -> FlowContributors {
        self.wishlist.present();
        self.settings.present();
        FlowContributors::Multiple(vec![
            self.wishlist.contributor(),
            self.settings.contributor(),
        ])
    }

    fn pick(&self, movie_id: u32) -> FlowContributors {
        info!(movie_id, "Movie picked");
        self.services.movies.pick(movie_id);
        FlowContributors::None
    }

    fn logout(&self) -> FlowContributors {
        self.wishlist.dismiss();
        self.settings.dismiss();
        FlowContributors::End(Step::new(DemoStep::Logout))
    }
}

impl Flow for DashboardFlow {
    fn root(&self) -> Arc<dyn Presentable> {
        self.tabs.clone()
    }

    fn navigate(&self, step: &Step) -> Result<FlowContributors, NavigationError> {
        let Some(step) = step.downcast_ref::<DemoStep>() else {
            return Ok(FlowContributors::None);
        };

        match step {
            DemoStep::Dashboard => Ok(self.navigate_to_tabs()),
            DemoStep::MoviePicked(movie_id) => Ok(self.pick(*movie_id)),
            DemoStep::Logout => Ok(self.logout()),
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
