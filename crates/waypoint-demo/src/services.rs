use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Persists whether the user went through onboarding
#[derive(Debug, Default)]
pub struct PreferencesService {
    onboarded: AtomicBool,
}

impl PreferencesService {
    /// Record the onboarding state
    pub fn set_onboarded(&self, onboarded: bool) {
        info!(onboarded, "Saving preferences");
        self.onboarded.store(onboarded, Ordering::SeqCst);
    }

    /// Whether the user went through onboarding
    pub fn is_onboarded(&self) -> bool {
        self.onboarded.load(Ordering::SeqCst)
    }
}

/// Keeps the movies the user picked
#[derive(Debug, Default)]
pub struct MoviesService {
    picked: Mutex<Vec<u32>>,
}

impl MoviesService {
    /// Remember a picked movie
    pub fn pick(&self, movie_id: u32) {
        self.picked.lock().push(movie_id);
    }

    /// Movies picked so far
    pub fn picked(&self) -> Vec<u32> {
        self.picked.lock().clone()
    }
}

/// Services shared by every flow
#[derive(Debug, Default)]
pub struct AppServices {
    /// User preferences
    pub preferences: PreferencesService,
    /// Movie catalog
    pub movies: MoviesService,
}

impl AppServices {
    /// Create services for a user who is, or is not yet, onboarded
    pub fn new(onboarded: bool) -> Self {
        let services = Self::default();
        services.preferences.onboarded.store(onboarded, Ordering::SeqCst);
        services
    }
}
