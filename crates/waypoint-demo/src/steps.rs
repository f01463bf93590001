use serde::{Deserialize, Serialize};

/// Every step of the demo application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemoStep {
    // Global
    Logout,

    // Onboarding
    Onboarding,
    Login,
    UserIsLoggedIn,
    ApiKey,
    ApiKeyIsComplete,
    OnboardingIsComplete,

    // Dashboard
    Dashboard,
    MoviePicked(u32),
    Settings,
}
