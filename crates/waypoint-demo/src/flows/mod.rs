/// Application flow
pub mod app_flow;

/// Onboarding flow
pub mod onboarding_flow;

/// Dashboard flow
pub mod dashboard_flow;

pub use app_flow::{AppFlow, AppStepper};
pub use dashboard_flow::DashboardFlow;
pub use onboarding_flow::OnboardingFlow;
