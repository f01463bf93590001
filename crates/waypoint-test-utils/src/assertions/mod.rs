//! Assertion utilities for navigation events.
//!
//! Helpers to drain will/did receivers and compare what was resolved, keeping
//! coordinator tests short.

mod navigation;

// Re-export all assertion helpers for easy access
pub use navigation::*;
