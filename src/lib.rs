//! Onboarding gates and current-plan resolution over a
//! document store.

pub mod config;
pub mod error;
pub mod onboarding;
pub mod plans;
pub mod store;
pub mod timestamp;
