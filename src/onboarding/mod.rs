//! Onboarding: first-run wizard state and its persistence.
//!
//! The gates (`is_onboarding_completed`, `should_show_onboarding`,
//! `is_onboarding_required`) are pure functions over a loaded profile. The
//! `OnboardingResolver` loads profiles and goals from the document store and
//! performs the complete / skip / auto-save writes.

pub mod gate;
pub mod model;
pub mod resolver;
pub mod steps;

pub use gate::{is_onboarding_completed, is_onboarding_required, should_show_onboarding};
pub use model::{
    Demographics, Equipment, FitnessGoal, FitnessLevel, Measurements, OnboardingData,
    OnboardingProgress, PreferredTime, SchedulePreference, UserProfile,
};
pub use resolver::{OnboardingResolver, OnboardingStatus};
pub use steps::OnboardingStep;
