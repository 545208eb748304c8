//! Workout plans: current-plan selection and read-time normalization.

pub mod model;
pub mod normalize;
pub mod selector;

pub use model::{Exercise, ProgressTracking, WorkoutDay, WorkoutPlan};
pub use normalize::normalize;
pub use selector::PlanSelector;
