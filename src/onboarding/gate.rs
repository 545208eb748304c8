//! Pure predicates deciding whether the onboarding flow applies.

use super::model::UserProfile;

/// True iff a profile is loaded and its onboarding flag is set.
pub fn is_onboarding_completed(profile: Option<&UserProfile>) -> bool {
    profile.is_some_and(|p| p.onboarding_completed)
}

/// The single gate for presenting onboarding.
///
/// A user who already has goals is treated as onboarded even when the flag is
/// unset; accounts created before onboarding existed never carry the flag.
pub fn should_show_onboarding(profile: Option<&UserProfile>, has_goals: bool) -> bool {
    match profile {
        Some(p) => !p.onboarding_completed && !has_goals,
        None => false,
    }
}

/// Same gate as `should_show_onboarding`, but never true before the profile loads.
pub fn is_onboarding_required(profile: Option<&UserProfile>, has_goals: bool) -> bool {
    profile.is_some() && should_show_onboarding(profile, has_goals)
}
