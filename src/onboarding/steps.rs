//! Onboarding wizard steps: which screen the user is on.

use serde::{Deserialize, Serialize};

/// The screens of the onboarding wizard.
///
/// Progresses linearly: Welcome → Demographics → Goals → Measurements →
/// Equipment → Schedule → PlanSelection → Complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    #[default]
    Welcome,
    Demographics,
    Goals,
    Measurements,
    Equipment,
    Schedule,
    PlanSelection,
    Complete,
}

impl OnboardingStep {
    /// Every step, in wizard order.
    pub const ALL: [OnboardingStep; 8] = [
        Self::Welcome,
        Self::Demographics,
        Self::Goals,
        Self::Measurements,
        Self::Equipment,
        Self::Schedule,
        Self::PlanSelection,
        Self::Complete,
    ];

    fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }

    /// Check if moving from `self` to `target` is a single step forward or back.
    pub fn can_transition_to(&self, target: OnboardingStep) -> bool {
        if self.is_terminal() {
            return false;
        }
        let from = self.position();
        let to = target.position();
        to == from + 1 || to + 1 == from
    }

    /// Whether this step is terminal (onboarding is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// The next step, if any.
    pub fn next(&self) -> Option<OnboardingStep> {
        Self::ALL.get(self.position() + 1).copied()
    }

    /// The previous step, if any. The terminal step has no way back.
    pub fn previous(&self) -> Option<OnboardingStep> {
        if self.is_terminal() {
            return None;
        }
        self.position().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// 1-based index for "step N of M" displays.
    pub fn number(&self) -> usize {
        self.position() + 1
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::Demographics => "demographics",
            Self::Goals => "goals",
            Self::Measurements => "measurements",
            Self::Equipment => "equipment",
            Self::Schedule => "schedule",
            Self::PlanSelection => "plan_selection",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}
