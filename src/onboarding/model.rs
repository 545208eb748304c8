//! User profile and onboarding data models.
//!
//! Field names follow the camelCase documents shared with the web client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::steps::OnboardingStep;

/// Primary goal picked during onboarding.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    WeightLoss,
    MuscleGain,
    Strength,
    Endurance,
    Flexibility,
    #[default]
    GeneralFitness,
}

/// Self-reported training experience.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FitnessLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// Equipment the user has access to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    #[serde(rename = "none")]
    BodyweightOnly,
    Dumbbells,
    Barbell,
    Kettlebells,
    ResistanceBands,
    PullUpBar,
    Bench,
    CardioMachines,
    FullGym,
}

/// When the user prefers to train.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PreferredTime {
    Morning,
    Afternoon,
    Evening,
    #[default]
    Flexible,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

/// Optional body measurements and targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Measurements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chest_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hips_cm: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePreference {
    pub days_per_week: u32,
    pub session_minutes: u32,
    #[serde(default)]
    pub preferred_time: PreferredTime,
}

impl Default for SchedulePreference {
    fn default() -> Self {
        Self {
            days_per_week: 3,
            session_minutes: 45,
            preferred_time: PreferredTime::default(),
        }
    }
}

/// The full onboarding record written on completion.
///
/// Stored on the user's profile under `onboardingData`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingData {
    #[serde(default)]
    pub demographics: Demographics,
    #[serde(default)]
    pub fitness_goal: FitnessGoal,
    #[serde(default)]
    pub fitness_level: FitnessLevel,
    #[serde(default)]
    pub measurements: Measurements,
    #[serde(default)]
    pub equipment_access: Vec<Equipment>,
    #[serde(default)]
    pub schedule_preference: SchedulePreference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_plan_id: Option<String>,
    #[serde(
        default,
        with = "crate::timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Partial answers auto-saved while the wizard is in progress.
///
/// Stored on the user's profile under `onboardingProgress`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingProgress {
    /// Step the user was on when the answers were saved.
    #[serde(default)]
    pub current_step: OnboardingStep,
    /// Answers collected so far, keyed by the client's form field names.
    #[serde(default = "empty_object")]
    pub answers: Value,
    #[serde(with = "crate::timestamp::required")]
    pub saved_at: DateTime<Utc>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl OnboardingProgress {
    pub fn new(current_step: OnboardingStep) -> Self {
        Self {
            current_step,
            answers: empty_object(),
            saved_at: Utc::now(),
        }
    }

    /// Merge a step's answers (a JSON object) into the collected answers.
    ///
    /// Non-object input is ignored.
    pub fn record_answers(&mut self, step_answers: Value) {
        let Value::Object(incoming) = step_answers else {
            return;
        };
        if !self.answers.is_object() {
            self.answers = empty_object();
        }
        if let Some(answers) = self.answers.as_object_mut() {
            answers.extend(incoming);
        }
        self.saved_at = Utc::now();
    }

    /// Advance to the next step. Returns an error if already at the terminal step.
    pub fn advance(&mut self) -> Result<OnboardingStep, String> {
        let next = self
            .current_step
            .next()
            .ok_or_else(|| "Already at terminal step".to_string())?;
        if !self.current_step.can_transition_to(next) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.current_step, next
            ));
        }
        self.current_step = next;
        self.saved_at = Utc::now();
        Ok(next)
    }

    /// Go back one step. Returns an error at the first or terminal step.
    pub fn back(&mut self) -> Result<OnboardingStep, String> {
        let previous = self
            .current_step
            .previous()
            .ok_or_else(|| format!("Cannot go back from {}", self.current_step))?;
        self.current_step = previous;
        self.saved_at = Utc::now();
        Ok(previous)
    }
}

/// The onboarding-relevant slice of a user's profile document.
///
/// Unknown profile fields (email, display name, ...) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_data: Option<OnboardingData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_progress: Option<OnboardingProgress>,
}

/// Profile field names written by the onboarding operations.
pub mod profile_fields {
    pub const ONBOARDING_COMPLETED: &str = "onboardingCompleted";
    pub const ONBOARDING_DATA: &str = "onboardingData";
    pub const ONBOARDING_PROGRESS: &str = "onboardingProgress";
    pub const UPDATED_AT: &str = "updatedAt";
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn profile_tolerates_missing_and_unknown_fields() {
        let profile: UserProfile =
            serde_json::from_value(json!({"email": "a@b.c", "displayName": "A"})).unwrap();
        assert!(!profile.onboarding_completed);
        assert!(profile.onboarding_data.is_none());
        assert!(profile.onboarding_progress.is_none());
    }

    #[test]
    fn null_progress_reads_as_none() {
        let profile: UserProfile = serde_json::from_value(json!({
            "onboardingCompleted": true,
            "onboardingProgress": null
        }))
        .unwrap();
        assert!(profile.onboarding_completed);
        assert!(profile.onboarding_progress.is_none());
    }

    #[test]
    fn onboarding_data_uses_client_field_names() {
        let data = OnboardingData {
            fitness_goal: FitnessGoal::MuscleGain,
            equipment_access: vec![Equipment::Dumbbells, Equipment::PullUpBar],
            selected_plan_id: Some("plan-1".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&data).unwrap();

        assert_eq!(value["fitnessGoal"], "muscle_gain");
        assert_eq!(value["equipmentAccess"], json!(["dumbbells", "pull_up_bar"]));
        assert_eq!(value["selectedPlanId"], "plan-1");
        assert_eq!(value["schedulePreference"]["daysPerWeek"], 3);
        // Unset completion time is omitted entirely
        assert!(value.get("completedAt").is_none());
    }

    #[test]
    fn completed_at_accepts_firestore_timestamps() {
        let data: OnboardingData = serde_json::from_value(json!({
            "completedAt": {"seconds": 1_700_000_000, "nanoseconds": 0}
        }))
        .unwrap();
        assert_eq!(data.completed_at.unwrap().timestamp(), 1_700_000_000);
        assert_eq!(data.fitness_level, FitnessLevel::Beginner);
    }

    #[test]
    fn progress_records_and_advances() {
        let mut progress = OnboardingProgress::new(OnboardingStep::Welcome);
        progress.record_answers(json!({"age": 31}));
        progress.record_answers(json!({"gender": "female"}));
        progress.record_answers(json!("not an object"));

        assert_eq!(progress.answers, json!({"age": 31, "gender": "female"}));

        assert_eq!(progress.advance().unwrap(), OnboardingStep::Demographics);
        assert_eq!(progress.back().unwrap(), OnboardingStep::Welcome);
        assert!(progress.back().is_err());
    }

    #[test]
    fn progress_cannot_advance_past_complete() {
        let mut progress = OnboardingProgress::new(OnboardingStep::PlanSelection);
        assert_eq!(progress.advance().unwrap(), OnboardingStep::Complete);
        assert!(progress.advance().is_err());
        assert!(progress.back().is_err());
    }

    #[test]
    fn progress_rejects_bad_saved_at() {
        let err = serde_json::from_value::<OnboardingProgress>(json!({
            "currentStep": "goals",
            "savedAt": "whenever"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("invalid timestamp"));
    }
}
