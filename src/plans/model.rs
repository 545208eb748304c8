//! Workout plan data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Fields;
use crate::timestamp;

/// A single exercise inside a workout day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    /// Rep prescription as written by the plan generator, e.g. "8-12".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One day of a plan's weekly schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDay {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub rest_day: bool,
}

/// Completion counters for a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressTracking {
    pub current_week: u32,
    pub completed_workouts: u32,
    pub total_workouts: u32,
    pub start_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl ProgressTracking {
    pub fn remaining_workouts(&self) -> u32 {
        self.total_workouts.saturating_sub(self.completed_workouts)
    }

    /// Completed share of the plan as a whole percentage, capped at 100.
    pub fn completion_percent(&self) -> u8 {
        if self.total_workouts == 0 {
            return 0;
        }
        let pct = u64::from(self.completed_workouts) * 100 / u64::from(self.total_workouts);
        pct.min(100) as u8
    }
}

/// A workout plan with normalized progress tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub goal: String,
    pub fitness_level: String,
    /// Plan length in weeks.
    pub duration: u32,
    pub workouts_per_week: u32,
    pub weekly_schedule: Vec<WorkoutDay>,
    pub progress_tracking: ProgressTracking,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutPlan {
    /// Create a fresh plan with zeroed progress.
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        duration: u32,
        workouts_per_week: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            description: None,
            goal: "general_fitness".to_string(),
            fitness_level: "beginner".to_string(),
            duration,
            workouts_per_week,
            weekly_schedule: Vec::new(),
            progress_tracking: ProgressTracking {
                current_week: 1,
                completed_workouts: 0,
                total_workouts: workouts_per_week.saturating_mul(duration),
                start_date: now,
                last_updated: now,
            },
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set goal and fitness level.
    pub fn with_target(mut self, goal: impl Into<String>, fitness_level: impl Into<String>) -> Self {
        self.goal = goal.into();
        self.fitness_level = fitness_level.into();
        self
    }

    /// Builder: set the weekly schedule.
    pub fn with_schedule(mut self, schedule: Vec<WorkoutDay>) -> Self {
        self.weekly_schedule = schedule;
        self
    }

    /// Builder: set the creation time (start date follows it).
    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self.progress_tracking.start_date = at;
        self.progress_tracking.last_updated = at;
        self
    }

    /// Whether every scheduled workout has been completed.
    pub fn is_finished(&self) -> bool {
        self.progress_tracking.total_workouts > 0 && self.progress_tracking.remaining_workouts() == 0
    }

    /// Document fields for storing this plan (the id is the document key).
    pub fn to_fields(&self) -> Fields {
        let mut fields = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Fields::new(),
        };
        fields.remove("id");
        fields.insert("createdAt".to_string(), timestamp::encode(self.created_at));
        fields.insert("updatedAt".to_string(), timestamp::encode(self.updated_at));
        fields
    }
}
