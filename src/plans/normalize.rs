//! Read-time normalization of stored plan documents.
//!
//! Stored plans may predate progress tracking or carry only some of its
//! fields. Stored values always win; missing ones are synthesized here and
//! never written back.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::model::{ProgressTracking, WorkoutDay, WorkoutPlan};
use crate::error::StoreError;
use crate::store::Document;
use crate::timestamp;

/// Plan document as stored: every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredPlan {
    user_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    goal: Option<String>,
    fitness_level: Option<String>,
    duration: Option<u32>,
    workouts_per_week: Option<u32>,
    weekly_schedule: Option<Vec<WorkoutDay>>,
    progress_tracking: Option<StoredProgress>,
    created_at: Option<Value>,
    updated_at: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredProgress {
    current_week: Option<u32>,
    completed_workouts: Option<u32>,
    total_workouts: Option<u32>,
    start_date: Option<Value>,
    last_updated: Option<Value>,
}

/// Build a `WorkoutPlan` from a stored document, filling defaults as of `now`.
///
/// - `currentWeek` → 1, `completedWorkouts` → 0
/// - `totalWorkouts` → `workoutsPerWeek * duration`
/// - `startDate` → the plan's `createdAt`, `lastUpdated` → `now`
/// - missing or undecodable `createdAt` / `updatedAt` → `now`
pub fn normalize(doc: &Document, now: DateTime<Utc>) -> Result<WorkoutPlan, StoreError> {
    let stored: StoredPlan = doc.decode()?;

    let created_at = timestamp::decode_or(stored.created_at.as_ref(), now);
    let updated_at = timestamp::decode_or(stored.updated_at.as_ref(), now);
    let duration = stored.duration.unwrap_or(0);
    let workouts_per_week = stored.workouts_per_week.unwrap_or(0);

    let progress = stored.progress_tracking.unwrap_or_default();
    let progress_tracking = ProgressTracking {
        current_week: progress.current_week.unwrap_or(1),
        completed_workouts: progress.completed_workouts.unwrap_or(0),
        total_workouts: progress
            .total_workouts
            .unwrap_or_else(|| workouts_per_week.saturating_mul(duration)),
        start_date: timestamp::decode_or(progress.start_date.as_ref(), created_at),
        last_updated: timestamp::decode_or(progress.last_updated.as_ref(), now),
    };

    Ok(WorkoutPlan {
        id: doc.id.clone(),
        user_id: stored.user_id.unwrap_or_default(),
        title: stored.title.unwrap_or_default(),
        description: stored.description,
        goal: stored.goal.unwrap_or_default(),
        fitness_level: stored.fitness_level.unwrap_or_default(),
        duration,
        workouts_per_week,
        weekly_schedule: stored.weekly_schedule.unwrap_or_default(),
        progress_tracking,
        created_at,
        updated_at,
    })
}
