//! OnboardingResolver: reads onboarding state and writes completion,
//! skip, and auto-save updates to the user's profile document.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{OnboardingError, StoreError};
use crate::store::{DocumentStore, Fields, Query, collections};
use crate::timestamp;

use super::gate::{is_onboarding_completed, is_onboarding_required, should_show_onboarding};
use super::model::{OnboardingData, OnboardingProgress, UserProfile, profile_fields};
use super::steps::OnboardingStep;

/// Snapshot of a user's onboarding gates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnboardingStatus {
    pub completed: bool,
    pub required: bool,
    pub should_show: bool,
    pub has_goals: bool,
    /// Step to resume the wizard at, if answers were auto-saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_step: Option<OnboardingStep>,
}

impl OnboardingStatus {
    /// Derive the gates from an already-loaded profile.
    pub fn evaluate(profile: Option<&UserProfile>, has_goals: bool) -> Self {
        let completed = is_onboarding_completed(profile);
        let resume_step = if completed {
            None
        } else {
            profile
                .and_then(|p| p.onboarding_progress.as_ref())
                .map(|p| p.current_step)
        };
        Self {
            completed,
            required: is_onboarding_required(profile, has_goals),
            should_show: should_show_onboarding(profile, has_goals),
            has_goals,
            resume_step,
        }
    }
}

/// Treat a missing or blank id as unauthenticated.
fn authenticated(user_id: Option<&str>) -> Option<&str> {
    user_id.map(str::trim).filter(|id| !id.is_empty())
}

/// Coordinates onboarding reads and writes against the document store.
pub struct OnboardingResolver {
    store: Arc<dyn DocumentStore>,
}

impl OnboardingResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Load the user's profile, if the document exists.
    pub async fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        match self.store.get(collections::USERS, user_id).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// Whether the user owns at least one goal document.
    pub async fn has_goals(&self, user_id: &str) -> Result<bool, StoreError> {
        let query = Query::collection(collections::GOALS)
            .where_eq("userId", user_id)
            .limit(1);
        Ok(!self.store.query(&query).await?.is_empty())
    }

    /// Last auto-saved wizard progress, if any.
    pub async fn saved_progress(
        &self,
        user_id: &str,
    ) -> Result<Option<OnboardingProgress>, StoreError> {
        Ok(self
            .load_profile(user_id)
            .await?
            .and_then(|p| p.onboarding_progress))
    }

    /// Load profile and goals and evaluate every onboarding gate.
    pub async fn status(&self, user_id: &str) -> Result<OnboardingStatus, StoreError> {
        let profile = self.load_profile(user_id).await?;
        let has_goals = self.has_goals(user_id).await?;
        let status = OnboardingStatus::evaluate(profile.as_ref(), has_goals);
        debug!(
            user_id,
            completed = status.completed,
            should_show = status.should_show,
            "Onboarding status evaluated"
        );
        Ok(status)
    }

    /// Persist the full onboarding record, then flag the profile as completed.
    ///
    /// The two writes are sequential, not transactional. If the record write
    /// fails nothing else is written; if the flag write fails the record stays
    /// persisted and `PartialWriteFailure` is returned.
    pub async fn complete(
        &self,
        user_id: Option<&str>,
        data: OnboardingData,
    ) -> Result<(), OnboardingError> {
        let user_id = authenticated(user_id).ok_or(OnboardingError::AuthenticationRequired)?;

        let now = Utc::now();
        let record = OnboardingData {
            completed_at: Some(now),
            ..data
        };
        let record = serde_json::to_value(&record)
            .map_err(|e| OnboardingError::StoreUnavailable(e.into()))?;

        let mut data_fields = Fields::new();
        data_fields.insert(profile_fields::ONBOARDING_DATA.to_string(), record);
        data_fields.insert(profile_fields::UPDATED_AT.to_string(), timestamp::encode(now));

        self.store
            .set(collections::USERS, user_id, data_fields)
            .await
            .map_err(|e| {
                warn!(user_id, error = %e, "Failed to save onboarding data");
                OnboardingError::StoreUnavailable(e)
            })?;

        self.store
            .update(collections::USERS, user_id, completion_fields())
            .await
            .map_err(|e| {
                warn!(user_id, error = %e, "Onboarding data saved but completion flag failed");
                OnboardingError::PartialWriteFailure(e)
            })?;

        info!(user_id, "Onboarding completed");
        Ok(())
    }

    /// Best-effort auto-save of partial answers.
    ///
    /// Never fails: a missing user is a no-op and store errors are only logged.
    /// The return type is `()` on purpose, so callers cannot mistake an
    /// auto-save failure for one that blocks the wizard.
    pub async fn save_progress(&self, user_id: Option<&str>, progress: &OnboardingProgress) {
        let Some(user_id) = authenticated(user_id) else {
            debug!("Skipping onboarding auto-save: no authenticated user");
            return;
        };

        let value = match serde_json::to_value(progress) {
            Ok(v) => v,
            Err(e) => {
                warn!(user_id, error = %e, "Failed to serialize onboarding progress");
                return;
            }
        };

        let mut fields = Fields::new();
        fields.insert(profile_fields::ONBOARDING_PROGRESS.to_string(), value);
        match self.store.set(collections::USERS, user_id, fields).await {
            Ok(()) => debug!(user_id, step = %progress.current_step, "Onboarding progress saved"),
            Err(e) => warn!(user_id, error = %e, "Failed to auto-save onboarding progress"),
        }
    }

    /// Mark onboarding completed without an onboarding record.
    pub async fn skip(&self, user_id: Option<&str>) -> Result<(), OnboardingError> {
        let user_id = authenticated(user_id).ok_or(OnboardingError::AuthenticationRequired)?;

        self.store
            .update(collections::USERS, user_id, completion_fields())
            .await
            .map_err(|e| {
                warn!(user_id, error = %e, "Failed to skip onboarding");
                OnboardingError::StoreUnavailable(e)
            })?;

        info!(user_id, "Onboarding skipped");
        Ok(())
    }
}

/// Fields flipping the completion flag; also clears any auto-saved progress.
fn completion_fields() -> Fields {
    let mut fields = Fields::new();
    fields.insert(profile_fields::ONBOARDING_COMPLETED.to_string(), Value::Bool(true));
    fields.insert(profile_fields::ONBOARDING_PROGRESS.to_string(), Value::Null);
    fields.insert(
        profile_fields::UPDATED_AT.to_string(),
        timestamp::encode(Utc::now()),
    );
    fields
}
