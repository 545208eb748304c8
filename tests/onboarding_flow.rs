//! Integration tests for onboarding writes against real and faulty stores.
//!
//! The faulty stores wrap a `MemoryStore` and fail selected operations so
//! the error contract of each onboarding operation can be exercised.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use fittrack_core::error::{OnboardingError, StoreError};
use fittrack_core::onboarding::{
    Equipment, FitnessGoal, OnboardingData, OnboardingProgress, OnboardingResolver,
    OnboardingStep, SchedulePreference, is_onboarding_completed,
};
use fittrack_core::store::{
    Document, DocumentStore, Fields, LibSqlStore, MemoryStore, Query, WriteOp, collections,
};

/// Store whose writes start failing after `ok_writes` successful ones.
struct FlakyStore {
    inner: MemoryStore,
    ok_writes: usize,
    attempts: AtomicUsize,
}

impl FlakyStore {
    fn new(ok_writes: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            ok_writes,
            attempts: AtomicUsize::new(0),
        }
    }

    fn check_write(&self) -> Result<(), StoreError> {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst);
        if n >= self.ok_writes {
            return Err(StoreError::Connection("store offline".to_string()));
        }
        Ok(())
    }

    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id).await
    }
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.inner.query(query).await
    }
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.set(collection, id, fields).await
    }
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.update(collection, id, fields).await
    }
    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.batch_write(ops).await
    }
}

fn fields(v: serde_json::Value) -> Fields {
    v.as_object().cloned().unwrap()
}

fn sample_data() -> OnboardingData {
    OnboardingData {
        fitness_goal: FitnessGoal::Strength,
        equipment_access: vec![Equipment::Barbell, Equipment::Bench],
        schedule_preference: SchedulePreference {
            days_per_week: 4,
            session_minutes: 60,
            ..Default::default()
        },
        selected_plan_id: Some("plan-42".to_string()),
        ..Default::default()
    }
}

async fn seed_profile(store: &dyn DocumentStore, user_id: &str) {
    store
        .set(
            collections::USERS,
            user_id,
            fields(json!({"onboardingCompleted": false})),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn complete_round_trip_marks_profile_completed() {
    let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
    seed_profile(&*store, "u1").await;
    let resolver = OnboardingResolver::new(store);

    resolver.complete(Some("u1"), sample_data()).await.unwrap();

    let profile = resolver.load_profile("u1").await.unwrap();
    assert!(is_onboarding_completed(profile.as_ref()));

    let data = profile.unwrap().onboarding_data.unwrap();
    assert!(data.completed_at.is_some());
    assert_eq!(data.fitness_goal, FitnessGoal::Strength);
    assert_eq!(data.selected_plan_id.as_deref(), Some("plan-42"));
}

#[tokio::test]
async fn status_follows_the_onboarding_lifecycle() {
    let store = Arc::new(MemoryStore::new());
    seed_profile(&*store, "u1").await;
    let resolver = OnboardingResolver::new(store.clone());

    let fresh = resolver.status("u1").await.unwrap();
    assert!(fresh.should_show);
    assert!(fresh.required);
    assert!(!fresh.completed);

    // A legacy account with a goal is never shown onboarding
    store
        .set(collections::GOALS, "g1", fields(json!({"userId": "u1"})))
        .await
        .unwrap();
    let legacy = resolver.status("u1").await.unwrap();
    assert!(legacy.has_goals);
    assert!(!legacy.should_show);
    assert!(!legacy.required);
    assert!(!legacy.completed);
}

#[tokio::test]
async fn status_for_unknown_user_does_not_show_onboarding() {
    let resolver = OnboardingResolver::new(Arc::new(MemoryStore::new()));
    let status = resolver.status("nobody").await.unwrap();
    assert!(!status.should_show);
    assert!(!status.required);
    assert!(!status.completed);
}

#[tokio::test]
async fn complete_without_user_fails_before_writing() {
    let store = Arc::new(MemoryStore::new());
    let resolver = OnboardingResolver::new(store.clone());

    let err = resolver.complete(None, sample_data()).await.unwrap_err();
    assert!(matches!(err, OnboardingError::AuthenticationRequired));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn skip_without_user_fails_with_zero_writes() {
    let store = Arc::new(MemoryStore::new());
    let resolver = OnboardingResolver::new(store.clone());

    for user in [None, Some(""), Some("  ")] {
        let err = resolver.skip(user).await.unwrap_err();
        assert!(matches!(err, OnboardingError::AuthenticationRequired));
    }
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn complete_first_write_failure_leaves_flag_unset() {
    let store = Arc::new(FlakyStore::new(1));
    seed_profile(&*store, "u1").await; // uses the one good write
    let resolver = OnboardingResolver::new(store.clone());

    let err = resolver.complete(Some("u1"), sample_data()).await.unwrap_err();
    assert!(matches!(err, OnboardingError::StoreUnavailable(_)));
    // The flag write was never attempted
    assert_eq!(store.attempts(), 2);

    let profile = resolver.load_profile("u1").await.unwrap().unwrap();
    assert!(!profile.onboarding_completed);
    assert!(profile.onboarding_data.is_none());
}

#[tokio::test]
async fn complete_flag_failure_is_partial_write() {
    let store = Arc::new(FlakyStore::new(2));
    seed_profile(&*store, "u1").await;
    let resolver = OnboardingResolver::new(store.clone());

    let err = resolver.complete(Some("u1"), sample_data()).await.unwrap_err();
    assert!(matches!(err, OnboardingError::PartialWriteFailure(_)));

    // Data stays persisted, flag stays unset
    let profile = resolver.load_profile("u1").await.unwrap().unwrap();
    assert!(!profile.onboarding_completed);
    assert!(profile.onboarding_data.unwrap().completed_at.is_some());
}

#[tokio::test]
async fn skip_store_failure_propagates() {
    let store = Arc::new(FlakyStore::new(1));
    seed_profile(&*store, "u1").await;
    let resolver = OnboardingResolver::new(store);

    let err = resolver.skip(Some("u1")).await.unwrap_err();
    assert!(matches!(err, OnboardingError::StoreUnavailable(_)));
}

#[tokio::test]
async fn save_progress_swallows_store_failures() {
    let store = Arc::new(FlakyStore::new(0));
    let resolver = OnboardingResolver::new(store.clone());

    let progress = OnboardingProgress::new(OnboardingStep::Goals);
    // Returns normally even though every write fails
    resolver.save_progress(Some("u1"), &progress).await;
    assert_eq!(store.attempts(), 1);

    // No user: silent no-op, no write attempted
    resolver.save_progress(None, &progress).await;
    assert_eq!(store.attempts(), 1);
}

#[tokio::test]
async fn rapid_auto_saves_last_write_wins() {
    let store = Arc::new(MemoryStore::new());
    seed_profile(&*store, "u1").await;
    let resolver = OnboardingResolver::new(store);

    let mut progress = OnboardingProgress::new(OnboardingStep::Welcome);
    for _ in 0..3 {
        progress.advance().unwrap();
        resolver.save_progress(Some("u1"), &progress).await;
    }

    let saved = resolver.saved_progress("u1").await.unwrap().unwrap();
    assert_eq!(saved.current_step, OnboardingStep::Measurements);
}
