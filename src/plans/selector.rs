//! PlanSelector: resolves a user's current workout plan.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::model::WorkoutPlan;
use super::normalize::normalize;
use crate::error::StoreError;
use crate::store::{Direction, Document, DocumentStore, Query, collections};

/// Reads and normalizes a user's workout plans.
///
/// `current_plan`, `all_plans`, and `has_workout_plan` treat store failures
/// as "no plans"; use the `try_*` variants to tell the two apart.
pub struct PlanSelector {
    store: Arc<dyn DocumentStore>,
}

impl PlanSelector {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn plans_query(user_id: &str) -> Query {
        Query::collection(collections::WORKOUT_PLANS)
            .where_eq("userId", user_id)
            .order_by_instant("createdAt", Direction::Descending)
    }

    /// Normalize fetched documents in order, dropping any that cannot be decoded.
    fn decodable(docs: &[Document]) -> impl Iterator<Item = WorkoutPlan> + '_ {
        let now = Utc::now();
        docs.iter().filter_map(move |doc| match normalize(doc, now) {
            Ok(plan) => Some(plan),
            Err(e) => {
                warn!(plan_id = %doc.id, error = %e, "Skipping undecodable workout plan");
                None
            }
        })
    }

    /// Most recently created plan, or `None` if the user has none.
    ///
    /// The query is not limited: an undecodable newest document must not hide
    /// the older plans behind it.
    pub async fn try_current_plan(&self, user_id: &str) -> Result<Option<WorkoutPlan>, StoreError> {
        let docs = self.store.query(&Self::plans_query(user_id)).await?;
        let plan = Self::decodable(&docs).next();
        debug!(user_id, found = plan.is_some(), "Current plan resolved");
        Ok(plan)
    }

    /// Every plan, newest first.
    pub async fn try_all_plans(&self, user_id: &str) -> Result<Vec<WorkoutPlan>, StoreError> {
        let docs = self.store.query(&Self::plans_query(user_id)).await?;
        Ok(Self::decodable(&docs).collect())
    }

    /// Most recently created plan; store failures read as `None`.
    pub async fn current_plan(&self, user_id: &str) -> Option<WorkoutPlan> {
        match self.try_current_plan(user_id).await {
            Ok(plan) => plan,
            Err(e) => {
                warn!(user_id, error = %e, "Failed to fetch current workout plan");
                None
            }
        }
    }

    /// Every plan, newest first; store failures read as an empty list.
    pub async fn all_plans(&self, user_id: &str) -> Vec<WorkoutPlan> {
        match self.try_all_plans(user_id).await {
            Ok(plans) => plans,
            Err(e) => {
                warn!(user_id, error = %e, "Failed to fetch workout plans");
                Vec::new()
            }
        }
    }

    pub async fn has_workout_plan(&self, user_id: &str) -> bool {
        self.current_plan(user_id).await.is_some()
    }
}
