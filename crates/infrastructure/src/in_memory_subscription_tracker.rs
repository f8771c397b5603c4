use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use datamesh_application::{SubscriptionTracker, SubscriptionTrackerFactory, TrackerSession};
use datamesh_core::AppResult;
use datamesh_domain::{SubscriptionRecord, SubscriptionRequest};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// In-memory subscription tracker for local runs.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionTracker {
    records: RwLock<HashMap<String, SubscriptionRecord>>,
}

impl InMemorySubscriptionTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionTracker for InMemorySubscriptionTracker {
    async fn create_subscription_request(&self, request: SubscriptionRequest) -> AppResult<String> {
        let subscription_id = Uuid::new_v4().to_string();
        let record = SubscriptionRecord::pending(subscription_id.as_str(), request, Utc::now());

        self.records
            .write()
            .await
            .insert(subscription_id.clone(), record);

        Ok(subscription_id)
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> AppResult<Option<SubscriptionRecord>> {
        Ok(self.records.read().await.get(subscription_id).cloned())
    }
}

/// Hands out one shared in-memory tracker, whatever the session.
#[derive(Debug, Default, Clone)]
pub struct InMemorySubscriptionTrackerFactory {
    tracker: Arc<InMemorySubscriptionTracker>,
}

impl InMemorySubscriptionTrackerFactory {
    /// Creates a factory around an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionTrackerFactory for InMemorySubscriptionTrackerFactory {
    async fn connect(&self, session: TrackerSession) -> AppResult<Arc<dyn SubscriptionTracker>> {
        debug!(
            region = %session.region,
            log_level = %session.log_level,
            "using in-memory subscription tracker"
        );
        Ok(self.tracker.clone())
    }
}
