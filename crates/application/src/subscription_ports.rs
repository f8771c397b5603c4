use std::sync::Arc;

use async_trait::async_trait;
use datamesh_core::{AppResult, LogLevel, SessionCredentials};
use datamesh_domain::{SubscriptionRecord, SubscriptionRequest};

/// Port for the external subscription tracker.
#[async_trait]
pub trait SubscriptionTracker: Send + Sync {
    /// Stores a new pending request and returns its opaque identifier.
    async fn create_subscription_request(&self, request: SubscriptionRequest) -> AppResult<String>;

    /// Reads the current state of a request.
    async fn get_subscription(&self, subscription_id: &str)
    -> AppResult<Option<SubscriptionRecord>>;
}

/// Session a tracker is scoped to.
#[derive(Debug, Clone)]
pub struct TrackerSession {
    /// Temporary credentials of the assumed mesh session.
    pub credentials: SessionCredentials,
    /// Region the tracker's store lives in.
    pub region: String,
    /// Verbosity requested by the owning controller.
    pub log_level: LogLevel,
}

/// Builds trackers bound to one assumed session.
#[async_trait]
pub trait SubscriptionTrackerFactory: Send + Sync {
    /// Connects a tracker using only the given session.
    async fn connect(&self, session: TrackerSession) -> AppResult<Arc<dyn SubscriptionTracker>>;
}
