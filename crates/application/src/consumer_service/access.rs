use datamesh_core::{AppError, AppResult};
use datamesh_domain::{SubscriptionRecord, SubscriptionRequest};
use tracing::info;

use super::ConsumerService;

impl ConsumerService {
    /// Submits a request for grants on a data product.
    ///
    /// The request is stored as given; a missing principal means the
    /// requesting consumer role. Returns the tracker's request id.
    pub async fn request_access_to_product(&self, request: SubscriptionRequest) -> AppResult<String> {
        let owner_account_id = request.owner_account_id.clone();
        let database_name = request.database_name.clone();

        let subscription_id = self.tracker.create_subscription_request(request).await?;

        info!(
            subscription_id = %subscription_id,
            owner_account_id = %owner_account_id,
            database_name = %database_name,
            "requested access to data product"
        );

        Ok(subscription_id)
    }

    /// Looks up a previously submitted request.
    pub async fn get_access_request(&self, request_id: &str) -> AppResult<Option<SubscriptionRecord>> {
        self.tracker.get_subscription(request_id).await
    }

    /// Lists active and pending grants held by `principal_id`.
    pub async fn list_product_access(&self, principal_id: &str) -> AppResult<Vec<SubscriptionRecord>> {
        Err(AppError::NotImplemented(format!(
            "listing product access for '{principal_id}'"
        )))
    }
}
