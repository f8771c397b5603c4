use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;
use datamesh_application::{SubscriptionTracker, SubscriptionTrackerFactory, TrackerSession};
use datamesh_core::{AppError, AppResult};
use datamesh_domain::{SubscriptionRecord, SubscriptionRequest};
use tracing::{debug, info};
use uuid::Uuid;

use crate::aws_clients::generate_client;

mod item;

use item::{ATTR_SUBSCRIPTION_ID, item_to_record, record_to_item};

/// Default table holding subscription requests in the mesh account.
pub const DEFAULT_SUBSCRIPTION_TABLE: &str = "AwsDataMeshSubscriptions";

/// DynamoDB-backed subscription tracker.
#[derive(Clone)]
pub struct DynamoDbSubscriptionTracker {
    client: Client,
    table_name: String,
}

impl std::fmt::Debug for DynamoDbSubscriptionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDbSubscriptionTracker")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl DynamoDbSubscriptionTracker {
    /// Creates a tracker around a configured client.
    #[must_use]
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl SubscriptionTracker for DynamoDbSubscriptionTracker {
    async fn create_subscription_request(&self, request: SubscriptionRequest) -> AppResult<String> {
        let subscription_id = Uuid::new_v4().to_string();
        let record = SubscriptionRecord::pending(subscription_id.as_str(), request, Utc::now());

        let result = self
            .client
            .put_item()
            .table_name(self.table_name.as_str())
            .set_item(Some(record_to_item(&record)))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", ATTR_SUBSCRIPTION_ID)
            .send()
            .await;

        match result {
            Ok(_) => {}
            Err(SdkError::ServiceError(service))
                if matches!(
                    service.err(),
                    PutItemError::ConditionalCheckFailedException(_)
                ) =>
            {
                return Err(AppError::Conflict(format!(
                    "subscription '{subscription_id}' already exists"
                )));
            }
            Err(error) => return Err(AppError::upstream("dynamodb:PutItem", error)),
        }

        info!(
            subscription_id = %subscription_id,
            table_name = %self.table_name,
            "stored subscription request"
        );

        Ok(subscription_id)
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> AppResult<Option<SubscriptionRecord>> {
        let output = self
            .client
            .get_item()
            .table_name(self.table_name.as_str())
            .key(
                ATTR_SUBSCRIPTION_ID,
                AttributeValue::S(subscription_id.to_owned()),
            )
            .consistent_read(true)
            .send()
            .await
            .map_err(|error| AppError::upstream("dynamodb:GetItem", error))?;

        output.item().map(item_to_record).transpose()
    }
}

/// Connects DynamoDB trackers using the assumed session's credentials.
#[derive(Debug, Clone)]
pub struct DynamoDbSubscriptionTrackerFactory {
    table_name: String,
}

impl DynamoDbSubscriptionTrackerFactory {
    /// Creates a factory writing to `table_name`.
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
        }
    }
}

impl Default for DynamoDbSubscriptionTrackerFactory {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIPTION_TABLE)
    }
}

#[async_trait]
impl SubscriptionTrackerFactory for DynamoDbSubscriptionTrackerFactory {
    async fn connect(&self, session: TrackerSession) -> AppResult<Arc<dyn SubscriptionTracker>> {
        let client: Client =
            generate_client(session.region.as_str(), &session.credentials).await?;

        debug!(
            region = %session.region,
            table_name = %self.table_name,
            log_level = %session.log_level,
            "connected subscription tracker"
        );

        Ok(Arc::new(DynamoDbSubscriptionTracker::new(
            client,
            self.table_name.as_str(),
        )))
    }
}
