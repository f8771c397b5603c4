//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod aws_clients;
mod aws_iam_gateway;
mod aws_identity_gateway;
mod dynamodb_subscription_tracker;
mod file_policy_template_renderer;
mod in_memory_subscription_tracker;

pub use aws_clients::{AwsServiceClient, generate_client, load_sdk_config};
pub use aws_iam_gateway::AwsIamGateway;
pub use aws_identity_gateway::AwsIdentityGateway;
pub use dynamodb_subscription_tracker::{
    DEFAULT_SUBSCRIPTION_TABLE, DynamoDbSubscriptionTracker, DynamoDbSubscriptionTrackerFactory,
};
pub use file_policy_template_renderer::{DEFAULT_POLICY_TEMPLATE_DIR, FilePolicyTemplateRenderer};
pub use in_memory_subscription_tracker::{
    InMemorySubscriptionTracker, InMemorySubscriptionTrackerFactory,
};
