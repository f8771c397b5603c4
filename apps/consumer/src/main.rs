//! Data mesh consumer command-line entry point.

#![forbid(unsafe_code)]

mod cli;
mod consumer_config;

use std::sync::Arc;

use clap::Parser;
use datamesh_application::{
    ConsumerService, ConsumerSettings, IamProvisioningService, SubscriptionTrackerFactory,
    VisibilityPolicy,
};
use datamesh_core::{AppError, LogLevel};
use datamesh_infrastructure::{
    AwsIamGateway, AwsIdentityGateway, DynamoDbSubscriptionTrackerFactory,
    FilePolicyTemplateRenderer, InMemorySubscriptionTrackerFactory, load_sdk_config,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, subscription_request};
use crate::consumer_config::{ConsumerConfig, TrackerBackend};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = ConsumerConfig::load()?;
    init_tracing(config.log_level);

    let service = build_consumer_service(&config).await?;

    match &cli.command {
        Command::Init => {
            let role = service.initialize_consumer_account().await?;
            info!(outcome = role.outcome(), "consumer account initialised");
            println!("{}", role.value());
        }
        Command::Request {
            owner_account_id,
            database,
            permissions,
            tables,
            principal,
        } => {
            let request = subscription_request(
                owner_account_id,
                database,
                permissions,
                tables,
                principal.as_deref(),
            );
            println!("{}", service.request_access_to_product(request).await?);
        }
        Command::Get { request_id } => {
            let record = service
                .get_access_request(request_id.as_str())
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("access request '{request_id}' does not exist"))
                })?;
            let rendered = serde_json::to_string_pretty(&record).map_err(|error| {
                AppError::Internal(format!("failed to render access request: {error}"))
            })?;
            println!("{rendered}");
        }
        Command::List { principal_id } => {
            let records = service.list_product_access(principal_id.as_str()).await?;
            let rendered = serde_json::to_string_pretty(&records).map_err(|error| {
                AppError::Internal(format!("failed to render product access: {error}"))
            })?;
            println!("{rendered}");
        }
    }

    Ok(())
}

async fn build_consumer_service(config: &ConsumerConfig) -> Result<ConsumerService, AppError> {
    let sdk_config = load_sdk_config(&config.credential_source, config.region.as_deref()).await;

    let defaults = VisibilityPolicy::default();
    let provisioning = IamProvisioningService::new(
        Arc::new(AwsIamGateway::from_sdk_config(&sdk_config)),
        Arc::new(FilePolicyTemplateRenderer::new(
            config.policy_template_dir.clone(),
        )),
    )
    .with_visibility_policy(VisibilityPolicy::new(
        config.visibility_max_attempts,
        defaults.initial_delay,
        defaults.max_delay,
    ));

    let tracker_factory: Box<dyn SubscriptionTrackerFactory> = match config.tracker_backend {
        TrackerBackend::DynamoDb => Box::new(DynamoDbSubscriptionTrackerFactory::new(
            config.subscription_table.as_str(),
        )),
        TrackerBackend::InMemory => Box::new(InMemorySubscriptionTrackerFactory::new()),
    };

    ConsumerService::connect(
        ConsumerSettings {
            data_mesh_account_id: config.data_mesh_account_id.clone(),
            region: config.region.clone(),
            log_level: config.log_level,
        },
        Arc::new(AwsIdentityGateway::from_sdk_config(&sdk_config)),
        provisioning,
        tracker_factory.as_ref(),
    )
    .await
}

fn init_tracing(log_level: LogLevel) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
