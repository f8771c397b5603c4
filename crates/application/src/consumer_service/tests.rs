use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use datamesh_core::{AppError, LogLevel};
use datamesh_domain::{
    AssumeRoleDocument, OneOrMany, SubscriptionRequest, SubscriptionStatus,
};

use crate::test_support::{
    FakeIamGateway, FakeIdentityGateway, FakeSubscriptionTrackerFactory, FakeTemplateRenderer,
    account,
};
use crate::{ConsumerSettings, IamProvisioningService, Provisioned, VisibilityPolicy};

use super::ConsumerService;
use super::session::session_name;

const CONSUMER_ACCOUNT: &str = "111111111111";
const MESH_ACCOUNT: &str = "999999999999";
const MESH_ROLE_ARN: &str = "arn:aws:iam::999999999999:role/AwsDataMesh/DataMeshAdminConsumer";

struct Harness {
    iam: Arc<FakeIamGateway>,
    identity: Arc<FakeIdentityGateway>,
    trackers: FakeSubscriptionTrackerFactory,
}

impl Harness {
    fn new() -> Self {
        Self {
            iam: Arc::new(FakeIamGateway::new(CONSUMER_ACCOUNT)),
            identity: Arc::new(FakeIdentityGateway::new(CONSUMER_ACCOUNT)),
            trackers: FakeSubscriptionTrackerFactory::default(),
        }
    }

    fn settings(region: Option<&str>) -> ConsumerSettings {
        ConsumerSettings {
            data_mesh_account_id: account(MESH_ACCOUNT),
            region: region.map(str::to_owned),
            log_level: LogLevel::Debug,
        }
    }

    async fn connect(&self, region: Option<&str>) -> Result<ConsumerService, AppError> {
        let templates = FakeTemplateRenderer::default().with_template(
            "consumer_policy.pystache",
            r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"sts:AssumeRole","Resource":"arn:aws:iam::{{data_mesh_account_id}}:role/AwsDataMesh/DataMeshAdminConsumer"}]}"#,
        );
        let provisioning = IamProvisioningService::new(self.iam.clone(), Arc::new(templates))
            .with_visibility_policy(VisibilityPolicy::new(2, Duration::ZERO, Duration::ZERO));

        ConsumerService::connect(
            Self::settings(region),
            self.identity.clone(),
            provisioning,
            &self.trackers,
        )
        .await
    }

    async fn connected(&self) -> ConsumerService {
        match self.connect(Some("eu-west-1")).await {
            Ok(service) => service,
            Err(error) => panic!("connect failed: {error}"),
        }
    }
}

#[tokio::test]
async fn connect_without_region_fails_before_any_network_call() {
    let harness = Harness::new();

    let missing = harness.connect(None).await;
    let blank = harness.connect(Some("  ")).await;

    assert!(matches!(missing, Err(AppError::Configuration(_))));
    assert!(matches!(blank, Err(AppError::Configuration(_))));
    assert!(harness.identity.calls.lock().await.is_empty());
    assert!(harness.trackers.sessions.lock().await.is_empty());
}

#[tokio::test]
async fn connect_binds_tracker_to_assumed_mesh_session() {
    let harness = Harness::new();

    let service = harness.connected().await;

    let calls = harness.identity.calls.lock().await;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], "get_caller_identity");
    assert_eq!(
        calls[1],
        format!("assume_role:{MESH_ROLE_ARN}:{}", service.session_name())
    );
    assert!(service.session_name().starts_with("AIDAEXAMPLE-111111111111-"));

    let sessions = harness.trackers.sessions.lock().await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].region, "eu-west-1");
    assert_eq!(sessions[0].log_level, LogLevel::Debug);
    assert_eq!(sessions[0].credentials.access_key_id(), "ASIAEXAMPLE");
    assert_eq!(service.region(), "eu-west-1");
    assert_eq!(service.data_mesh_account_id().as_str(), MESH_ACCOUNT);
}

#[test]
fn session_name_is_sanitised_and_bounded() {
    let Some(date) = NaiveDate::from_ymd_opt(2024, 3, 5) else {
        panic!("fixture date is valid");
    };

    assert_eq!(
        session_name("AROAEXAMPLE:jane", CONSUMER_ACCOUNT, date),
        "AROAEXAMPLE-jane-111111111111-2024-03-05"
    );

    let long = session_name(&"A".repeat(80), CONSUMER_ACCOUNT, date);
    assert_eq!(long.len(), 64);
    assert!(long.chars().all(|character| character == 'A'));
}

#[tokio::test]
async fn initialize_requires_admin_consumer_role_in_caller_account() {
    let harness = Harness::new();
    let service = harness.connected().await;

    let result = service.initialize_consumer_account().await;

    assert!(matches!(result, Err(AppError::Precondition(_))));
    assert!(harness.iam.state.lock().await.policies.is_empty());
}

#[tokio::test]
async fn initialize_lets_consumer_group_assume_mesh_role() {
    let harness = Harness::new();
    harness
        .iam
        .insert_role(
            "DataMeshAdminConsumer",
            r#"{"Version":"2012-10-17","Statement":[]}"#,
        )
        .await;
    let service = harness.connected().await;

    let first = service.initialize_consumer_account().await;
    let second = service.initialize_consumer_account().await;

    let expected_role = "arn:aws:iam::111111111111:role/AwsDataMesh/DataMeshConsumer";
    assert!(matches!(first, Ok(Provisioned::Created(ref arn)) if arn == expected_role));
    assert!(matches!(second, Ok(Provisioned::Existing(ref arn)) if arn == expected_role));

    let state = harness.iam.state.lock().await;
    let Some((policy_arn, policy)) = state.policies.get("AssumeDataMeshAdminConsumer") else {
        panic!("mesh assume policy was not created");
    };
    let document = match AssumeRoleDocument::from_json(policy.document.as_str()) {
        Ok(document) => document,
        Err(error) => panic!("policy document did not parse: {error}"),
    };
    assert_eq!(
        document.statements()[0].resource(),
        Some(&OneOrMany::One(MESH_ROLE_ARN.to_owned()))
    );
    assert!(state.group_policies.contains(&(
        "DataMeshConsumerGroup".to_owned(),
        policy_arn.clone()
    )));
    assert!(state.group_policies.contains(&(
        "DataMeshConsumerGroup".to_owned(),
        "arn:aws:iam::111111111111:policy/AwsDataMesh/AssumeDataMeshConsumer".to_owned()
    )));
    assert_eq!(state.group_policies.len(), 2);

    let Some((_, access_policy)) = state.policies.get("DataMeshConsumerAccess") else {
        panic!("consumer access policy was not created");
    };
    assert!(access_policy.document.contains(MESH_ROLE_ARN));
}

#[tokio::test]
async fn request_access_round_trips_through_tracker() {
    let harness = Harness::new();
    let service = harness.connected().await;

    let request_id = service
        .request_access_to_product(SubscriptionRequest {
            owner_account_id: "222222222222".to_owned(),
            database_name: "sales_db".to_owned(),
            tables: None,
            principal: None,
            requested_grants: vec!["SELECT".to_owned()],
        })
        .await;
    let Ok(request_id) = request_id else {
        panic!("request should be accepted");
    };
    assert!(!request_id.is_empty());

    let record = match service.get_access_request(request_id.as_str()).await {
        Ok(Some(record)) => record,
        other => panic!("expected stored record, got {other:?}"),
    };
    assert_eq!(record.subscription_id(), request_id);
    assert_eq!(record.owner_account_id(), "222222222222");
    assert_eq!(record.database_name(), "sales_db");
    assert_eq!(record.status(), SubscriptionStatus::Pending);
    assert_eq!(record.request().requested_grants, vec!["SELECT".to_owned()]);
}

#[tokio::test]
async fn get_access_request_returns_none_for_unknown_id() {
    let harness = Harness::new();
    let service = harness.connected().await;

    let record = service.get_access_request("does-not-exist").await;

    assert!(matches!(record, Ok(None)));
}

#[tokio::test]
async fn list_product_access_is_not_implemented() {
    let harness = Harness::new();
    let service = harness.connected().await;
    let calls_before = harness.identity.calls.lock().await.len();

    let result = service.list_product_access("arn:aws:iam::111111111111:user/jane").await;

    assert!(matches!(result, Err(AppError::NotImplemented(_))));
    assert_eq!(harness.identity.calls.lock().await.len(), calls_before);
}
