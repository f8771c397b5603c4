use std::env;
use std::path::PathBuf;

use datamesh_core::{AccountId, AppError, CredentialSource, LogLevel, SessionCredentials};
use datamesh_infrastructure::{DEFAULT_POLICY_TEMPLATE_DIR, DEFAULT_SUBSCRIPTION_TABLE};

const DEFAULT_VISIBILITY_MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerBackend {
    DynamoDb,
    InMemory,
}

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub data_mesh_account_id: AccountId,
    pub region: Option<String>,
    pub log_level: LogLevel,
    pub credential_source: CredentialSource,
    pub policy_template_dir: PathBuf,
    pub subscription_table: String,
    pub tracker_backend: TrackerBackend,
    pub visibility_max_attempts: u32,
}

impl ConsumerConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_mesh_account_id = optional("DATA_MESH_ACCOUNT_ID")
            .ok_or_else(|| AppError::Configuration("DATA_MESH_ACCOUNT_ID is required".to_owned()))
            .and_then(|value| {
                AccountId::new(value.trim()).map_err(|error| {
                    AppError::Configuration(format!("invalid DATA_MESH_ACCOUNT_ID: {error}"))
                })
            })?;

        let log_level = optional("DATA_MESH_LOG_LEVEL")
            .map(|value| value.parse::<LogLevel>())
            .transpose()?
            .unwrap_or_default();

        let credential_source = match optional("DATA_MESH_AWS_PROFILE") {
            Some(profile) => CredentialSource::Profile(profile.trim().to_owned()),
            None => {
                let access_key_id = optional("AWS_ACCESS_KEY_ID");
                let secret_access_key = optional("AWS_SECRET_ACCESS_KEY");
                let (Some(access_key_id), Some(secret_access_key)) =
                    (access_key_id, secret_access_key)
                else {
                    return Err(AppError::Configuration(
                        "set DATA_MESH_AWS_PROFILE or AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY"
                            .to_owned(),
                    ));
                };
                CredentialSource::Static(SessionCredentials::new(
                    access_key_id,
                    secret_access_key,
                    optional("AWS_SESSION_TOKEN"),
                )?)
            }
        };

        let tracker_backend = match optional("DATA_MESH_SUBSCRIPTION_TRACKER")
            .map(|value| value.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("dynamodb") => TrackerBackend::DynamoDb,
            Some("memory") => TrackerBackend::InMemory,
            Some(other) => {
                return Err(AppError::Configuration(format!(
                    "DATA_MESH_SUBSCRIPTION_TRACKER must be 'dynamodb' or 'memory', got '{other}'"
                )));
            }
        };

        let visibility_max_attempts = optional("DATA_MESH_USER_VISIBILITY_MAX_ATTEMPTS")
            .map(|value| {
                value.trim().parse::<u32>().map_err(|error| {
                    AppError::Configuration(format!(
                        "invalid DATA_MESH_USER_VISIBILITY_MAX_ATTEMPTS: {error}"
                    ))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_VISIBILITY_MAX_ATTEMPTS);

        Ok(Self {
            data_mesh_account_id,
            region: optional("AWS_REGION").map(|value| value.trim().to_owned()),
            log_level,
            credential_source,
            policy_template_dir: optional("DATA_MESH_POLICY_TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_POLICY_TEMPLATE_DIR)),
            subscription_table: optional("DATA_MESH_SUBSCRIPTION_TABLE")
                .unwrap_or_else(|| DEFAULT_SUBSCRIPTION_TABLE.to_owned()),
            tracker_backend,
            visibility_max_attempts,
        })
    }
}
