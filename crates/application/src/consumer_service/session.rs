use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use datamesh_core::{AppError, AppResult};
use datamesh_domain::data_mesh_admin_consumer_role_arn;
use tracing::debug;

use crate::{IamProvisioningService, IdentityGateway, SubscriptionTrackerFactory, TrackerSession};

use super::{ConsumerService, ConsumerSettings};

/// STS limit on `RoleSessionName`.
const MAX_SESSION_NAME_LEN: usize = 64;

impl ConsumerService {
    /// Builds a controller for the caller's account.
    ///
    /// Fails with `AppError::Configuration` before any network call when no
    /// region is set. Otherwise assumes the mesh admin-consumer role and binds
    /// a tracker to that session.
    pub async fn connect(
        settings: ConsumerSettings,
        identity: Arc<dyn IdentityGateway>,
        provisioning: IamProvisioningService,
        tracker_factory: &dyn SubscriptionTrackerFactory,
    ) -> AppResult<Self> {
        let ConsumerSettings {
            data_mesh_account_id,
            region,
            log_level,
        } = settings;

        let region = region
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                AppError::Configuration(
                    "cannot create a data mesh consumer without AWS_REGION".to_owned(),
                )
            })?;

        let caller = identity.caller_identity().await?;
        let session_name = session_name(
            caller.user_id.as_str(),
            caller.account_id.as_str(),
            Utc::now().date_naive(),
        );

        let role_arn = data_mesh_admin_consumer_role_arn(&data_mesh_account_id);
        let credentials = identity
            .assume_role(role_arn.as_str(), session_name.as_str())
            .await?;
        debug!(
            role_arn = %role_arn,
            session_name = %session_name,
            "assumed data mesh admin consumer session"
        );

        let tracker = tracker_factory
            .connect(TrackerSession {
                credentials,
                region: region.clone(),
                log_level,
            })
            .await?;

        Ok(Self {
            data_mesh_account_id,
            region,
            session_name,
            identity,
            provisioning,
            tracker,
        })
    }
}

/// Builds `{user_id}-{account}-{YYYY-MM-DD}`, restricted to the characters
/// and length STS accepts.
pub(super) fn session_name(user_id: &str, account_id: &str, date: NaiveDate) -> String {
    format!("{user_id}-{account_id}-{}", date.format("%Y-%m-%d"))
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || "+=,.@_-".contains(character) {
                character
            } else {
                '-'
            }
        })
        .take(MAX_SESSION_NAME_LEN)
        .collect()
}
