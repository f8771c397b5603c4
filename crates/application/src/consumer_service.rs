use std::sync::Arc;

use datamesh_core::{AccountId, LogLevel};

use crate::{IamProvisioningService, IdentityGateway, SubscriptionTracker};

/// Settings a consumer controller is built from.
#[derive(Debug, Clone)]
pub struct ConsumerSettings {
    /// Central mesh account hosting the admin-consumer role and the tracker.
    pub data_mesh_account_id: AccountId,
    /// Region of the tracker; required.
    pub region: Option<String>,
    /// Verbosity handed to the tracker.
    pub log_level: LogLevel,
}

/// Controller for a data consumer account.
///
/// Holds the caller's IAM and STS gateways plus a tracker bound to a session
/// assumed into the mesh account. Nothing is shared between instances.
#[derive(Clone)]
pub struct ConsumerService {
    data_mesh_account_id: AccountId,
    region: String,
    session_name: String,
    identity: Arc<dyn IdentityGateway>,
    provisioning: IamProvisioningService,
    tracker: Arc<dyn SubscriptionTracker>,
}

impl ConsumerService {
    /// Returns the mesh account this controller subscribes through.
    #[must_use]
    pub fn data_mesh_account_id(&self) -> &AccountId {
        &self.data_mesh_account_id
    }

    /// Returns the region the tracker operates in.
    #[must_use]
    pub fn region(&self) -> &str {
        self.region.as_str()
    }

    /// Returns the session name used for the mesh assume-role call.
    #[must_use]
    pub fn session_name(&self) -> &str {
        self.session_name.as_str()
    }
}

mod access;
mod provisioning;
mod session;

#[cfg(test)]
mod tests;
