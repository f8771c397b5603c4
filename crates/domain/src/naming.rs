//! Fixed IAM naming conventions and deterministic ARN templates.
//!
//! These values must stay bit-exact: accounts provisioned by earlier runs are
//! located by name and path only, never by lookup.

use std::fmt::{Display, Formatter};

use datamesh_core::AccountId;
use serde::{Deserialize, Serialize};

/// Path prefix every IAM object created by the tooling lives under.
pub const DATA_MESH_IAM_PATH: &str = "/AwsDataMesh/";

/// Role end users in a consumer account assume.
pub const DATA_MESH_CONSUMER_ROLENAME: &str = "DataMeshConsumer";

/// Administrative consumer role; exists in both the mesh and consumer accounts.
pub const DATA_MESH_ADMIN_CONSUMER_ROLENAME: &str = "DataMeshAdminConsumer";

/// Managed policy attached to the consumer role.
pub const CONSUMER_POLICY_NAME: &str = "DataMeshConsumerAccess";

/// Template rendered into [`CONSUMER_POLICY_NAME`].
pub const CONSUMER_POLICY_TEMPLATE: &str = "consumer_policy.pystache";

const GROUP_SUFFIX: &str = "Group";
const ASSUME_POLICY_PREFIX: &str = "Assume";

/// IAM resource families addressed by the ARN template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IamResourceType {
    /// Managed policy.
    Policy,
    /// IAM user.
    User,
    /// IAM group.
    Group,
    /// IAM role.
    Role,
}

impl IamResourceType {
    /// Returns the resource-type segment used inside ARNs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::User => "user",
            Self::Group => "group",
            Self::Role => "role",
        }
    }
}

impl Display for IamResourceType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Builds `arn:aws:iam::{account}:{type}{path}{name}` under [`DATA_MESH_IAM_PATH`].
#[must_use]
pub fn iam_arn(account_id: &AccountId, resource_type: IamResourceType, name: &str) -> String {
    format!(
        "arn:aws:iam::{account_id}:{}{DATA_MESH_IAM_PATH}{name}",
        resource_type.as_str()
    )
}

/// ARN of the account root principal.
#[must_use]
pub fn account_root_arn(account_id: &AccountId) -> String {
    format!("arn:aws:iam::{account_id}:root")
}

/// Group holding the user that may assume `role_name`.
#[must_use]
pub fn group_name(role_name: &str) -> String {
    format!("{role_name}{GROUP_SUFFIX}")
}

/// Companion policy granting `sts:AssumeRole` on `role_name`.
#[must_use]
pub fn assume_role_policy_name(role_name: &str) -> String {
    format!("{ASSUME_POLICY_PREFIX}{role_name}")
}

/// Administrative consumer role in the central mesh account.
#[must_use]
pub fn data_mesh_admin_consumer_role_arn(mesh_account_id: &AccountId) -> String {
    iam_arn(
        mesh_account_id,
        IamResourceType::Role,
        DATA_MESH_ADMIN_CONSUMER_ROLENAME,
    )
}

/// Key/value tag attached to created IAM objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamTag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl IamTag {
    /// Creates a tag.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Tags applied to every policy, user and role the tooling creates.
#[must_use]
pub fn default_tags() -> Vec<IamTag> {
    vec![IamTag::new("Group", "AwsDataMesh")]
}
