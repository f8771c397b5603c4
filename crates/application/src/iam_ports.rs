use std::collections::BTreeMap;

use async_trait::async_trait;
use datamesh_core::AppResult;
use datamesh_domain::{AssumeRoleDocument, IamTag};

/// Result of a create call against IAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The object was created and IAM reported its ARN.
    Created {
        /// ARN returned by the create call.
        arn: String,
    },
    /// An object with the same name already existed; nothing was changed.
    AlreadyExists,
}

/// Role as read back from IAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecord {
    /// Role name without path.
    pub role_name: String,
    /// Full role ARN.
    pub arn: String,
    /// Trust policy JSON, already URL-decoded.
    pub assume_role_policy_document: String,
}

/// Managed policy to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPolicy {
    /// Policy name.
    pub name: String,
    /// IAM path, e.g. `/AwsDataMesh/`.
    pub path: String,
    /// Policy JSON.
    pub document: String,
    /// Human readable description.
    pub description: String,
    /// Tags to apply.
    pub tags: Vec<IamTag>,
}

/// IAM user to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// User name.
    pub name: String,
    /// IAM path.
    pub path: String,
    /// Tags to apply.
    pub tags: Vec<IamTag>,
}

/// IAM group to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    /// Group name.
    pub name: String,
    /// IAM path.
    pub path: String,
}

/// IAM role to create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRole {
    /// Role name.
    pub name: String,
    /// IAM path.
    pub path: String,
    /// Initial trust policy.
    pub assume_role_policy_document: AssumeRoleDocument,
    /// Human readable description.
    pub description: String,
    /// Tags to apply.
    pub tags: Vec<IamTag>,
}

/// Port for the IAM verbs the provisioning routines use.
///
/// Implementations translate "entity already exists" into
/// [`CreateOutcome::AlreadyExists`] and "no such entity" into `None`/`false`.
/// Every other failure surfaces as an error.
#[async_trait]
pub trait IamGateway: Send + Sync {
    /// Reads a role by name.
    async fn get_role(&self, role_name: &str) -> AppResult<Option<RoleRecord>>;

    /// Returns whether a user is visible to read calls.
    async fn user_exists(&self, user_name: &str) -> AppResult<bool>;

    /// Creates a managed policy.
    async fn create_policy(&self, policy: NewPolicy) -> AppResult<CreateOutcome>;

    /// Creates a user.
    async fn create_user(&self, user: NewUser) -> AppResult<CreateOutcome>;

    /// Creates a group.
    async fn create_group(&self, group: NewGroup) -> AppResult<CreateOutcome>;

    /// Adds a user to a group. Repeating the call is harmless.
    async fn add_user_to_group(&self, group_name: &str, user_name: &str) -> AppResult<()>;

    /// Creates a role.
    async fn create_role(&self, role: NewRole) -> AppResult<CreateOutcome>;

    /// Attaches a managed policy to a role.
    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> AppResult<()>;

    /// Attaches a managed policy to a group.
    async fn attach_group_policy(&self, group_name: &str, policy_arn: &str) -> AppResult<()>;

    /// Replaces a role's trust policy.
    async fn update_assume_role_policy(
        &self,
        role_name: &str,
        document: &AssumeRoleDocument,
    ) -> AppResult<()>;
}

/// Values substituted into a policy template.
pub type TemplateConfig = BTreeMap<String, String>;

/// Port rendering named policy templates.
pub trait PolicyTemplateRenderer: Send + Sync {
    /// Renders `template_file` against `config`. A missing template is
    /// reported as `AppError::NotFound`.
    fn render(&self, template_file: &str, config: &TemplateConfig) -> AppResult<String>;
}
