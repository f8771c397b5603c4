use datamesh_core::{AccountId, AppResult};
use datamesh_domain::{
    DATA_MESH_IAM_PATH, IamResourceType, create_assume_role_document, default_tags, iam_arn,
};
use tracing::info;

use crate::{CreateOutcome, NewPolicy, TemplateConfig};

use super::{IamProvisioningService, Provisioned};

impl IamProvisioningService {
    /// Returns true iff `role_must_exist` exists in the current account.
    pub async fn validate_correct_account(&self, role_must_exist: &str) -> AppResult<bool> {
        Ok(self.iam.get_role(role_must_exist).await?.is_some())
    }

    /// Renders a policy template against `config`.
    pub fn generate_policy(&self, template_file: &str, config: &TemplateConfig) -> AppResult<String> {
        self.templates.render(template_file, config)
    }

    /// Creates a policy allowing `sts:AssumeRole` on exactly `role_arn`.
    pub async fn create_assume_role_policy(
        &self,
        account_id: &AccountId,
        policy_name: &str,
        role_arn: &str,
    ) -> AppResult<Provisioned<String>> {
        let document = create_assume_role_document(None, Some(role_arn.to_owned()), None);

        self.ensure_policy(
            account_id,
            NewPolicy {
                name: policy_name.to_owned(),
                path: DATA_MESH_IAM_PATH.to_owned(),
                document: document.to_json()?,
                description: format!(
                    "Policy allowing the grantee the ability to assume Role {role_arn}"
                ),
                tags: default_tags(),
            },
        )
        .await
    }

    /// Attaches a managed policy to a group. Re-attaching is a no-op in IAM.
    pub async fn attach_group_policy(&self, group_name: &str, policy_arn: &str) -> AppResult<()> {
        self.iam.attach_group_policy(group_name, policy_arn).await?;

        info!(
            group_name = %group_name,
            policy_arn = %policy_arn,
            "attached policy to group"
        );

        Ok(())
    }

    /// Creates a managed policy or resolves the ARN of the one already there.
    pub(super) async fn ensure_policy(
        &self,
        account_id: &AccountId,
        policy: NewPolicy,
    ) -> AppResult<Provisioned<String>> {
        let policy_name = policy.name.clone();
        let provisioned = match self.iam.create_policy(policy).await? {
            CreateOutcome::Created { arn } => Provisioned::Created(arn),
            CreateOutcome::AlreadyExists => Provisioned::Existing(iam_arn(
                account_id,
                IamResourceType::Policy,
                policy_name.as_str(),
            )),
        };

        info!(
            account_id = %account_id,
            policy_name = %policy_name,
            policy_arn = %provisioned.value(),
            outcome = provisioned.outcome(),
            "ensured IAM policy"
        );

        Ok(provisioned)
    }
}
