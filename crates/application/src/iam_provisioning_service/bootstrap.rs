use datamesh_core::{AppError, AppResult};
use datamesh_domain::{
    DATA_MESH_IAM_PATH, IamResourceType, account_root_arn, assume_role_policy_name,
    create_assume_role_document, default_tags, group_name, iam_arn,
};
use tracing::info;

use crate::{CreateOutcome, NewGroup, NewPolicy, NewRole, NewUser};

use super::{IamBootstrapInput, IamProvisioningService, Provisioned};

impl IamProvisioningService {
    /// Creates or reuses the policy, user, group and role for `role_name`
    /// and wires them together:
    ///
    /// - the rendered policy is attached to the role;
    /// - the role trusts its user and the account root;
    /// - the user sits in `{role_name}Group`;
    /// - the group holds `Assume{role_name}`, scoped to the role.
    ///
    /// Safe to re-run. Returns the role ARN.
    pub async fn configure_iam(&self, input: IamBootstrapInput) -> AppResult<Provisioned<String>> {
        let IamBootstrapInput {
            policy_name,
            policy_description,
            policy_template,
            role_name,
            role_description,
            account_id,
            template_config,
            additional_assuming_principals,
        } = input;

        let policy_document = self.generate_policy(policy_template.as_str(), &template_config)?;
        let policy_arn = self
            .ensure_policy(
                &account_id,
                NewPolicy {
                    name: policy_name,
                    path: DATA_MESH_IAM_PATH.to_owned(),
                    document: policy_document,
                    description: policy_description,
                    tags: default_tags(),
                },
            )
            .await?
            .into_inner();

        let user_outcome = self
            .iam
            .create_user(NewUser {
                name: role_name.clone(),
                path: DATA_MESH_IAM_PATH.to_owned(),
                tags: default_tags(),
            })
            .await?;
        if matches!(user_outcome, CreateOutcome::Created { .. }) {
            self.wait_until_user_visible(role_name.as_str()).await?;
        }
        let user_arn = iam_arn(&account_id, IamResourceType::User, role_name.as_str());

        let group = group_name(role_name.as_str());
        let group_outcome = self
            .iam
            .create_group(NewGroup {
                name: group.clone(),
                path: DATA_MESH_IAM_PATH.to_owned(),
            })
            .await?;
        self.iam
            .add_user_to_group(group.as_str(), role_name.as_str())
            .await?;

        info!(
            account_id = %account_id,
            user_arn = %user_arn,
            user_created = matches!(user_outcome, CreateOutcome::Created { .. }),
            group_name = %group,
            group_created = matches!(group_outcome, CreateOutcome::Created { .. }),
            "ensured IAM user and group"
        );

        let trust_document = create_assume_role_document(
            Some(vec![user_arn, account_root_arn(&account_id)]),
            None,
            additional_assuming_principals,
        );
        let role_arn = match self
            .iam
            .create_role(NewRole {
                name: role_name.clone(),
                path: DATA_MESH_IAM_PATH.to_owned(),
                assume_role_policy_document: trust_document,
                description: role_description,
                tags: default_tags(),
            })
            .await?
        {
            CreateOutcome::Created { arn } => Provisioned::Created(arn),
            CreateOutcome::AlreadyExists => {
                let existing = self.iam.get_role(role_name.as_str()).await?.ok_or_else(|| {
                    AppError::Conflict(format!(
                        "role '{role_name}' reported as existing but could not be read back"
                    ))
                })?;
                Provisioned::Existing(existing.arn)
            }
        };

        info!(
            account_id = %account_id,
            role_arn = %role_arn.value(),
            outcome = role_arn.outcome(),
            "ensured IAM role"
        );

        self.iam
            .attach_role_policy(role_name.as_str(), policy_arn.as_str())
            .await?;

        let assume_policy_arn = self
            .create_assume_role_policy(
                &account_id,
                assume_role_policy_name(role_name.as_str()).as_str(),
                role_arn.value().as_str(),
            )
            .await?
            .into_inner();

        self.attach_group_policy(group.as_str(), assume_policy_arn.as_str())
            .await?;

        Ok(role_arn)
    }
}
