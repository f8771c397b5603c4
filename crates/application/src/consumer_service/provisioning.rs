use datamesh_core::{AppError, AppResult};
use datamesh_domain::{
    CONSUMER_POLICY_NAME, CONSUMER_POLICY_TEMPLATE, DATA_MESH_ADMIN_CONSUMER_ROLENAME,
    DATA_MESH_CONSUMER_ROLENAME, assume_role_policy_name, data_mesh_admin_consumer_role_arn,
    group_name,
};
use tracing::info;

use crate::{IamBootstrapInput, Provisioned, TemplateConfig};

use super::ConsumerService;

impl ConsumerService {
    /// Sets up the caller's account as a data consumer.
    ///
    /// Creates the `DataMeshConsumer` role, user and group, then lets that
    /// group assume the mesh admin-consumer role. Must run in an account that
    /// already holds `DataMeshAdminConsumer`. Returns the consumer role ARN.
    pub async fn initialize_consumer_account(&self) -> AppResult<Provisioned<String>> {
        if !self
            .provisioning
            .validate_correct_account(DATA_MESH_ADMIN_CONSUMER_ROLENAME)
            .await?
        {
            return Err(AppError::Precondition(format!(
                "function should be run in the data consumer account; role '{DATA_MESH_ADMIN_CONSUMER_ROLENAME}' not found"
            )));
        }

        let consumer_account_id = self.identity.caller_identity().await?.account_id;
        info!(
            account_id = %consumer_account_id,
            data_mesh_account_id = %self.data_mesh_account_id,
            "setting up account as data consumer"
        );

        let template_config = TemplateConfig::from([
            (
                "data_mesh_account_id".to_owned(),
                self.data_mesh_account_id.to_string(),
            ),
            (
                "consumer_account_id".to_owned(),
                consumer_account_id.to_string(),
            ),
        ]);

        let consumer_role = self
            .provisioning
            .configure_iam(IamBootstrapInput {
                policy_name: CONSUMER_POLICY_NAME.to_owned(),
                policy_description:
                    "IAM Policy enabling Accounts to Assume the DataMeshAdminConsumer Role"
                        .to_owned(),
                policy_template: CONSUMER_POLICY_TEMPLATE.to_owned(),
                role_name: DATA_MESH_CONSUMER_ROLENAME.to_owned(),
                role_description:
                    "Role to be used to update S3 Bucket Policies for access by the Data Mesh Account"
                        .to_owned(),
                account_id: consumer_account_id.clone(),
                template_config,
                additional_assuming_principals: None,
            })
            .await?;

        let mesh_role_arn = data_mesh_admin_consumer_role_arn(&self.data_mesh_account_id);
        let assume_policy_arn = self
            .provisioning
            .create_assume_role_policy(
                &consumer_account_id,
                assume_role_policy_name(DATA_MESH_ADMIN_CONSUMER_ROLENAME).as_str(),
                mesh_role_arn.as_str(),
            )
            .await?
            .into_inner();

        let group = group_name(DATA_MESH_CONSUMER_ROLENAME);
        self.provisioning
            .attach_group_policy(group.as_str(), assume_policy_arn.as_str())
            .await?;

        info!(
            account_id = %consumer_account_id,
            group_name = %group,
            policy_arn = %assume_policy_arn,
            role_arn = %consumer_role.value(),
            outcome = consumer_role.outcome(),
            "consumer account ready"
        );

        Ok(consumer_role)
    }
}
