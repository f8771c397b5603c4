use datamesh_core::{AccountId, AppError, AppResult};
use datamesh_domain::AssumeRoleDocument;
use tracing::{debug, info};

use super::IamProvisioningService;

impl IamProvisioningService {
    /// Adds `account_id` to the trusted principals of `role_name`.
    ///
    /// Read-modify-write without a concurrency guard: concurrent calls for
    /// the same role can lose an update, so callers must serialise them.
    /// Returns whether the trust policy was rewritten.
    pub async fn add_trust_to_role(
        &self,
        account_id: &AccountId,
        role_name: &str,
    ) -> AppResult<bool> {
        let role = self
            .iam
            .get_role(role_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' does not exist")))?;

        let mut document =
            AssumeRoleDocument::from_json(role.assume_role_policy_document.as_str())?;

        if !document.add_trusted_principal(account_id.as_str())? {
            debug!(
                account_id = %account_id,
                role_name = %role_name,
                "account already trusted by role"
            );
            return Ok(false);
        }

        self.iam
            .update_assume_role_policy(role_name, &document)
            .await?;

        info!(
            account_id = %account_id,
            role_name = %role_name,
            "added account to role trust policy"
        );

        Ok(true)
    }
}
