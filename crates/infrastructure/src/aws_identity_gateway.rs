use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sts::Client;
use datamesh_application::{CallerIdentity, IdentityGateway};
use datamesh_core::{AccountId, AppError, AppResult, SessionCredentials};

use crate::aws_clients::AwsServiceClient;

/// STS-backed identity gateway.
#[derive(Clone)]
pub struct AwsIdentityGateway {
    client: Client,
}

impl std::fmt::Debug for AwsIdentityGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsIdentityGateway").finish_non_exhaustive()
    }
}

impl AwsIdentityGateway {
    /// Creates a gateway around a configured STS client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a gateway from loaded SDK configuration.
    #[must_use]
    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(Client::from_sdk_config(config))
    }
}

#[async_trait]
impl IdentityGateway for AwsIdentityGateway {
    async fn caller_identity(&self) -> AppResult<CallerIdentity> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|error| AppError::upstream("sts:GetCallerIdentity", error))?;

        let account = output.account().ok_or_else(|| {
            AppError::Internal("sts:GetCallerIdentity response is missing Account".to_owned())
        })?;

        Ok(CallerIdentity {
            account_id: AccountId::new(account)?,
            arn: output.arn().unwrap_or_default().to_owned(),
            user_id: output.user_id().unwrap_or_default().to_owned(),
        })
    }

    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> AppResult<SessionCredentials> {
        let output = self
            .client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .map_err(|error| AppError::upstream("sts:AssumeRole", error))?;

        let credentials = output.credentials().ok_or_else(|| {
            AppError::Internal(format!(
                "sts:AssumeRole for '{role_arn}' returned no credentials"
            ))
        })?;

        SessionCredentials::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
            Some(credentials.session_token().to_owned()),
        )
    }
}
