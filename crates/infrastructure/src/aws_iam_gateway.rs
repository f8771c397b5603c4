use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_iam::Client;
use aws_sdk_iam::error::SdkError;
use aws_sdk_iam::operation::create_group::CreateGroupError;
use aws_sdk_iam::operation::create_policy::CreatePolicyError;
use aws_sdk_iam::operation::create_role::CreateRoleError;
use aws_sdk_iam::operation::create_user::CreateUserError;
use aws_sdk_iam::operation::get_role::GetRoleError;
use aws_sdk_iam::operation::get_user::GetUserError;
use aws_sdk_iam::types::Tag;
use datamesh_application::{
    CreateOutcome, IamGateway, NewGroup, NewPolicy, NewRole, NewUser, RoleRecord,
};
use datamesh_core::{AppError, AppResult};
use datamesh_domain::{AssumeRoleDocument, IamTag};
use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::aws_clients::AwsServiceClient;

/// IAM gateway backed by the AWS SDK.
#[derive(Clone)]
pub struct AwsIamGateway {
    client: Client,
}

impl std::fmt::Debug for AwsIamGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsIamGateway").finish_non_exhaustive()
    }
}

impl AwsIamGateway {
    /// Creates a gateway around a configured IAM client.
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
impl IamGateway for AwsIamGateway {
    async fn get_role(&self, role_name: &str) -> AppResult<Option<RoleRecord>> {
        let output = match self.client.get_role().role_name(role_name).send().await {
            Ok(output) => output,
            Err(SdkError::ServiceError(service))
                if matches!(service.err(), GetRoleError::NoSuchEntityException(_)) =>
            {
                return Ok(None);
            }
            Err(error) => return Err(AppError::upstream("iam:GetRole", error)),
        };

        let Some(role) = output.role() else {
            return Ok(None);
        };

        let assume_role_policy_document = role
            .assume_role_policy_document()
            .map(decode_policy_document)
            .transpose()?
            .unwrap_or_default();

        Ok(Some(RoleRecord {
            role_name: role.role_name().to_owned(),
            arn: role.arn().to_owned(),
            assume_role_policy_document,
        }))
    }

    async fn user_exists(&self, user_name: &str) -> AppResult<bool> {
        match self.client.get_user().user_name(user_name).send().await {
            Ok(output) => Ok(output.user().is_some()),
            Err(SdkError::ServiceError(service))
                if matches!(service.err(), GetUserError::NoSuchEntityException(_)) =>
            {
                Ok(false)
            }
            Err(error) => Err(AppError::upstream("iam:GetUser", error)),
        }
    }

    async fn create_policy(&self, policy: NewPolicy) -> AppResult<CreateOutcome> {
        let result = self
            .client
            .create_policy()
            .policy_name(policy.name.as_str())
            .path(policy.path)
            .policy_document(policy.document)
            .description(policy.description)
            .set_tags(Some(sdk_tags(&policy.tags)?))
            .send()
            .await;

        match result {
            Ok(output) => {
                let arn = output
                    .policy()
                    .and_then(|created| created.arn())
                    .ok_or_else(|| missing_arn("iam:CreatePolicy"))?;
                Ok(CreateOutcome::Created {
                    arn: arn.to_owned(),
                })
            }
            Err(SdkError::ServiceError(service))
                if matches!(
                    service.err(),
                    CreatePolicyError::EntityAlreadyExistsException(_)
                ) =>
            {
                debug!(policy_name = %policy.name, "policy already exists");
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(error) => Err(AppError::upstream("iam:CreatePolicy", error)),
        }
    }

    async fn create_user(&self, user: NewUser) -> AppResult<CreateOutcome> {
        let result = self
            .client
            .create_user()
            .user_name(user.name.as_str())
            .path(user.path)
            .set_tags(Some(sdk_tags(&user.tags)?))
            .send()
            .await;

        match result {
            Ok(output) => {
                let arn = output
                    .user()
                    .map(|created| created.arn())
                    .ok_or_else(|| missing_arn("iam:CreateUser"))?;
                Ok(CreateOutcome::Created {
                    arn: arn.to_owned(),
                })
            }
            Err(SdkError::ServiceError(service))
                if matches!(service.err(), CreateUserError::EntityAlreadyExistsException(_)) =>
            {
                debug!(user_name = %user.name, "user already exists");
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(error) => Err(AppError::upstream("iam:CreateUser", error)),
        }
    }

    async fn create_group(&self, group: NewGroup) -> AppResult<CreateOutcome> {
        let result = self
            .client
            .create_group()
            .group_name(group.name.as_str())
            .path(group.path)
            .send()
            .await;

        match result {
            Ok(output) => {
                let arn = output
                    .group()
                    .map(|created| created.arn())
                    .ok_or_else(|| missing_arn("iam:CreateGroup"))?;
                Ok(CreateOutcome::Created {
                    arn: arn.to_owned(),
                })
            }
            Err(SdkError::ServiceError(service))
                if matches!(
                    service.err(),
                    CreateGroupError::EntityAlreadyExistsException(_)
                ) =>
            {
                debug!(group_name = %group.name, "group already exists");
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(error) => Err(AppError::upstream("iam:CreateGroup", error)),
        }
    }

    async fn add_user_to_group(&self, group_name: &str, user_name: &str) -> AppResult<()> {
        self.client
            .add_user_to_group()
            .group_name(group_name)
            .user_name(user_name)
            .send()
            .await
            .map_err(|error| AppError::upstream("iam:AddUserToGroup", error))?;

        Ok(())
    }

    async fn create_role(&self, role: NewRole) -> AppResult<CreateOutcome> {
        let result = self
            .client
            .create_role()
            .role_name(role.name.as_str())
            .path(role.path)
            .assume_role_policy_document(role.assume_role_policy_document.to_json()?)
            .description(role.description)
            .set_tags(Some(sdk_tags(&role.tags)?))
            .send()
            .await;

        match result {
            Ok(output) => {
                let arn = output
                    .role()
                    .map(|created| created.arn())
                    .ok_or_else(|| missing_arn("iam:CreateRole"))?;
                Ok(CreateOutcome::Created {
                    arn: arn.to_owned(),
                })
            }
            Err(SdkError::ServiceError(service))
                if matches!(service.err(), CreateRoleError::EntityAlreadyExistsException(_)) =>
            {
                debug!(role_name = %role.name, "role already exists");
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(error) => Err(AppError::upstream("iam:CreateRole", error)),
        }
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> AppResult<()> {
        self.client
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|error| AppError::upstream("iam:AttachRolePolicy", error))?;

        Ok(())
    }

    async fn attach_group_policy(&self, group_name: &str, policy_arn: &str) -> AppResult<()> {
        self.client
            .attach_group_policy()
            .group_name(group_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|error| AppError::upstream("iam:AttachGroupPolicy", error))?;

        Ok(())
    }

    async fn update_assume_role_policy(
        &self,
        role_name: &str,
        document: &AssumeRoleDocument,
    ) -> AppResult<()> {
        self.client
            .update_assume_role_policy()
            .role_name(role_name)
            .policy_document(document.to_json()?)
            .send()
            .await
            .map_err(|error| AppError::upstream("iam:UpdateAssumeRolePolicy", error))?;

        Ok(())
    }
}

/// IAM returns policy documents URL-encoded.
fn decode_policy_document(document: &str) -> AppResult<String> {
    percent_decode_str(document)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|error| {
            AppError::Validation(format!("policy document is not valid UTF-8: {error}"))
        })
}

fn sdk_tags(tags: &[IamTag]) -> AppResult<Vec<Tag>> {
    tags.iter()
        .map(|tag| {
            Tag::builder()
                .key(tag.key.as_str())
                .value(tag.value.as_str())
                .build()
                .map_err(|error| AppError::Internal(format!("invalid IAM tag: {error}")))
        })
        .collect()
}

fn missing_arn(operation: &str) -> AppError {
    AppError::Internal(format!("{operation} response did not include an ARN"))
}

#[cfg(test)]
mod tests {
    use datamesh_domain::{IamTag, default_tags};

    use super::{decode_policy_document, sdk_tags};

    #[test]
    fn decodes_url_encoded_trust_document() {
        let encoded = "%7B%22Version%22%3A%222012-10-17%22%2C%22Statement%22%3A%5B%5D%7D";

        let decoded = decode_policy_document(encoded);

        assert!(matches!(
            decoded.as_deref(),
            Ok(r#"{"Version":"2012-10-17","Statement":[]}"#)
        ));
    }

    #[test]
    fn plain_documents_pass_through_unchanged() {
        let document = r#"{"Version":"2012-10-17"}"#;

        assert!(matches!(decode_policy_document(document).as_deref(), Ok(value) if value == document));
    }

    #[test]
    fn converts_tags_for_the_sdk() {
        let mut tags = default_tags();
        tags.push(IamTag::new("Owner", "analytics"));

        let converted = sdk_tags(&tags);

        let Ok(converted) = converted else {
            panic!("tags should convert");
        };
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].key(), "Group");
        assert_eq!(converted[0].value(), "AwsDataMesh");
        assert_eq!(converted[1].key(), "Owner");
    }
}
