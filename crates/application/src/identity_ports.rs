use async_trait::async_trait;
use datamesh_core::{AccountId, AppResult, SessionCredentials};

/// Identity behind the credentials a gateway was built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Account the caller belongs to.
    pub account_id: AccountId,
    /// Caller ARN.
    pub arn: String,
    /// Unique caller id, e.g. `AIDA...` or `AROA...:session`.
    pub user_id: String,
}

/// Port for the security token service.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Describes the current caller.
    async fn caller_identity(&self) -> AppResult<CallerIdentity>;

    /// Assumes `role_arn` and returns the session's temporary credentials.
    async fn assume_role(&self, role_arn: &str, session_name: &str)
    -> AppResult<SessionCredentials>;
}
