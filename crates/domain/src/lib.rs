//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod naming;
mod subscription;
mod trust;

pub use naming::{
    CONSUMER_POLICY_NAME, CONSUMER_POLICY_TEMPLATE, DATA_MESH_ADMIN_CONSUMER_ROLENAME,
    DATA_MESH_CONSUMER_ROLENAME, DATA_MESH_IAM_PATH, IamResourceType, IamTag, account_root_arn,
    assume_role_policy_name, data_mesh_admin_consumer_role_arn, default_tags, group_name, iam_arn,
};
pub use subscription::{SubscriptionRecord, SubscriptionRequest, SubscriptionStatus};
pub use trust::{
    ASSUME_ROLE_ACTION, AWS_PRINCIPAL_TYPE, AdditionalPrincipals, AssumeRoleDocument, OneOrMany,
    POLICY_VERSION, Principal, TrustStatement, create_assume_role_document,
};
