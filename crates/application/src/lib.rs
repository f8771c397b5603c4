//! Application services and ports.

#![forbid(unsafe_code)]

mod consumer_service;
mod iam_ports;
mod iam_provisioning_service;
mod identity_ports;
mod subscription_ports;

#[cfg(test)]
mod test_support;

pub use consumer_service::{ConsumerService, ConsumerSettings};
pub use iam_ports::{
    CreateOutcome, IamGateway, NewGroup, NewPolicy, NewRole, NewUser, PolicyTemplateRenderer,
    RoleRecord, TemplateConfig,
};
pub use iam_provisioning_service::{
    IamBootstrapInput, IamProvisioningService, Provisioned, VisibilityPolicy,
};
pub use identity_ports::{CallerIdentity, IdentityGateway};
pub use subscription_ports::{SubscriptionTracker, SubscriptionTrackerFactory, TrackerSession};
