use std::sync::Arc;
use std::time::Duration;

use datamesh_core::AccountId;
use datamesh_domain::AdditionalPrincipals;

use crate::{IamGateway, PolicyTemplateRenderer, TemplateConfig};

/// Whether a provisioning step created its object or found it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned<T> {
    /// Created by this call.
    Created(T),
    /// Already present before this call.
    Existing(T),
}

impl<T> Provisioned<T> {
    /// Returns the value regardless of outcome.
    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Self::Created(value) | Self::Existing(value) => value,
        }
    }

    /// Consumes the outcome and returns the value.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Created(value) | Self::Existing(value) => value,
        }
    }

    /// Returns true when this call created the object.
    #[must_use]
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// Returns a stable label for logs.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Existing(_) => "existing",
        }
    }
}

/// Bounded poll used after creating a user, before a role may trust it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityPolicy {
    /// Read attempts before giving up. At least one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled after each miss.
    pub initial_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl VisibilityPolicy {
    /// Creates a policy, clamping `max_attempts` to at least one.
    #[must_use]
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay: max_delay.max(initial_delay),
        }
    }

    /// Longest total time spent sleeping before the poll times out.
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        let mut total = Duration::ZERO;
        let mut delay = self.initial_delay;
        for _ in 1..self.max_attempts {
            total = total.saturating_add(delay);
            delay = delay.saturating_mul(2).min(self.max_delay);
        }
        total
    }
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self::new(10, Duration::from_millis(250), Duration::from_secs(2))
    }
}

/// Input for the end-to-end IAM bootstrap.
#[derive(Debug, Clone)]
pub struct IamBootstrapInput {
    /// Name of the managed policy rendered from `policy_template`.
    pub policy_name: String,
    /// Description of that policy.
    pub policy_description: String,
    /// Template file rendered into the policy document.
    pub policy_template: String,
    /// Name shared by the role and its user; the group is `{role_name}Group`.
    pub role_name: String,
    /// Description of the role.
    pub role_description: String,
    /// Account being provisioned.
    pub account_id: AccountId,
    /// Values substituted into the template.
    pub template_config: TemplateConfig,
    /// Extra principal types trusted by the role.
    pub additional_assuming_principals: Option<AdditionalPrincipals>,
}

/// Idempotent IAM provisioning routines.
#[derive(Clone)]
pub struct IamProvisioningService {
    iam: Arc<dyn IamGateway>,
    templates: Arc<dyn PolicyTemplateRenderer>,
    visibility: VisibilityPolicy,
}

impl IamProvisioningService {
    /// Creates a provisioning service with the default visibility poll.
    #[must_use]
    pub fn new(iam: Arc<dyn IamGateway>, templates: Arc<dyn PolicyTemplateRenderer>) -> Self {
        Self {
            iam,
            templates,
            visibility: VisibilityPolicy::default(),
        }
    }

    /// Replaces the poll used to wait for new users.
    #[must_use]
    pub fn with_visibility_policy(mut self, visibility: VisibilityPolicy) -> Self {
        self.visibility = visibility;
        self
    }
}

mod bootstrap;
mod policies;
mod trust;
mod visibility;
