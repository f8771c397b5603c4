use std::str::FromStr;

use chrono::{DateTime, Utc};
use datamesh_core::AppError;
use serde::{Deserialize, Serialize};

/// A consumer's request for grants on a data product owned by another account.
///
/// Fields are passed through to the tracker as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Account that owns the data product.
    pub owner_account_id: String,
    /// Catalog database holding the product.
    pub database_name: String,
    /// Tables within the database; `None` requests the whole database.
    pub tables: Option<Vec<String>>,
    /// Principal the grants are for; `None` means the requesting consumer role.
    pub principal: Option<String>,
    /// Requested permissions, e.g. `SELECT` or `DESCRIBE`.
    pub requested_grants: Vec<String>,
}

/// Approval state of a subscription, owned by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Awaiting a decision by the product owner.
    Pending,
    /// Grants were approved.
    Approved,
    /// Grants were denied.
    Denied,
}

impl SubscriptionStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            _ => Err(AppError::Validation(format!(
                "unknown subscription status '{value}'"
            ))),
        }
    }
}

/// Tracked state of one subscription request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    subscription_id: String,
    #[serde(flatten)]
    request: SubscriptionRequest,
    status: SubscriptionStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// Creates a freshly submitted, pending record.
    #[must_use]
    pub fn pending(
        subscription_id: impl Into<String>,
        request: SubscriptionRequest,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            request,
            status: SubscriptionStatus::Pending,
            created_at: submitted_at,
            updated_at: submitted_at,
        }
    }

    /// Rebuilds a record loaded from the tracker's store.
    #[must_use]
    pub fn from_stored(
        subscription_id: impl Into<String>,
        request: SubscriptionRequest,
        status: SubscriptionStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            request,
            status,
            created_at,
            updated_at,
        }
    }

    /// Returns the opaque identifier issued by the tracker.
    #[must_use]
    pub fn subscription_id(&self) -> &str {
        self.subscription_id.as_str()
    }

    /// Returns the original request.
    #[must_use]
    pub fn request(&self) -> &SubscriptionRequest {
        &self.request
    }

    /// Returns the owning account of the requested product.
    #[must_use]
    pub fn owner_account_id(&self) -> &str {
        self.request.owner_account_id.as_str()
    }

    /// Returns the requested database.
    #[must_use]
    pub fn database_name(&self) -> &str {
        self.request.database_name.as_str()
    }

    /// Returns the current approval state.
    #[must_use]
    pub fn status(&self) -> SubscriptionStatus {
        self.status
    }

    /// Returns when the request was submitted.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the status last changed.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
