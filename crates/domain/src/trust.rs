//! Assume-role trust documents.
//!
//! The same single-statement shape serves two purposes: a role trust policy
//! listing principals, and an identity policy scoped to one role `Resource`.

use std::collections::BTreeMap;

use datamesh_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// IAM policy language version written into every document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// The only action a trust statement grants.
pub const ASSUME_ROLE_ACTION: &str = "sts:AssumeRole";

/// Principal type key for account, user and role ARNs.
pub const AWS_PRINCIPAL_TYPE: &str = "AWS";

const ALLOW_EFFECT: &str = "Allow";

/// A policy field that IAM accepts either as a scalar or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// Single value.
    One(String),
    /// Ordered list of values.
    Many(Vec<String>),
}

impl OneOrMany {
    /// Returns the values in document order.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::One(value) => vec![value.as_str()],
            Self::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Returns whether `candidate` is present.
    #[must_use]
    pub fn contains(&self, candidate: &str) -> bool {
        self.values().contains(&candidate)
    }

    /// Appends `value` unless present, promoting a scalar to a list.
    pub fn push_unique(&mut self, value: &str) -> bool {
        if self.contains(value) {
            return false;
        }

        match self {
            Self::One(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Many(vec![first, value.to_owned()]);
            }
            Self::Many(values) => values.push(value.to_owned()),
        }

        true
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

/// Principal types merged into a trust statement next to `AWS`, e.g. `Service`.
pub type AdditionalPrincipals = BTreeMap<String, OneOrMany>;

/// The `Principal` element of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Principal {
    /// Anonymous form such as `"*"`.
    Wildcard(String),
    /// Principals keyed by type (`AWS`, `Service`, ...).
    Typed(BTreeMap<String, OneOrMany>),
}

impl Principal {
    /// Returns the entries of one principal type, if this block is typed.
    #[must_use]
    pub fn of_type(&self, principal_type: &str) -> Option<&OneOrMany> {
        match self {
            Self::Wildcard(_) => None,
            Self::Typed(principals) => principals.get(principal_type),
        }
    }
}

/// Account a principal names when written as a bare account id or an
/// account root ARN; both spellings are the same principal to IAM.
fn principal_account(principal: &str) -> Option<&str> {
    if is_account_id(principal) {
        return Some(principal);
    }

    let mut parts = principal.strip_prefix("arn:")?.split(':');
    let _partition = parts.next()?;
    let service = parts.next()?;
    let region = parts.next()?;
    let account = parts.next()?;
    let resource = parts.next()?;

    (parts.next().is_none()
        && service == "iam"
        && region.is_empty()
        && resource == "root"
        && is_account_id(account))
    .then_some(account)
}

fn is_account_id(value: &str) -> bool {
    value.len() == 12 && value.bytes().all(|byte| byte.is_ascii_digit())
}

fn same_principal(left: &str, right: &str) -> bool {
    left == right
        || matches!(
            (principal_account(left), principal_account(right)),
            (Some(left), Some(right)) if left == right
        )
}

/// One statement of an assume-role document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrustStatement {
    effect: String,
    action: OneOrMany,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    principal: Option<Principal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource: Option<OneOrMany>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TrustStatement {
    /// Returns the statement effect.
    #[must_use]
    pub fn effect(&self) -> &str {
        self.effect.as_str()
    }

    /// Returns the granted action(s).
    #[must_use]
    pub fn action(&self) -> &OneOrMany {
        &self.action
    }

    /// Returns the principal block.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Returns the `Principal.AWS` entries in document order.
    #[must_use]
    pub fn aws_principals(&self) -> Vec<&str> {
        self.principal
            .as_ref()
            .and_then(|principal| principal.of_type(AWS_PRINCIPAL_TYPE))
            .map(OneOrMany::values)
            .unwrap_or_default()
    }

    /// Returns the resource scope, if the statement is resource-based.
    #[must_use]
    pub fn resource(&self) -> Option<&OneOrMany> {
        self.resource.as_ref()
    }
}

/// A policy document holding exactly one `sts:AssumeRole` allow statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssumeRoleDocument {
    version: String,
    statement: Vec<TrustStatement>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl AssumeRoleDocument {
    /// Parses a document as returned by IAM (already URL-decoded).
    pub fn from_json(document: &str) -> AppResult<Self> {
        let parsed: Self = serde_json::from_str(document).map_err(|error| {
            AppError::Validation(format!("invalid assume-role policy document: {error}"))
        })?;

        if parsed.statement.is_empty() {
            return Err(AppError::Validation(
                "assume-role policy document has no statements".to_owned(),
            ));
        }

        Ok(parsed)
    }

    /// Serializes the document for an IAM write call.
    pub fn to_json(&self) -> AppResult<String> {
        serde_json::to_string(self).map_err(|error| {
            AppError::Internal(format!("failed to serialize policy document: {error}"))
        })
    }

    /// Returns the policy language version.
    #[must_use]
    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Returns all statements.
    #[must_use]
    pub fn statements(&self) -> &[TrustStatement] {
        self.statement.as_slice()
    }

    /// Returns the `Principal.AWS` entries of the first statement.
    #[must_use]
    pub fn aws_principals(&self) -> Vec<&str> {
        self.statement
            .first()
            .map(TrustStatement::aws_principals)
            .unwrap_or_default()
    }

    /// Appends `principal` to the first statement's `Principal.AWS` list.
    ///
    /// Existing entries keep their order and nothing is appended twice. A
    /// bare account id and that account's root ARN count as the same entry.
    /// Returns whether the document changed.
    pub fn add_trusted_principal(&mut self, principal: &str) -> AppResult<bool> {
        let statement = self.statement.first_mut().ok_or_else(|| {
            AppError::Validation("assume-role policy document has no statements".to_owned())
        })?;

        let principals = match statement.principal.as_mut() {
            Some(Principal::Typed(principals)) => principals,
            Some(Principal::Wildcard(wildcard)) => {
                return Err(AppError::Validation(format!(
                    "trust statement principal '{wildcard}' has no principal block to extend"
                )));
            }
            None => {
                return Err(AppError::Validation(
                    "trust statement has no principal block to extend".to_owned(),
                ));
            }
        };

        match principals.get_mut(AWS_PRINCIPAL_TYPE) {
            Some(aws) => {
                if aws
                    .values()
                    .into_iter()
                    .any(|existing| same_principal(existing, principal))
                {
                    return Ok(false);
                }
                Ok(aws.push_unique(principal))
            }
            None => {
                principals.insert(
                    AWS_PRINCIPAL_TYPE.to_owned(),
                    OneOrMany::Many(vec![principal.to_owned()]),
                );
                Ok(true)
            }
        }
    }
}

/// Builds a single-statement document allowing `sts:AssumeRole`.
///
/// `principals` becomes `Principal.AWS`; `additional_principals` are merged
/// into the same principal block. `resource` scopes the statement to one role
/// instead, which is how identity policies granting the assume are written.
#[must_use]
pub fn create_assume_role_document(
    principals: Option<Vec<String>>,
    resource: Option<String>,
    additional_principals: Option<AdditionalPrincipals>,
) -> AssumeRoleDocument {
    let mut principal_block: Option<BTreeMap<String, OneOrMany>> = principals.map(|values| {
        BTreeMap::from([(AWS_PRINCIPAL_TYPE.to_owned(), OneOrMany::Many(values))])
    });

    if let Some(additional) = additional_principals {
        let block = principal_block.get_or_insert_with(BTreeMap::new);
        for (principal_type, value) in additional {
            block.insert(principal_type, value);
        }
    }

    AssumeRoleDocument {
        version: POLICY_VERSION.to_owned(),
        statement: vec![TrustStatement {
            effect: ALLOW_EFFECT.to_owned(),
            action: OneOrMany::from(ASSUME_ROLE_ACTION),
            principal: principal_block.map(Principal::Typed),
            resource: resource.map(OneOrMany::One),
            extra: Map::new(),
        }],
        extra: Map::new(),
    }
}
