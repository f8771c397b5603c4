//! Shared primitives for all Rust crates in the data mesh consumer tooling.

#![forbid(unsafe_code)]

/// Explicit credential primitives shared across adapters.
pub mod credentials;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use credentials::{CredentialSource, SessionCredentials};

/// Result type used across data mesh crates.
pub type AppResult<T> = Result<T, AppError>;

/// Boxed error type carried by [`AppError::Upstream`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A validated 12-digit AWS account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Creates a validated account identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.len() != 12 || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(AppError::Validation(format!(
                "account id '{value}' must be exactly 12 digits"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for AccountId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl Display for AccountId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Verbosity requested for one controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Everything, including SDK request tracing.
    Trace,
    /// Diagnostic detail such as assumed sessions.
    Debug,
    /// Provisioning progress.
    #[default]
    Info,
    /// Recoverable anomalies only.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Returns the directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" | "critical" => Ok(Self::Error),
            _ => Err(AppError::Configuration(format!(
                "unknown log level '{value}'"
            ))),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Required settings are missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The operation was invoked in the wrong account or environment.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A bounded wait gave up before the expected state became visible.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The operation is declared but has no defined behaviour yet.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A remote API or I/O call failed; the original error is kept as the source.
    #[error("{operation} failed: {source}")]
    Upstream {
        /// Name of the failed remote operation.
        operation: String,
        /// Error reported by the underlying client.
        #[source]
        source: BoxError,
    },

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wraps an error raised by a remote client without altering it.
    pub fn upstream(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Upstream {
            operation: operation.into(),
            source: Box::new(source),
        }
    }
}
