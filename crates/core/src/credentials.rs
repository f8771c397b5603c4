use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Temporary or static access keys handed explicitly to an API client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl SessionCredentials {
    /// Creates credentials, rejecting empty key material.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> AppResult<Self> {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();

        if access_key_id.trim().is_empty() || secret_access_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "access key id and secret access key must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: session_token.filter(|token| !token.trim().is_empty()),
        })
    }

    /// Returns the access key identifier.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        self.access_key_id.as_str()
    }

    /// Returns the secret access key.
    #[must_use]
    pub fn secret_access_key(&self) -> &str {
        self.secret_access_key.as_str()
    }

    /// Returns the session token for temporary credentials.
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

impl Debug for SessionCredentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SessionCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}

/// Where the caller's own identity comes from. There is no ambient default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A named profile from the shared AWS config files.
    Profile(String),
    /// Keys supplied directly by the operator.
    Static(SessionCredentials),
}
