//! Request types for OAuth operations.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::errors::REDACTION_MARKER;

/// Resource-owner password grant: exchanges account credentials for a token.
#[derive(Clone)]
pub struct PasswordGrantRequest {
    /// Account username (the login email)
    pub username: String,
    /// Account password
    pub password: SecretString,
    /// Vendor extension: user prefix of the target backend
    pub user_prefix: String,
    /// Vendor extension: version string of the calling app
    pub app_version: String,
}

impl PasswordGrantRequest {
    /// Create a password grant request.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        user_prefix: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
            user_prefix: user_prefix.into(),
            app_version: app_version.into(),
        }
    }

    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for PasswordGrantRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordGrantRequest")
            .field("username", &self.username)
            .field("password", &REDACTION_MARKER)
            .field("user_prefix", &self.user_prefix)
            .field("app_version", &self.app_version)
            .finish()
    }
}
