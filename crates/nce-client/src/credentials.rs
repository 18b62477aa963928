//! API credentials
//!
//! Username/password pair for the client-credentials grant. Immutable for
//! the process lifetime; the password sits behind `Secret` so it never
//! appears in Debug output or logs.

use common::Secret;

use crate::error::{Error, Result};

/// Environment variable holding the API username
pub const USERNAME_ENV: &str = "NCE_USERNAME";

/// Environment variable holding the API password
pub const PASSWORD_ENV: &str = "NCE_PASSWORD";

/// Credential pair used for HTTP Basic Authentication at the token endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    password: Secret<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password.into()),
        }
    }

    /// Read credentials from `NCE_USERNAME` / `NCE_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        let username = std::env::var(USERNAME_ENV)
            .map_err(|_| Error::Credentials(format!("{USERNAME_ENV} is not set")))?;
        let password = std::env::var(PASSWORD_ENV)
            .map_err(|_| Error::Credentials(format!("{PASSWORD_ENV} is not set")))?;
        Ok(Self::new(username, password))
    }

    /// Expose the password for the Basic Auth header (use sparingly)
    pub fn password(&self) -> &str {
        self.password.expose()
    }
}
