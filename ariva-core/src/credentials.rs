//! Account credentials and where they come from.

use crate::config::SourceConfig;
use crate::provider::PriceError;
use std::fmt;

/// Username and password for the provider login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Supplies credentials at login time.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Result<Credentials, PriceError>;
}

/// Reads credentials from two environment variables when a login happens.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    username_var: String,
    password_var: String,
}

impl EnvCredentials {
    pub fn new(username_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        Self {
            username_var: username_var.into(),
            password_var: password_var.into(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(&config.username_var, &config.password_var)
    }
}

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Result<Credentials, PriceError> {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        match (read(&self.username_var), read(&self.password_var)) {
            (Some(username), Some(password)) => Ok(Credentials { username, password }),
            _ => Err(PriceError::Auth(format!(
                "environment variables {} and {} must be set",
                self.username_var, self.password_var
            ))),
        }
    }
}

/// Fixed credentials, e.g. from a host that manages secrets itself.
#[derive(Debug, Clone)]
pub struct StaticCredentials(Credentials);

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self(Credentials::new(username, password))
    }
}

impl CredentialSource for StaticCredentials {
    fn credentials(&self) -> Result<Credentials, PriceError> {
        if self.0.username.is_empty() || self.0.password.is_empty() {
            return Err(PriceError::Auth("username and password must not be empty".into()));
        }
        Ok(self.0.clone())
    }
}
