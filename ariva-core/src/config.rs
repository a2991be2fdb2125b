//! Source configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) points at the
//! public ariva.de endpoints and reads credentials from `ARIVA_USERNAME` and
//! `ARIVA_PASSWORD`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Endpoints, transport settings and credential variable names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Scheme and host, without a trailing slash.
    pub base_url: String,
    pub login_path: String,
    pub export_path: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Environment variable holding the account username.
    pub username_var: String,
    /// Environment variable holding the account password.
    pub password_var: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ariva.de".into(),
            login_path: "/user/login/".into(),
            export_path: "/quote/historic/historic.csv".into(),
            timeout_secs: 30,
            user_agent: concat!("ariva-price/", env!("CARGO_PKG_VERSION")).into(),
            username_var: "ARIVA_USERNAME".into(),
            password_var: "ARIVA_PASSWORD".into(),
        }
    }
}

impl SourceConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn login_url(&self) -> String {
        self.join(&self.login_path)
    }

    pub fn export_url(&self) -> String {
        self.join(&self.export_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
