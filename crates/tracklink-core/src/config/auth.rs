//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Password policy and admin bootstrap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Minimum accepted password length.
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
    /// Username of the admin created on first start when no users exist.
    #[serde(default)]
    pub bootstrap_admin_username: Option<String>,
    /// Password of the bootstrap admin.
    #[serde(default)]
    pub bootstrap_admin_password: Option<String>,
}

impl AuthConfig {
    /// Bootstrap credentials, present only when both halves are configured.
    pub fn bootstrap_credentials(&self) -> Option<(&str, &str)> {
        match (
            self.bootstrap_admin_username.as_deref(),
            self.bootstrap_admin_password.as_deref(),
        ) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_min_length: default_password_min_length(),
            bootstrap_admin_username: None,
            bootstrap_admin_password: None,
        }
    }
}

fn default_password_min_length() -> usize {
    8
}
