//! Session management configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Absolute session lifetime in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
    /// How often expired sessions are swept from the store, in minutes.
    #[serde(default = "default_cleanup_interval_minutes")]
    pub cleanup_interval_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_hours: default_ttl_hours(),
            cleanup_interval_minutes: default_cleanup_interval_minutes(),
        }
    }
}

fn default_cookie_name() -> String {
    "tracklink_session".to_string()
}

fn default_ttl_hours() -> i64 {
    24
}

fn default_cleanup_interval_minutes() -> u64 {
    15
}
