//! Link lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived lifecycle state of a tracking link.
///
/// `Expired` and `LimitReached` are terminal until an explicit reset or a
/// refresh reactivates the link; a refresh never overrides them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// Serving downloads.
    Active,
    /// `expires_at` has passed.
    Expired,
    /// `current_downloads` reached `max_downloads`.
    LimitReached,
    /// Switched off by an administrator.
    Deactivated,
}

impl LinkStatus {
    /// Whether downloads are served in this state.
    pub fn is_servable(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::LimitReached => "limit_reached",
            Self::Deactivated => "deactivated",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
