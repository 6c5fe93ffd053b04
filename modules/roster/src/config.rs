use serde::{Deserialize, Serialize};

/// Configuration for the roster module (`modules.roster`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct RosterConfig {
    pub min_password_length: usize,
    pub session_ttl_secs: u64,
    /// Capacity of the change-notification channel behind roster feeds.
    pub event_capacity: usize,
    /// Account that is given the admin role on start.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            session_ttl_secs: 7 * 24 * 60 * 60,
            event_capacity: 64,
            bootstrap_admin: None,
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}
