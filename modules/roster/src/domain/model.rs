use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identity account as stored by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uid: Uuid,
    /// Trimmed, lower-cased; unique.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Server-side record of an issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Hex SHA-256 of the raw token.
    pub token_hash: String,
    pub uid: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
