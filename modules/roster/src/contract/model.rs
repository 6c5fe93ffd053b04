use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Role attribute value that selects the admin panel.
pub const ROLE_ADMIN: &str = "admin";
/// Role attribute written at registration.
pub const ROLE_USER: &str = "user";

/// Fixed payload of every admin data record.
pub const ADMIN_DATA_MESSAGE: &str = "This is a secret message for admins!";

/// Effective role derived from a profile's `role` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Exactly `"admin"` is an admin; anything else is a plain user.
    pub fn from_attr(value: &str) -> Self {
        if value == ROLE_ADMIN {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Admin => ROLE_ADMIN,
        }
    }
}

/// Signed-in identity as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: Uuid,
    pub email: String,
}

/// Opaque bearer token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "SessionToken({prefix}…)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: AuthUser,
    pub token: SessionToken,
    pub expires_at: DateTime<Utc>,
}

/// Profile document stored at `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub email: String,
    pub role: String,
}

impl Profile {
    pub fn new_user(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: ROLE_USER.to_string(),
        }
    }

    pub fn role(&self) -> Role {
        Role::from_attr(&self.role)
    }
}

/// Student document stored at `users/{uid}/students/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub enrollment_date: String,
    pub created_at: DateTime<Utc>,
}

/// Data for a new student; `created_at` is assigned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub enrollment_date: String,
}

/// Record of the shared `admin_data` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminData {
    pub id: Uuid,
    pub message: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_admin_attr_is_admin() {
        assert_eq!(Role::from_attr("admin"), Role::Admin);
        assert_eq!(Role::from_attr("Admin"), Role::User);
        assert_eq!(Role::from_attr("user"), Role::User);
        assert_eq!(Role::from_attr(""), Role::User);
        assert_eq!(Profile::new_user("a@b.co").role(), Role::User);
    }

    #[test]
    fn token_debug_is_redacted() {
        let t = SessionToken::new("0123456789abcdef");
        let dbg = format!("{t:?}");
        assert!(dbg.contains("012345"));
        assert!(!dbg.contains("abcdef"));
    }
}
