//! Server-side access rules for the document collections.

use uuid::Uuid;

use crate::contract::model::{Role, ROLE_ADMIN};

/// Authenticated caller with the role taken from their own profile
/// (no profile means plain user).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub uid: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    fn owns(&self, uid: Uuid) -> bool {
        self.uid == uid
    }
}

pub fn can_read_profile(caller: &Caller, uid: Uuid) -> bool {
    caller.owns(uid) || caller.is_admin()
}

/// Owner only; a non-admin cannot write the admin role.
pub fn can_write_profile(caller: &Caller, uid: Uuid, new_role: &str) -> bool {
    caller.owns(uid) && (new_role != ROLE_ADMIN || caller.is_admin())
}

pub fn can_read_roster(caller: &Caller, owner: Uuid) -> bool {
    caller.owns(owner) || caller.is_admin()
}

pub fn can_write_roster(caller: &Caller, owner: Uuid) -> bool {
    caller.owns(owner)
}

pub fn can_access_admin_data(caller: &Caller) -> bool {
    caller.is_admin()
}
