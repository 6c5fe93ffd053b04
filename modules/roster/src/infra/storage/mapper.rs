use crate::contract::model::{AdminData, Profile, Student};
use crate::domain::model::{Account, SessionRecord};
use crate::infra::storage::entity::{accounts, admin_data, profiles, sessions, students};

impl From<accounts::Model> for Account {
    fn from(m: accounts::Model) -> Self {
        Self {
            uid: m.uid,
            email: m.email,
            password_hash: m.password_hash,
            created_at: m.created_at,
        }
    }
}

impl From<sessions::Model> for SessionRecord {
    fn from(m: sessions::Model) -> Self {
        Self {
            token_hash: m.token_hash,
            uid: m.uid,
            created_at: m.created_at,
            expires_at: m.expires_at,
        }
    }
}

impl From<profiles::Model> for Profile {
    fn from(m: profiles::Model) -> Self {
        Self {
            email: m.email,
            role: m.role,
        }
    }
}

impl From<students::Model> for Student {
    fn from(m: students::Model) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            enrollment_date: m.enrollment_date,
            created_at: m.created_at,
        }
    }
}

impl From<admin_data::Model> for AdminData {
    fn from(m: admin_data::Model) -> Self {
        Self {
            id: m.id,
            message: m.message,
            created_by: m.created_by,
            created_at: m.created_at,
        }
    }
}
