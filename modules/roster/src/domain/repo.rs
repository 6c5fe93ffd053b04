use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{AdminData, Profile, Student};
use crate::domain::model::{Account, SessionRecord};

/// Port for identity storage (accounts and issued sessions).
#[async_trait]
pub trait AccountsRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>>;
    async fn find_by_uid(&self, uid: Uuid) -> anyhow::Result<Option<Account>>;
    /// Returns false, inserting nothing, if the email is already taken.
    async fn insert(&self, account: Account) -> anyhow::Result<bool>;

    async fn insert_session(&self, session: SessionRecord) -> anyhow::Result<()>;
    async fn find_session(&self, token_hash: &str) -> anyhow::Result<Option<SessionRecord>>;
    /// Returns true if a session was removed.
    async fn delete_session(&self, token_hash: &str) -> anyhow::Result<bool>;
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> anyhow::Result<u64>;
}

/// Port for the document collections.
#[async_trait]
pub trait DocumentsRepository: Send + Sync {
    async fn find_profile(&self, uid: Uuid) -> anyhow::Result<Option<Profile>>;
    /// Create or replace the profile document.
    async fn upsert_profile(&self, uid: Uuid, profile: Profile) -> anyhow::Result<()>;

    async fn insert_student(&self, owner: Uuid, student: Student) -> anyhow::Result<()>;
    /// Returns true if a document was removed.
    async fn delete_student(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
    /// Ordered by `created_at` descending, then `id` descending.
    async fn list_students(&self, owner: Uuid) -> anyhow::Result<Vec<Student>>;

    async fn insert_admin_data(&self, record: AdminData) -> anyhow::Result<()>;
    /// Newest first.
    async fn list_admin_data(&self) -> anyhow::Result<Vec<AdminData>>;
}
