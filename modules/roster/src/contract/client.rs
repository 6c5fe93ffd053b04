use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::sync::watch;
use uuid::Uuid;

use crate::contract::{
    error::RosterError,
    model::{AdminData, NewStudent, Profile, Session, Student},
};

/// Identity provider as seen by one client: it tracks the client's own
/// current session and notifies listeners on every sign-in and sign-out.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account. The returned session is NOT published as the
    /// current auth state; the caller is expected to end it.
    async fn register(&self, email: &str, password: &str) -> Result<Session, RosterError>;

    /// Authenticate and publish the new session to auth-state listeners.
    async fn login(&self, email: &str, password: &str) -> Result<Session, RosterError>;

    /// End the current session (if any) and publish "signed out".
    async fn logout(&self) -> Result<(), RosterError>;

    /// End a specific session without touching the published auth state.
    async fn end_session(&self, session: &Session) -> Result<(), RosterError>;

    fn current_session(&self) -> Option<Session>;

    /// Receiver whose current value is the auth state at subscription time.
    fn watch_auth_state(&self) -> watch::Receiver<Option<Session>>;
}

/// Document database with user-scoped profiles and student collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_profile(&self, session: &Session, uid: Uuid)
        -> Result<Option<Profile>, RosterError>;

    async fn set_profile(
        &self,
        session: &Session,
        uid: Uuid,
        profile: Profile,
    ) -> Result<(), RosterError>;

    async fn add_student(
        &self,
        session: &Session,
        owner: Uuid,
        student: NewStudent,
    ) -> Result<Student, RosterError>;

    async fn delete_student(
        &self,
        session: &Session,
        owner: Uuid,
        id: Uuid,
    ) -> Result<(), RosterError>;

    /// Students of `owner`, newest first.
    async fn list_students(&self, session: &Session, owner: Uuid)
        -> Result<Vec<Student>, RosterError>;

    /// Live feed: the current ordered snapshot first, then a fresh full
    /// snapshot after every change to `owner`'s collection.
    async fn watch_students(
        &self,
        session: &Session,
        owner: Uuid,
    ) -> Result<BoxStream<'static, Result<Vec<Student>, RosterError>>, RosterError>;

    async fn add_admin_data(&self, session: &Session) -> Result<AdminData, RosterError>;

    async fn list_admin_data(&self, session: &Session) -> Result<Vec<AdminData>, RosterError>;
}
