use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::watch;
use tracing::warn;
use uuid::Uuid;

use crate::contract::{
    client::{DocumentStore, IdentityProvider},
    error::RosterError,
    model::{AdminData, NewStudent, Profile, Session, Student},
};
use crate::domain::documents::DocumentService;
use crate::domain::identity::IdentityService;

/// In-process identity client. Each instance tracks its own signed-in
/// session, like one browser tab.
pub struct LocalIdentityProvider {
    service: Arc<IdentityService>,
    state: watch::Sender<Option<Session>>,
}

impl LocalIdentityProvider {
    pub fn new(service: Arc<IdentityService>) -> Self {
        let (state, _rx) = watch::channel(None);
        Self { service, state }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn register(&self, email: &str, password: &str) -> Result<Session, RosterError> {
        self.service
            .register(email, password)
            .await
            .map_err(Into::into)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, RosterError> {
        let session = self.service.login(email, password).await?;
        self.state.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn logout(&self) -> Result<(), RosterError> {
        // Signed out locally even if the server call fails.
        let Some(previous) = self.state.send_replace(None) else {
            return Ok(());
        };
        self.service
            .logout(previous.token.expose())
            .await
            .map_err(|e| {
                warn!(error = %e, "server-side logout failed");
                e.into()
            })
    }

    async fn end_session(&self, session: &Session) -> Result<(), RosterError> {
        self.service
            .logout(session.token.expose())
            .await
            .map_err(Into::into)
    }

    fn current_session(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    fn watch_auth_state(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }
}

/// In-process document store client delegating to the domain service.
pub struct LocalDocumentStore {
    service: Arc<DocumentService>,
}

impl LocalDocumentStore {
    pub fn new(service: Arc<DocumentService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn get_profile(&self, session: &Session, uid: Uuid) -> Result<Option<Profile>, RosterError> {
        self.service
            .get_profile(session.token.expose(), uid)
            .await
            .map_err(Into::into)
    }

    async fn set_profile(
        &self,
        session: &Session,
        uid: Uuid,
        profile: Profile,
    ) -> Result<(), RosterError> {
        self.service
            .set_profile(session.token.expose(), uid, profile)
            .await
            .map_err(Into::into)
    }

    async fn add_student(
        &self,
        session: &Session,
        owner: Uuid,
        student: NewStudent,
    ) -> Result<Student, RosterError> {
        self.service
            .add_student(session.token.expose(), owner, student)
            .await
            .map_err(Into::into)
    }

    async fn delete_student(
        &self,
        session: &Session,
        owner: Uuid,
        id: Uuid,
    ) -> Result<(), RosterError> {
        self.service
            .delete_student(session.token.expose(), owner, id)
            .await
            .map_err(Into::into)
    }

    async fn list_students(&self, session: &Session, owner: Uuid) -> Result<Vec<Student>, RosterError> {
        self.service
            .list_students(session.token.expose(), owner)
            .await
            .map_err(Into::into)
    }

    async fn watch_students(
        &self,
        session: &Session,
        owner: Uuid,
    ) -> Result<BoxStream<'static, Result<Vec<Student>, RosterError>>, RosterError> {
        let feed = self
            .service
            .watch_students(session.token.expose(), owner)
            .await?;
        Ok(feed.map(|snapshot| snapshot.map_err(RosterError::from)).boxed())
    }

    async fn add_admin_data(&self, session: &Session) -> Result<AdminData, RosterError> {
        self.service
            .add_admin_data(session.token.expose())
            .await
            .map_err(Into::into)
    }

    async fn list_admin_data(&self, session: &Session) -> Result<Vec<AdminData>, RosterError> {
        self.service
            .list_admin_data(session.token.expose())
            .await
            .map_err(Into::into)
    }
}
