//! Client application: the two-panel roster front-end as an explicit store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::client::dialogs::Dialogs;
use crate::client::router::{self, ProfileLookup, RouteDecision};
use crate::client::subscription::Subscription;
use crate::client::view::{render_students, AddStudentForm, AuthForm, ViewState};
use crate::contract::client::{DocumentStore, IdentityProvider};
use crate::contract::error::RosterError;
use crate::contract::model::{NewStudent, Profile, Session};

pub const REGISTRATION_OK: &str = "Registration successful! Please log in.";
pub const CONFIRM_DELETE: &str = "Are you sure you want to delete this student?";
pub const EDIT_NOT_IMPLEMENTED: &str = "Edit functionality not yet implemented.";
pub const ADMIN_DATA_OK: &str = "Admin data added successfully!";

pub struct RosterApp {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    dialogs: Arc<dyn Dialogs>,
    view: Arc<watch::Sender<ViewState>>,
    // Bumped whenever the current feed is replaced or disposed; a feed task
    // only renders while its own generation is current.
    feed_generation: Arc<AtomicU64>,
    feed: Mutex<Option<Subscription>>,
    auth_listener: Mutex<Option<Subscription>>,
}

impl RosterApp {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        dialogs: Arc<dyn Dialogs>,
    ) -> Arc<Self> {
        let (view, _rx) = watch::channel(ViewState::default());
        Arc::new(Self {
            identity,
            store,
            dialogs,
            view: Arc::new(view),
            feed_generation: Arc::new(AtomicU64::new(0)),
            feed: Mutex::new(None),
            auth_listener: Mutex::new(None),
        })
    }

    /// Start listening to auth-state changes. The current state is routed
    /// immediately, then every sign-in and sign-out.
    pub fn start(self: &Arc<Self>) {
        let mut auth = self.identity.watch_auth_state();
        let app: Weak<Self> = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            loop {
                let session = auth.borrow_and_update().clone();
                let Some(app) = app.upgrade() else { break };
                app.on_auth_state_changed(session).await;
                drop(app);
                if auth.changed().await.is_err() {
                    break;
                }
            }
        });
        *self.auth_listener.lock() = Some(Subscription::new(handle));
    }

    pub fn view(&self) -> ViewState {
        self.view.borrow().clone()
    }

    pub fn watch_view(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    pub fn has_active_feed(&self) -> bool {
        self.feed.lock().as_ref().is_some_and(Subscription::is_active)
    }

    pub fn show_login_form(&self) {
        self.view.send_modify(|v| v.auth_form = AuthForm::Login);
    }

    pub fn show_register_form(&self) {
        self.view.send_modify(|v| v.auth_form = AuthForm::Register);
    }

    pub async fn on_auth_state_changed(&self, session: Option<Session>) {
        let Some(session) = session else {
            debug!("signed out");
            self.dispose_feed();
            self.view
                .send_modify(|v| router::apply(v, &RouteDecision::SignedOut));
            return;
        };

        let lookup = match self.store.get_profile(&session, session.user.uid).await {
            Ok(Some(profile)) => ProfileLookup::Found(profile),
            Ok(None) => ProfileLookup::Missing,
            Err(e) => ProfileLookup::Failed(e.to_string()),
        };
        let decision = router::route(Some((&session.user, lookup)));

        match &decision {
            RouteDecision::ForceSignOut { reason } => {
                error!(uid = %session.user.uid, reason = %reason, "profile unavailable, signing out");
                self.dispose_feed();
                self.view.send_modify(|v| router::apply(v, &decision));
                if let Err(e) = self.identity.logout().await {
                    warn!(error = %e, "forced sign-out failed");
                }
            }
            RouteDecision::Dashboard {
                uid, start_feed, ..
            } => {
                info!(uid = %uid, "signed in");
                self.view.send_modify(|v| router::apply(v, &decision));
                if *start_feed {
                    self.start_feed(&session).await;
                } else {
                    self.dispose_feed();
                }
            }
            RouteDecision::SignedOut => {
                self.dispose_feed();
                self.view.send_modify(|v| router::apply(v, &decision));
            }
        }
    }

    pub async fn register(&self, email: &str, password: &str) {
        let session = match self.identity.register(email, password).await {
            Ok(session) => session,
            Err(e) => {
                self.dialogs.alert(&e.to_string());
                return;
            }
        };

        let written = self
            .store
            .set_profile(
                &session,
                session.user.uid,
                Profile::new_user(session.user.email.clone()),
            )
            .await;
        if let Err(e) = self.identity.end_session(&session).await {
            warn!(error = %e, "failed to end registration session");
        }

        match written {
            Ok(()) => {
                self.dialogs.alert(REGISTRATION_OK);
                self.show_login_form();
            }
            Err(e) => {
                error!(uid = %session.user.uid, error = %e, "account created without profile");
                self.dialogs.alert(&e.to_string());
            }
        }
    }

    /// Post-login transitions are driven by the auth listener.
    pub async fn login(&self, email: &str, password: &str) {
        if let Err(e) = self.identity.login(email, password).await {
            self.dialogs.alert(&e.to_string());
        }
    }

    pub async fn logout(&self) {
        if let Err(e) = self.identity.logout().await {
            warn!(error = %e, "logout failed");
        }
    }

    pub fn update_add_form(&self, form: AddStudentForm) {
        self.view.send_modify(|v| v.add_form = form);
    }

    /// Submit the add form; it is cleared on success.
    pub async fn submit_add_form(&self) {
        let form = self.view.borrow().add_form.clone();
        self.add_student(&form.first_name, &form.last_name, &form.enrollment_date)
            .await;
    }

    pub async fn add_student(&self, first_name: &str, last_name: &str, enrollment_date: &str) {
        let Some(session) = self.identity.current_session() else {
            return;
        };
        let new_student = NewStudent {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            enrollment_date: enrollment_date.to_string(),
        };
        match self
            .store
            .add_student(&session, session.user.uid, new_student)
            .await
        {
            Ok(student) => {
                debug!(id = %student.id, "student added");
                self.view.send_modify(|v| v.add_form = AddStudentForm::default());
            }
            Err(e) => self.dialogs.alert(&format!("Error adding student: {e}")),
        }
    }

    pub async fn delete_student(&self, id: Uuid) {
        let Some(session) = self.identity.current_session() else {
            return;
        };
        if !self.dialogs.confirm(CONFIRM_DELETE) {
            return;
        }
        if let Err(e) = self
            .store
            .delete_student(&session, session.user.uid, id)
            .await
        {
            self.dialogs.alert(&format!("Error removing student: {e}"));
        }
    }

    pub fn edit_student(&self, id: Uuid) {
        debug!(id = %id, "edit requested");
        self.dialogs.alert(EDIT_NOT_IMPLEMENTED);
    }

    /// No client-side role check; the server decides.
    pub async fn add_admin_data(&self) {
        let result = match self.identity.current_session() {
            Some(session) => self.store.add_admin_data(&session).await.map(|_| ()),
            None => Err(RosterError::Unauthenticated),
        };
        match result {
            Ok(()) => self.dialogs.alert(ADMIN_DATA_OK),
            Err(e) => self
                .dialogs
                .alert(&format!("Error adding admin data: {e}")),
        }
    }

    async fn start_feed(&self, session: &Session) {
        let generation = self.feed_generation.fetch_add(1, Ordering::SeqCst) + 1;
        // Stop the previous feed before the new one can render.
        drop(self.feed.lock().take());

        let mut feed = match self
            .store
            .watch_students(session, session.user.uid)
            .await
        {
            Ok(feed) => feed,
            Err(e) => {
                error!(error = %e, "could not open roster feed");
                return;
            }
        };

        let view = self.view.clone();
        let current = self.feed_generation.clone();
        let handle = tokio::spawn(async move {
            while let Some(snapshot) = feed.next().await {
                match snapshot {
                    Ok(students) => {
                        let rows = render_students(&students);
                        view.send_if_modified(|v| {
                            if current.load(Ordering::SeqCst) != generation {
                                return false;
                            }
                            v.students = rows;
                            true
                        });
                    }
                    Err(e) => error!(error = %e, "roster snapshot failed"),
                }
            }
            debug!("roster feed ended");
        });

        let mut slot = self.feed.lock();
        if self.feed_generation.load(Ordering::SeqCst) == generation {
            *slot = Some(Subscription::new(handle));
        } else {
            // Disposed or replaced while the feed was opening.
            handle.abort();
        }
    }

    fn dispose_feed(&self) {
        self.feed_generation.fetch_add(1, Ordering::SeqCst);
        if let Some(sub) = self.feed.lock().take() {
            debug!("roster feed disposed");
            sub.dispose();
        }
    }
}
