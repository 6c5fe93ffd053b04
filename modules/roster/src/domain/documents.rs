use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{AdminData, NewStudent, Profile, Role, Student, ADMIN_DATA_MESSAGE, ROLE_ADMIN};
use crate::domain::access::{self, Caller};
use crate::domain::error::DomainError;
use crate::domain::events::StudentDomainEvent;
use crate::domain::identity::IdentityService;
use crate::domain::ports::{EventPublisher, EventSubscriber, Notification};
use crate::domain::repo::DocumentsRepository;

/// Stream of full roster snapshots.
pub type RosterFeed = BoxStream<'static, Result<Vec<Student>, DomainError>>;

/// Document database with access rules enforced per caller.
#[derive(Clone)]
pub struct DocumentService {
    identity: Arc<IdentityService>,
    repo: Arc<dyn DocumentsRepository>,
    events: Arc<dyn EventPublisher<StudentDomainEvent>>,
    changes: Arc<dyn EventSubscriber<StudentDomainEvent>>,
    // Last issued server timestamp; issued values strictly increase.
    clock: Arc<Mutex<DateTime<Utc>>>,
}

pub fn profile_path(uid: Uuid) -> String {
    format!("users/{uid}")
}

pub fn student_path(owner: Uuid, id: Uuid) -> String {
    format!("users/{owner}/students/{id}")
}

impl DocumentService {
    pub fn new(
        identity: Arc<IdentityService>,
        repo: Arc<dyn DocumentsRepository>,
        events: Arc<dyn EventPublisher<StudentDomainEvent>>,
        changes: Arc<dyn EventSubscriber<StudentDomainEvent>>,
    ) -> Self {
        Self {
            identity,
            repo,
            events,
            changes,
            clock: Arc::new(Mutex::new(DateTime::<Utc>::MIN_UTC)),
        }
    }

    pub fn identity(&self) -> &Arc<IdentityService> {
        &self.identity
    }

    #[instrument(name = "roster.documents.get_profile", skip(self, token), fields(uid = %uid))]
    pub async fn get_profile(&self, token: &str, uid: Uuid) -> Result<Option<Profile>, DomainError> {
        let caller = self.caller(token).await?;
        if !access::can_read_profile(&caller, uid) {
            return Err(denied(&caller));
        }
        self.repo
            .find_profile(uid)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(
        name = "roster.documents.set_profile",
        skip(self, token, profile),
        fields(uid = %uid, role = %profile.role)
    )]
    pub async fn set_profile(&self, token: &str, uid: Uuid, profile: Profile) -> Result<(), DomainError> {
        let caller = self.caller(token).await?;
        if !access::can_write_profile(&caller, uid, &profile.role) {
            return Err(denied(&caller));
        }
        self.repo
            .upsert_profile(uid, profile)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!("profile written");
        Ok(())
    }

    /// Trusted path used at startup to provision the configured admin.
    #[instrument(name = "roster.documents.grant_admin", skip(self), fields(uid = %uid))]
    pub async fn grant_admin(&self, uid: Uuid, email: &str) -> Result<(), DomainError> {
        let profile = Profile {
            email: email.to_string(),
            role: ROLE_ADMIN.to_string(),
        };
        self.repo
            .upsert_profile(uid, profile)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!("admin role granted");
        Ok(())
    }

    #[instrument(name = "roster.documents.add_student", skip(self, token, new_student), fields(owner = %owner))]
    pub async fn add_student(
        &self,
        token: &str,
        owner: Uuid,
        new_student: NewStudent,
    ) -> Result<Student, DomainError> {
        let caller = self.caller(token).await?;
        if !access::can_write_roster(&caller, owner) {
            return Err(denied(&caller));
        }

        let student = Student {
            id: Uuid::new_v4(),
            first_name: new_student.first_name,
            last_name: new_student.last_name,
            enrollment_date: new_student.enrollment_date,
            created_at: self.server_timestamp(),
        };
        self.repo
            .insert_student(owner, student.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        self.events.publish(&StudentDomainEvent::Created {
            owner,
            id: student.id,
            at: student.created_at,
        });
        info!(id = %student.id, "student added");
        Ok(student)
    }

    /// Deleting a missing document succeeds without a change notification.
    #[instrument(name = "roster.documents.delete_student", skip(self, token), fields(owner = %owner, id = %id))]
    pub async fn delete_student(&self, token: &str, owner: Uuid, id: Uuid) -> Result<(), DomainError> {
        let caller = self.caller(token).await?;
        if !access::can_write_roster(&caller, owner) {
            return Err(denied(&caller));
        }

        let removed = self
            .repo
            .delete_student(owner, id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if removed {
            self.events.publish(&StudentDomainEvent::Deleted {
                owner,
                id,
                at: Utc::now(),
            });
            info!("student removed");
        } else {
            debug!("no such student");
        }
        Ok(())
    }

    /// Editing student records is not supported.
    pub fn edit_student(&self, owner: Uuid, id: Uuid) -> Result<Student, DomainError> {
        debug!(owner = %owner, id = %id, "edit requested");
        Err(DomainError::not_implemented("Edit"))
    }

    #[instrument(name = "roster.documents.list_students", skip(self, token), fields(owner = %owner))]
    pub async fn list_students(&self, token: &str, owner: Uuid) -> Result<Vec<Student>, DomainError> {
        let caller = self.caller(token).await?;
        if !access::can_read_roster(&caller, owner) {
            return Err(denied(&caller));
        }
        load_roster(self.repo.clone(), owner).await
    }

    /// The current snapshot first, then a fresh snapshot after each change
    /// to `owner`'s collection, or after missed notifications. The caller is
    /// re-authorized before every reload; the feed yields the error and ends
    /// once the session is gone or access is lost.
    #[instrument(name = "roster.documents.watch_students", skip(self, token), fields(owner = %owner))]
    pub async fn watch_students(&self, token: &str, owner: Uuid) -> Result<RosterFeed, DomainError> {
        let caller = self.caller(token).await?;
        if !access::can_read_roster(&caller, owner) {
            return Err(denied(&caller));
        }

        // Subscribe before the initial read so no change falls in between.
        let changes = self.changes.subscribe();
        let initial = stream::once(load_roster(self.repo.clone(), owner));
        let svc = self.clone();
        let token = token.to_owned();
        let updates = changes
            .filter(move |notification| {
                let relevant = match notification {
                    Notification::Event(event) => event.owner() == owner,
                    Notification::Lagged { skipped } => {
                        debug!(skipped, "roster feed lagged, reloading");
                        true
                    }
                };
                futures::future::ready(relevant)
            })
            .then(move |_| {
                let svc = svc.clone();
                let token = token.clone();
                async move { svc.reload_roster(&token, owner).await }
            });

        debug!("roster feed opened");
        // Ends right after the first error, without waiting for another change.
        let feed = stream::unfold(Some(initial.chain(updates).boxed()), |snapshots| async move {
            let mut snapshots = snapshots?;
            let snapshot = snapshots.next().await?;
            let rest = snapshot.is_ok().then_some(snapshots);
            Some((snapshot, rest))
        });
        Ok(feed.boxed())
    }

    #[instrument(name = "roster.documents.add_admin_data", skip_all)]
    pub async fn add_admin_data(&self, token: &str) -> Result<AdminData, DomainError> {
        let caller = self.caller(token).await?;
        if !access::can_access_admin_data(&caller) {
            return Err(denied(&caller));
        }

        let record = AdminData {
            id: Uuid::new_v4(),
            message: ADMIN_DATA_MESSAGE.to_string(),
            created_by: caller.uid,
            created_at: self.server_timestamp(),
        };
        self.repo
            .insert_admin_data(record.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(id = %record.id, "admin data added");
        Ok(record)
    }

    #[instrument(name = "roster.documents.list_admin_data", skip_all)]
    pub async fn list_admin_data(&self, token: &str) -> Result<Vec<AdminData>, DomainError> {
        let caller = self.caller(token).await?;
        if !access::can_access_admin_data(&caller) {
            return Err(denied(&caller));
        }
        self.repo
            .list_admin_data()
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    async fn reload_roster(&self, token: &str, owner: Uuid) -> Result<Vec<Student>, DomainError> {
        let caller = self.caller(token).await?;
        if !access::can_read_roster(&caller, owner) {
            return Err(denied(&caller));
        }
        load_roster(self.repo.clone(), owner).await
    }

    async fn caller(&self, token: &str) -> Result<Caller, DomainError> {
        let user = self.identity.authenticate(token).await?;
        let role = self
            .repo
            .find_profile(user.uid)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .map(|p| p.role())
            .unwrap_or(Role::User);
        Ok(Caller {
            uid: user.uid,
            role,
        })
    }

    fn server_timestamp(&self) -> DateTime<Utc> {
        let mut last = self.clock.lock();
        let now = Utc::now();
        let ts = if now > *last {
            now
        } else {
            *last + Duration::microseconds(1)
        };
        *last = ts;
        ts
    }
}

async fn load_roster(
    repo: Arc<dyn DocumentsRepository>,
    owner: Uuid,
) -> Result<Vec<Student>, DomainError> {
    repo.list_students(owner)
        .await
        .map_err(|e| DomainError::database(e.to_string()))
}

fn denied(caller: &Caller) -> DomainError {
    warn!(caller = %caller.uid, role = caller.role.as_str(), "permission denied");
    DomainError::PermissionDenied
}
