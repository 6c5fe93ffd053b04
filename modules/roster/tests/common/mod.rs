#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use roster::config::RosterConfig;
use roster::contract::model::Session;
use roster::domain::documents::DocumentService;
use roster::domain::identity::IdentityService;
use roster::infra::storage::migrations::Migrator;
use roster::module::build_services;

/// Fresh in-memory SQLite with the schema applied. A single pooled
/// connection keeps every query on the same in-memory database.
pub async fn create_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub struct TestBackend {
    pub db: DatabaseConnection,
    pub identity: Arc<IdentityService>,
    pub documents: Arc<DocumentService>,
}

pub async fn backend() -> TestBackend {
    backend_with(RosterConfig::default()).await
}

pub async fn backend_with(cfg: RosterConfig) -> TestBackend {
    let db = create_test_db().await;
    let (identity, documents) = build_services(db.clone(), &cfg);
    TestBackend {
        db,
        identity,
        documents,
    }
}

impl TestBackend {
    /// Registered account with its `user` profile, signed in.
    pub async fn signed_in_user(&self, email: &str) -> Session {
        let session = self
            .identity
            .register(email, "password1")
            .await
            .expect("register");
        self.documents
            .set_profile(
                session.token.expose(),
                session.user.uid,
                roster::model::Profile::new_user(session.user.email.clone()),
            )
            .await
            .expect("profile");
        session
    }

    /// Signed-in account holding the admin role.
    pub async fn signed_in_admin(&self, email: &str) -> Session {
        let user = self
            .identity
            .ensure_account(email, "password1")
            .await
            .expect("account");
        self.documents
            .grant_admin(user.uid, &user.email)
            .await
            .expect("grant");
        self.identity.login(email, "password1").await.expect("login")
    }
}

pub const WAIT: Duration = Duration::from_secs(2);
