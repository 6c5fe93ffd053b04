//! Identity provider behavior over the SeaORM repositories.

mod common;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use roster::config::RosterConfig;
use roster::domain::error::DomainError;
use roster::domain::identity::{IdentityConfig, IdentityService};
use roster::domain::model::{Account, SessionRecord};
use roster::domain::repo::AccountsRepository;
use roster::infra::storage::sea_orm_repo::SeaOrmAccountsRepository;

use common::{backend, backend_with, create_test_db};

#[tokio::test]
async fn register_then_login_and_authenticate() {
    let b = backend().await;

    let registered = b.identity.register("Ada@Example.com ", "secret1").await.unwrap();
    assert_eq!(registered.user.email, "ada@example.com");

    let session = b.identity.login("ada@example.com", "secret1").await.unwrap();
    assert_eq!(session.user.uid, registered.user.uid);
    assert_ne!(session.token, registered.token);

    let who = b.identity.authenticate(session.token.expose()).await.unwrap();
    assert_eq!(who.uid, registered.user.uid);
    assert_eq!(who.email, "ada@example.com");
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() {
    let b = backend().await;
    b.identity.register("ada@example.com", "secret1").await.unwrap();

    let err = b
        .identity
        .register("ADA@example.COM", "another1")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmailInUse { .. }));
    assert_eq!(
        err.to_string(),
        "The email address is already in use by another account."
    );
}

#[tokio::test]
async fn provider_side_validation() {
    let b = backend().await;

    let err = b.identity.register("not-an-email", "secret1").await.unwrap_err();
    assert_eq!(err.to_string(), "The email address is badly formatted.");

    let err = b.identity.register("ada@example.com", "12345").await.unwrap_err();
    assert_eq!(err.to_string(), "Password should be at least 6 characters.");

    let b = backend_with(RosterConfig {
        min_password_length: 10,
        ..Default::default()
    })
    .await;
    let err = b.identity.register("ada@example.com", "secret1").await.unwrap_err();
    assert_eq!(err, DomainError::weak_password(10));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let b = backend().await;
    b.identity.register("ada@example.com", "secret1").await.unwrap();

    let wrong = b.identity.login("ada@example.com", "secret2").await.unwrap_err();
    let unknown = b.identity.login("bob@example.com", "secret1").await.unwrap_err();
    assert_eq!(wrong, DomainError::InvalidCredentials);
    assert_eq!(unknown, DomainError::InvalidCredentials);
    assert_eq!(wrong.to_string(), "The email or password is incorrect.");
}

#[tokio::test]
async fn logout_invalidates_the_token() {
    let b = backend().await;
    let session = b.identity.register("ada@example.com", "secret1").await.unwrap();

    b.identity.logout(session.token.expose()).await.unwrap();
    let err = b
        .identity
        .authenticate(session.token.expose())
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Unauthenticated);

    // ending it twice is fine
    b.identity.logout(session.token.expose()).await.unwrap();
}

#[tokio::test]
async fn expired_sessions_are_rejected_and_purged() {
    let b = backend_with(RosterConfig {
        session_ttl_secs: 0,
        ..Default::default()
    })
    .await;
    let first = b.identity.register("ada@example.com", "secret1").await.unwrap();
    let _second = b.identity.login("ada@example.com", "secret1").await.unwrap();

    assert_eq!(
        b.identity.authenticate(first.token.expose()).await.unwrap_err(),
        DomainError::Unauthenticated
    );
    // `first` was dropped on lookup; only the second one is left to purge
    assert_eq!(b.identity.purge_expired_sessions().await.unwrap(), 1);
}

#[tokio::test]
async fn unknown_token_is_unauthenticated() {
    let b = backend().await;
    assert_eq!(
        b.identity.authenticate("deadbeef").await.unwrap_err(),
        DomainError::Unauthenticated
    );
}

#[tokio::test]
async fn ensure_account_is_idempotent_and_keeps_the_password() {
    let b = backend().await;
    let first = b.identity.ensure_account("root@example.com", "rootpass").await.unwrap();
    let again = b.identity.ensure_account("Root@example.com", "changed!").await.unwrap();
    assert_eq!(first.uid, again.uid);

    assert!(b.identity.login("root@example.com", "rootpass").await.is_ok());
    assert!(b.identity.login("root@example.com", "changed!").await.is_err());
}

fn account(email: &str) -> Account {
    Account {
        uid: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn account_insert_reports_a_taken_email() {
    let repo = SeaOrmAccountsRepository::new(create_test_db().await);
    assert!(repo.insert(account("ada@example.com")).await.unwrap());
    assert!(!repo.insert(account("ada@example.com")).await.unwrap());
}

// Never sees existing accounts, like a registration whose lookup ran
// before a concurrent insert landed.
struct StaleLookup(SeaOrmAccountsRepository<sea_orm::DatabaseConnection>);

#[async_trait::async_trait]
impl AccountsRepository for StaleLookup {
    async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<Account>> {
        Ok(None)
    }
    async fn find_by_uid(&self, uid: Uuid) -> anyhow::Result<Option<Account>> {
        self.0.find_by_uid(uid).await
    }
    async fn insert(&self, account: Account) -> anyhow::Result<bool> {
        self.0.insert(account).await
    }
    async fn insert_session(&self, session: SessionRecord) -> anyhow::Result<()> {
        self.0.insert_session(session).await
    }
    async fn find_session(&self, token_hash: &str) -> anyhow::Result<Option<SessionRecord>> {
        self.0.find_session(token_hash).await
    }
    async fn delete_session(&self, token_hash: &str) -> anyhow::Result<bool> {
        self.0.delete_session(token_hash).await
    }
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        self.0.delete_expired_sessions(now).await
    }
}

#[tokio::test]
async fn losing_a_registration_race_is_email_in_use() {
    let db = create_test_db().await;
    let identity = IdentityService::new(
        Arc::new(StaleLookup(SeaOrmAccountsRepository::new(db))),
        IdentityConfig::default(),
    );
    identity.register("ada@example.com", "secret1").await.unwrap();

    let err = identity
        .register("ada@example.com", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmailInUse { .. }));
}

#[tokio::test]
async fn concurrent_registrations_create_one_account() {
    let b = backend().await;
    let (first, second) = tokio::join!(
        b.identity.register("ada@example.com", "secret1"),
        b.identity.register("ada@example.com", "secret2"),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, DomainError::EmailInUse { .. })));
}
