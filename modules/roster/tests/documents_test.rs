//! Document store behavior: access rules, ordering and the live feed.

mod common;

use futures::StreamExt;
use tokio::time::timeout;
use uuid::Uuid;

use roster::config::RosterConfig;
use roster::domain::error::DomainError;
use roster::model::{NewStudent, Profile, ADMIN_DATA_MESSAGE};

use common::{backend, backend_with, WAIT};

fn new_student(first: &str, last: &str) -> NewStudent {
    NewStudent {
        first_name: first.to_string(),
        last_name: last.to_string(),
        enrollment_date: "2024-09-01".to_string(),
    }
}

#[tokio::test]
async fn students_are_listed_newest_first() {
    let b = backend().await;
    let s = b.signed_in_user("ada@example.com").await;
    let (token, uid) = (s.token.expose(), s.user.uid);

    let first = b.documents.add_student(token, uid, new_student("Alan", "Turing")).await.unwrap();
    let second = b.documents.add_student(token, uid, new_student("Grace", "Hopper")).await.unwrap();
    let third = b.documents.add_student(token, uid, new_student("Ada", "Lovelace")).await.unwrap();
    assert!(first.created_at < second.created_at && second.created_at < third.created_at);

    let ids: Vec<Uuid> = b
        .documents
        .list_students(token, uid)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[tokio::test]
async fn delete_removes_only_the_owners_document() {
    let b = backend().await;
    let s = b.signed_in_user("ada@example.com").await;
    let (token, uid) = (s.token.expose(), s.user.uid);

    let kept = b.documents.add_student(token, uid, new_student("Alan", "Turing")).await.unwrap();
    let gone = b.documents.add_student(token, uid, new_student("Grace", "Hopper")).await.unwrap();

    b.documents.delete_student(token, uid, gone.id).await.unwrap();
    // a missing document is not an error
    b.documents.delete_student(token, uid, Uuid::new_v4()).await.unwrap();

    let left = b.documents.list_students(token, uid).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, kept.id);
}

#[tokio::test]
async fn other_users_documents_are_off_limits() {
    let b = backend().await;
    let ada = b.signed_in_user("ada@example.com").await;
    let bob = b.signed_in_user("bob@example.com").await;

    let student = b
        .documents
        .add_student(ada.token.expose(), ada.user.uid, new_student("Alan", "Turing"))
        .await
        .unwrap();

    let t = bob.token.expose();
    let denied = DomainError::PermissionDenied;
    assert_eq!(b.documents.list_students(t, ada.user.uid).await.unwrap_err(), denied);
    assert_eq!(b.documents.get_profile(t, ada.user.uid).await.unwrap_err(), denied);
    assert_eq!(
        b.documents
            .add_student(t, ada.user.uid, new_student("X", "Y"))
            .await
            .unwrap_err(),
        denied
    );
    assert_eq!(
        b.documents.delete_student(t, ada.user.uid, student.id).await.unwrap_err(),
        denied
    );
    assert!(b.documents.watch_students(t, ada.user.uid).await.is_err());
    assert_eq!(
        b.documents
            .set_profile(t, ada.user.uid, Profile::new_user("bob@example.com"))
            .await
            .unwrap_err(),
        denied
    );
}

#[tokio::test]
async fn users_cannot_grant_themselves_admin() {
    let b = backend().await;
    let s = b.signed_in_user("ada@example.com").await;
    let admin = Profile {
        email: "ada@example.com".into(),
        role: "admin".into(),
    };
    assert_eq!(
        b.documents
            .set_profile(s.token.expose(), s.user.uid, admin)
            .await
            .unwrap_err(),
        DomainError::PermissionDenied
    );
    let profile = b
        .documents
        .get_profile(s.token.expose(), s.user.uid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.role, "user");
}

#[tokio::test]
async fn admins_can_read_but_not_write_user_rosters() {
    let b = backend().await;
    let ada = b.signed_in_user("ada@example.com").await;
    let root = b.signed_in_admin("root@example.com").await;
    b.documents
        .add_student(ada.token.expose(), ada.user.uid, new_student("Alan", "Turing"))
        .await
        .unwrap();

    let t = root.token.expose();
    assert_eq!(b.documents.list_students(t, ada.user.uid).await.unwrap().len(), 1);
    assert!(b.documents.get_profile(t, ada.user.uid).await.unwrap().is_some());
    assert_eq!(
        b.documents
            .add_student(t, ada.user.uid, new_student("X", "Y"))
            .await
            .unwrap_err(),
        DomainError::PermissionDenied
    );
}

#[tokio::test]
async fn missing_profile_reads_as_none() {
    let b = backend().await;
    let s = b.identity.register("orphan@example.com", "secret1").await.unwrap();
    assert_eq!(
        b.documents.get_profile(s.token.expose(), s.user.uid).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn signed_out_callers_are_rejected() {
    let b = backend().await;
    let s = b.signed_in_user("ada@example.com").await;
    b.identity.logout(s.token.expose()).await.unwrap();
    assert_eq!(
        b.documents
            .list_students(s.token.expose(), s.user.uid)
            .await
            .unwrap_err(),
        DomainError::Unauthenticated
    );
}

#[tokio::test]
async fn admin_data_is_admin_only() {
    let b = backend().await;
    let ada = b.signed_in_user("ada@example.com").await;
    let root = b.signed_in_admin("root@example.com").await;

    assert_eq!(
        b.documents.add_admin_data(ada.token.expose()).await.unwrap_err(),
        DomainError::PermissionDenied
    );
    assert!(b.documents.list_admin_data(ada.token.expose()).await.is_err());

    let record = b.documents.add_admin_data(root.token.expose()).await.unwrap();
    assert_eq!(record.message, ADMIN_DATA_MESSAGE);
    assert_eq!(record.created_by, root.user.uid);

    let listed = b.documents.list_admin_data(root.token.expose()).await.unwrap();
    assert_eq!(listed, vec![record]);
}

#[tokio::test]
async fn edit_is_not_implemented() {
    let b = backend().await;
    let err = b
        .documents
        .edit_student(Uuid::new_v4(), Uuid::new_v4())
        .unwrap_err();
    assert_eq!(err.to_string(), "Edit functionality not yet implemented.");
}

#[tokio::test]
async fn feed_delivers_full_snapshots_for_its_owner_only() {
    let b = backend().await;
    let ada = b.signed_in_user("ada@example.com").await;
    let bob = b.signed_in_user("bob@example.com").await;
    let (token, uid) = (ada.token.expose(), ada.user.uid);

    let existing = b.documents.add_student(token, uid, new_student("Alan", "Turing")).await.unwrap();
    let mut feed = b.documents.watch_students(token, uid).await.unwrap();

    let initial = timeout(WAIT, feed.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(initial.len(), 1);
    assert_eq!(initial[0].id, existing.id);

    // another user's change does not produce a snapshot
    b.documents
        .add_student(bob.token.expose(), bob.user.uid, new_student("X", "Y"))
        .await
        .unwrap();

    let added = b.documents.add_student(token, uid, new_student("Ada", "Lovelace")).await.unwrap();
    let after_add = timeout(WAIT, feed.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(
        after_add.iter().map(|s| s.id).collect::<Vec<_>>(),
        vec![added.id, existing.id]
    );

    b.documents.delete_student(token, uid, existing.id).await.unwrap();
    let after_delete = timeout(WAIT, feed.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(after_delete.len(), 1);
    assert_eq!(after_delete[0].id, added.id);
}

#[tokio::test]
async fn feed_reloads_after_falling_behind() {
    let b = backend_with(RosterConfig {
        event_capacity: 2,
        ..Default::default()
    })
    .await;
    let ada = b.signed_in_user("ada@example.com").await;
    let bob = b.signed_in_user("bob@example.com").await;
    let (token, uid) = (ada.token.expose(), ada.user.uid);

    let mut feed = b.documents.watch_students(token, uid).await.unwrap();
    let initial = timeout(WAIT, feed.next()).await.unwrap().unwrap().unwrap();
    assert!(initial.is_empty());

    // Ada's change is pushed out of the channel by Bob's two
    let added = b.documents.add_student(token, uid, new_student("Ada", "Lovelace")).await.unwrap();
    for last in ["X", "Y"] {
        b.documents
            .add_student(bob.token.expose(), bob.user.uid, new_student("Bob", last))
            .await
            .unwrap();
    }

    let reloaded = timeout(WAIT, feed.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(reloaded.iter().map(|s| s.id).collect::<Vec<_>>(), vec![added.id]);
}

#[tokio::test]
async fn feed_ends_once_its_session_is_signed_out() {
    let b = backend().await;
    let ada = b.signed_in_user("ada@example.com").await;
    let (token, uid) = (ada.token.expose(), ada.user.uid);

    let mut feed = b.documents.watch_students(token, uid).await.unwrap();
    timeout(WAIT, feed.next()).await.unwrap().unwrap().unwrap();

    b.identity.logout(token).await.unwrap();
    let fresh = b.identity.login("ada@example.com", "password1").await.unwrap();
    b.documents
        .add_student(fresh.token.expose(), uid, new_student("Ada", "Lovelace"))
        .await
        .unwrap();

    let next = timeout(WAIT, feed.next()).await.unwrap().unwrap();
    assert_eq!(next.unwrap_err(), DomainError::Unauthenticated);
    assert!(timeout(WAIT, feed.next()).await.unwrap().is_none());
}
