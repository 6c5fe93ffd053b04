use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
    Extension,
};
use futures::StreamExt;
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::auth::BearerToken;
use crate::api::rest::body::JsonBody;
use crate::api::rest::dto::{
    AdminDataDto, AdminDataListDto, AuthUserDto, CreateStudentReq, CredentialsReq, ProfileDto,
    RosterSnapshotDto, SessionDto, StudentDto, StudentListDto,
};
use crate::api::rest::error::map_domain_error;
use crate::domain::documents::{profile_path, DocumentService};
use crate::domain::error::DomainError;
use crate::domain::identity::IdentityService;
use modkit::ProblemResponse;

/// Name of the SSE event carrying roster snapshots.
pub const ROSTER_EVENT: &str = "roster";

/// Create an account and return its first session
pub async fn register(
    uri: Uri,
    Extension(identity): Extension<Arc<IdentityService>>,
    JsonBody(req): JsonBody<CredentialsReq>,
) -> Result<(StatusCode, Json<SessionDto>), ProblemResponse> {
    info!(email = %req.email, "Registering account");

    match identity.register(&req.email, &req.password).await {
        Ok(session) => Ok((StatusCode::CREATED, Json(SessionDto::from(session)))),
        Err(e) => {
            error!("Failed to register: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn login(
    uri: Uri,
    Extension(identity): Extension<Arc<IdentityService>>,
    JsonBody(req): JsonBody<CredentialsReq>,
) -> Result<Json<SessionDto>, ProblemResponse> {
    info!(email = %req.email, "Signing in");

    identity
        .login(&req.email, &req.password)
        .await
        .map(|s| Json(SessionDto::from(s)))
        .map_err(|e| {
            error!("Failed to sign in: {}", e);
            map_domain_error(&e, uri.path())
        })
}

pub async fn logout(
    uri: Uri,
    Extension(identity): Extension<Arc<IdentityService>>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, ProblemResponse> {
    match identity.logout(&token).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to sign out: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// The user behind the bearer token
pub async fn current_session(
    uri: Uri,
    Extension(identity): Extension<Arc<IdentityService>>,
    BearerToken(token): BearerToken,
) -> Result<Json<AuthUserDto>, ProblemResponse> {
    identity
        .authenticate(&token)
        .await
        .map(|u| Json(AuthUserDto::from(u)))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

pub async fn get_profile(
    uri: Uri,
    Extension(svc): Extension<Arc<DocumentService>>,
    BearerToken(token): BearerToken,
    Path(uid): Path<Uuid>,
) -> Result<Json<ProfileDto>, ProblemResponse> {
    info!("Getting profile {}", uid);

    match svc.get_profile(&token, uid).await {
        Ok(Some(profile)) => Ok(Json(ProfileDto::from(profile))),
        Ok(None) => Err(map_domain_error(
            &DomainError::not_found(profile_path(uid)),
            uri.path(),
        )),
        Err(e) => {
            error!("Failed to get profile {}: {}", uid, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn put_profile(
    uri: Uri,
    Extension(svc): Extension<Arc<DocumentService>>,
    BearerToken(token): BearerToken,
    Path(uid): Path<Uuid>,
    JsonBody(req): JsonBody<ProfileDto>,
) -> Result<Json<ProfileDto>, ProblemResponse> {
    info!("Setting profile {}: {:?}", uid, req);

    match svc.set_profile(&token, uid, req.clone().into()).await {
        Ok(()) => Ok(Json(req)),
        Err(e) => {
            error!("Failed to set profile {}: {}", uid, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_students(
    uri: Uri,
    Extension(svc): Extension<Arc<DocumentService>>,
    BearerToken(token): BearerToken,
    Path(uid): Path<Uuid>,
) -> Result<Json<StudentListDto>, ProblemResponse> {
    match svc.list_students(&token, uid).await {
        Ok(students) => Ok(Json(StudentListDto::from(students))),
        Err(e) => {
            error!("Failed to list students of {}: {}", uid, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn add_student(
    uri: Uri,
    Extension(svc): Extension<Arc<DocumentService>>,
    BearerToken(token): BearerToken,
    Path(uid): Path<Uuid>,
    JsonBody(req): JsonBody<CreateStudentReq>,
) -> Result<(StatusCode, Json<StudentDto>), ProblemResponse> {
    info!("Adding student for {}: {:?}", uid, req);

    match svc.add_student(&token, uid, req.into()).await {
        Ok(student) => Ok((StatusCode::CREATED, Json(StudentDto::from(student)))),
        Err(e) => {
            error!("Failed to add student: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete_student(
    uri: Uri,
    Extension(svc): Extension<Arc<DocumentService>>,
    BearerToken(token): BearerToken,
    Path((uid, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting student {} of {}", id, uid);

    match svc.delete_student(&token, uid, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete student {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Always answers 501.
pub async fn edit_student(
    uri: Uri,
    Extension(svc): Extension<Arc<DocumentService>>,
    Path((uid, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<StudentDto>, ProblemResponse> {
    svc.edit_student(uid, id)
        .map(|s| Json(StudentDto::from(s)))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

/// SSE endpoint: one `roster` event per snapshot, starting with the current one.
pub async fn students_feed(
    uri: Uri,
    Extension(svc): Extension<Arc<DocumentService>>,
    BearerToken(token): BearerToken,
    Path(uid): Path<Uuid>,
) -> Result<impl IntoResponse, ProblemResponse> {
    let feed = svc
        .watch_students(&token, uid)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    info!("New SSE connection for roster of {}", uid);

    // A failed re-read ends the stream; clients reconnect for a fresh snapshot.
    let snapshots = feed.scan((), move |_, snapshot| {
        let item = match snapshot {
            Ok(students) => Some(RosterSnapshotDto {
                owner: uid,
                students: students.into_iter().map(StudentDto::from).collect(),
            }),
            Err(e) => {
                error!("Roster feed for {} failed: {}", uid, e);
                None
            }
        };
        futures::future::ready(item)
    });
    Ok(modkit::sse_stream_response(snapshots, ROSTER_EVENT))
}

pub async fn add_admin_data(
    uri: Uri,
    Extension(svc): Extension<Arc<DocumentService>>,
    BearerToken(token): BearerToken,
) -> Result<(StatusCode, Json<AdminDataDto>), ProblemResponse> {
    match svc.add_admin_data(&token).await {
        Ok(record) => Ok((StatusCode::CREATED, Json(AdminDataDto::from(record)))),
        Err(e) => {
            error!("Failed to add admin data: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_admin_data(
    uri: Uri,
    Extension(svc): Extension<Arc<DocumentService>>,
    BearerToken(token): BearerToken,
) -> Result<Json<AdminDataListDto>, ProblemResponse> {
    svc.list_admin_data(&token)
        .await
        .map(|records| Json(AdminDataListDto::from(records)))
        .map_err(|e| map_domain_error(&e, uri.path()))
}
