use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::documents::DocumentService;
use crate::domain::identity::IdentityService;

/// Merge the roster API into `router`.
pub fn register_routes(
    router: Router,
    identity: Arc<IdentityService>,
    documents: Arc<DocumentService>,
) -> anyhow::Result<Router> {
    let api = Router::new()
        // Identity provider
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/session", get(handlers::current_session))
        // Profile documents
        .route(
            "/users/{uid}",
            get(handlers::get_profile).put(handlers::put_profile),
        )
        // Student collection
        .route(
            "/users/{uid}/students",
            get(handlers::list_students).post(handlers::add_student),
        )
        .route("/users/{uid}/students/feed", get(handlers::students_feed))
        .route(
            "/users/{uid}/students/{id}",
            delete(handlers::delete_student).patch(handlers::edit_student),
        )
        // Shared admin collection
        .route(
            "/admin_data",
            post(handlers::add_admin_data).get(handlers::list_admin_data),
        )
        .layer(Extension(identity))
        .layer(Extension(documents));

    Ok(router.merge(api))
}
