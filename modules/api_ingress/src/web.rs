use axum::{http::Uri, response::Json};
use modkit::ProblemResponse;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Unknown routes answer with a problem document instead of an empty 404.
pub async fn fallback(uri: Uri) -> ProblemResponse {
    let mut resp = modkit::not_found(format!("No route for {}", uri.path()));
    resp.0.instance = uri.path().to_string();
    resp.0.code = "ROUTE_NOT_FOUND".to_string();
    resp
}
