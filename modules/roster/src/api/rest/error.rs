use axum::http::StatusCode;
use modkit::{Problem, ProblemResponse, ValidationError};

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{}", code))
        .with_code(code)
        .with_instance(instance);

    // Attach the current span id so the response can be matched to logs
    let problem = if let Some(id) = tracing::Span::current().id() {
        problem.with_trace_id(id.into_u64().to_string())
    } else {
        problem
    };

    ProblemResponse(problem)
}

use crate::domain::error::DomainError;

/// Map domain error to RFC9457 ProblemResponse. The detail is the
/// user-facing message.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::EmailInUse { .. } => from_parts(
            StatusCode::CONFLICT,
            "ROSTER_EMAIL_IN_USE",
            "Email already in use",
            e.to_string(),
            instance,
        ),
        DomainError::InvalidEmail { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "ROSTER_INVALID_EMAIL",
            "Invalid email",
            e.to_string(),
            instance,
        ),
        DomainError::WeakPassword { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "ROSTER_WEAK_PASSWORD",
            "Weak password",
            e.to_string(),
            instance,
        ),
        DomainError::InvalidCredentials => from_parts(
            StatusCode::UNAUTHORIZED,
            "ROSTER_INVALID_CREDENTIALS",
            "Invalid credentials",
            e.to_string(),
            instance,
        ),
        DomainError::Unauthenticated => from_parts(
            StatusCode::UNAUTHORIZED,
            "ROSTER_UNAUTHENTICATED",
            "Unauthenticated",
            e.to_string(),
            instance,
        ),
        DomainError::PermissionDenied => from_parts(
            StatusCode::FORBIDDEN,
            "ROSTER_PERMISSION_DENIED",
            "Permission denied",
            e.to_string(),
            instance,
        ),
        DomainError::NotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "ROSTER_NOT_FOUND",
            "Not found",
            e.to_string(),
            instance,
        ),
        DomainError::NotImplemented { .. } => from_parts(
            StatusCode::NOT_IMPLEMENTED,
            "ROSTER_NOT_IMPLEMENTED",
            "Not implemented",
            e.to_string(),
            instance,
        ),
        DomainError::Validation { field, message } => {
            let ProblemResponse(problem) = from_parts(
                StatusCode::BAD_REQUEST,
                "ROSTER_VALIDATION",
                "Validation error",
                e.to_string(),
                instance,
            );
            ProblemResponse(problem.with_errors(vec![ValidationError {
                detail: message.clone(),
                pointer: if field.is_empty() {
                    String::new()
                } else {
                    format!("/{field}")
                },
            }]))
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    }
}
