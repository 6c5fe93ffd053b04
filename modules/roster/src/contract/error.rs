use thiserror::Error;

use crate::domain::error::DomainError;

/// Errors that are safe to expose to other modules and to the client app.
/// The display string is the raw provider message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("The email address is already in use by another account.")]
    EmailInUse,

    #[error("The email address is badly formatted.")]
    InvalidEmail,

    #[error("Password should be at least {min} characters.")]
    WeakPassword { min: usize },

    #[error("The email or password is incorrect.")]
    InvalidCredentials,

    #[error("The request requires a signed-in user.")]
    Unauthenticated,

    #[error("Missing or insufficient permissions.")]
    PermissionDenied,

    #[error("No document found at {path}.")]
    NotFound { path: String },

    #[error("{message}")]
    NotImplemented { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("An internal error occurred.")]
    Internal,
}

impl From<DomainError> for RosterError {
    fn from(domain_error: DomainError) -> Self {
        match domain_error {
            DomainError::EmailInUse { .. } => Self::EmailInUse,
            DomainError::InvalidEmail { .. } => Self::InvalidEmail,
            DomainError::WeakPassword { min } => Self::WeakPassword { min },
            DomainError::InvalidCredentials => Self::InvalidCredentials,
            DomainError::Unauthenticated => Self::Unauthenticated,
            DomainError::PermissionDenied => Self::PermissionDenied,
            DomainError::NotFound { path } => Self::NotFound { path },
            e @ DomainError::NotImplemented { .. } => Self::NotImplemented {
                message: e.to_string(),
            },
            e @ DomainError::Validation { .. } => Self::Validation {
                message: e.to_string(),
            },
            DomainError::Database { .. } => Self::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_messages_survive_conversion() {
        for e in [
            DomainError::email_in_use("x@y.io"),
            DomainError::invalid_email("nope"),
            DomainError::weak_password(8),
            DomainError::InvalidCredentials,
            DomainError::PermissionDenied,
            DomainError::not_implemented("Edit"),
        ] {
            let msg = e.to_string();
            assert_eq!(RosterError::from(e).to_string(), msg);
        }
    }

    #[test]
    fn database_details_are_hidden() {
        let e = RosterError::from(DomainError::database("disk I/O error"));
        assert_eq!(e, RosterError::Internal);
        assert!(!e.to_string().contains("disk"));
    }
}
