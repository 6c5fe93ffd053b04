use thiserror::Error;

/// Domain-level errors. Display strings are the messages users see.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("The email address is already in use by another account.")]
    EmailInUse { email: String },

    #[error("The email address is badly formatted.")]
    InvalidEmail { email: String },

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

    #[error("{feature} functionality not yet implemented.")]
    NotImplemented { feature: String },

    /// `field` is empty when the request as a whole is malformed.
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn email_in_use(email: impl Into<String>) -> Self {
        Self::EmailInUse {
            email: email.into(),
        }
    }

    pub fn invalid_email(email: impl Into<String>) -> Self {
        Self::InvalidEmail {
            email: email.into(),
        }
    }

    pub fn weak_password(min: usize) -> Self {
        Self::WeakPassword { min }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn not_implemented(feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
