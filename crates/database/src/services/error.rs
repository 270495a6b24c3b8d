use sea_orm::DbErr;
use thiserror::Error;

/// Field name used for errors that are not tied to one input field
pub const NON_FIELD: &str = "non_field_errors";

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected before any state changed
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The caller is identified but may not perform this action
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The action requires credentials and none were supplied
    #[error("authentication credentials were not provided")]
    Unauthenticated,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Deletion blocked by records that still reference the target
    #[error("{0}")]
    Protected(String),

    #[error("password hashing failed: {0}")]
    Password(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
