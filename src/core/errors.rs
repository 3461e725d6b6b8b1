use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AcquisitionsError {
    #[error("Validation failed: {0:?}")]
    Validation(Vec<FieldError>),
    #[error("User with email {0} already exists")]
    DuplicateEmail(String),
    #[error("Email {0} already in use")]
    EmailConflict(String),
    #[error("No user registered with email {0}")]
    UserNotFound(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User {0} not found")]
    NotFound(i64),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AcquisitionsError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        AcquisitionsError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<sqlx::Error> for AcquisitionsError {
    fn from(err: sqlx::Error) -> Self {
        AcquisitionsError::DatabaseError(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AcquisitionsError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AcquisitionsError::InternalServerError(format!("Password hashing error: {}", err))
    }
}
