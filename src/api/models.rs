use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::core::errors::{AcquisitionsError, FieldError};
use crate::core::models::user::{UserSummary, UserView};

// Request bodies. Every field is optional at the serde level so that absent
// fields are reported by validation with the usual 400 envelope.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `user` (default) or `admin`
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub message: String,
    pub user: UserView,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsersResponse {
    pub message: String,
    pub users: Vec<UserView>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started
    pub uptime: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub details: Vec<FieldError>,
}

const INVALID_LOGIN: &str = "Invalid email or password";

// Newtype wrapper for AcquisitionsError to implement IntoResponse
#[derive(Debug)]
pub struct ApiError(pub AcquisitionsError);

impl From<AcquisitionsError> for ApiError {
    fn from(err: AcquisitionsError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AcquisitionsError::Validation(_) => StatusCode::BAD_REQUEST,
            AcquisitionsError::DuplicateEmail(_) | AcquisitionsError::EmailConflict(_) => StatusCode::CONFLICT,
            AcquisitionsError::UserNotFound(_)
            | AcquisitionsError::InvalidCredentials
            | AcquisitionsError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AcquisitionsError::Forbidden(_) => StatusCode::FORBIDDEN,
            AcquisitionsError::NotFound(_) => StatusCode::NOT_FOUND,
            AcquisitionsError::InternalServerError(_) | AcquisitionsError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected ({}): {}", status, self.0);
        }

        let error_message = match self.0 {
            AcquisitionsError::Validation(details) => {
                let body = ValidationErrorResponse {
                    error: "Validation failed".to_string(),
                    details,
                };
                return (status, Json(body)).into_response();
            }
            AcquisitionsError::DuplicateEmail(_) => "Email already exists".to_string(),
            AcquisitionsError::EmailConflict(_) => "Email already in use".to_string(),
            // Unknown account and wrong password share one body.
            AcquisitionsError::UserNotFound(_) | AcquisitionsError::InvalidCredentials => INVALID_LOGIN.to_string(),
            AcquisitionsError::NotFound(_) => "User not found".to_string(),
            AcquisitionsError::Unauthorized(reason) | AcquisitionsError::Forbidden(reason) => reason,
            AcquisitionsError::InternalServerError(_) | AcquisitionsError::DatabaseError(_) => {
                "Internal server error".to_string()
            }
        };
        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}
