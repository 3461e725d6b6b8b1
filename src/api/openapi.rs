use utoipa::OpenApi;

use crate::{
    api::models::{
        AuthResponse, DeleteUserResponse, ErrorResponse, HealthResponse, MessageResponse, SignInRequest,
        SignUpRequest, UpdateUserRequest, UserResponse, UsersResponse, ValidationErrorResponse,
    },
    core::{
        errors::FieldError,
        models::user::{Role, UserSummary, UserView},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::sign_up,
        super::handlers::sign_in,
        super::handlers::sign_out,
        super::handlers::fetch_all_users,
        super::handlers::fetch_user_by_id,
        super::handlers::update_user_by_id,
        super::handlers::delete_user_by_id,
        super::handlers::health
    ),
    components(schemas(
        SignUpRequest,
        SignInRequest,
        UpdateUserRequest,
        AuthResponse,
        UserResponse,
        UsersResponse,
        DeleteUserResponse,
        MessageResponse,
        HealthResponse,
        ErrorResponse,
        ValidationErrorResponse,
        FieldError,
        Role,
        UserSummary,
        UserView
    )),
    info(
        title = "Acquisitions API",
        description = "User registration, cookie-based JWT sessions and user management",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
