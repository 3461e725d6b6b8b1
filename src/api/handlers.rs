use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use http::header;
use tracing::info;

use crate::api::AppState;
use crate::api::middleware::{authorize_user_update, current_role};
use crate::api::models::*;
use crate::api::validation::{parse_user_id, reject_body, validate_sign_in, validate_sign_up, validate_user_update};
use crate::auth::jwt::Claims;

#[utoipa::path(
    post,
    path = "/api/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User registered, session cookie set", body = AuthResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(reject_body)?;
    let input = validate_sign_up(req)?;

    let user = state
        .auth
        .create_user(input.name, input.email, &input.password, input.role)
        .await?;
    let token = state.jwt.generate_token(&user)?;

    info!("User registered successfully: {}", user.email);
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, state.cookies.session_cookie(&token))],
        Json(AuthResponse {
            message: "User registered".to_string(),
            user,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = AuthResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(reject_body)?;
    let input = validate_sign_in(req)?;

    let user = state.auth.authenticate_user(&input.email, &input.password).await?;
    let token = state.jwt.generate_token(&user)?;

    info!("User signed in successfully: {}", user.email);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, state.cookies.session_cookie(&token))],
        Json(AuthResponse {
            message: "User signed in successfully".to_string(),
            user,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/sign-out",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse)
    )
)]
pub async fn sign_out(State(state): State<AppState>) -> impl IntoResponse {
    info!("User signed out successfully");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, state.cookies.cleared_cookie())],
        Json(MessageResponse {
            message: "User signed out successfully".to_string(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = UsersResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn fetch_all_users(State(state): State<AppState>) -> Result<Json<UsersResponse>, ApiError> {
    let users = state.users.get_all_users().await?;
    info!("Fetched {} users", users.len());
    Ok(Json(UsersResponse {
        message: "Successfully retrieved users".to_string(),
        count: users.len(),
        users,
    }))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "ID of the user to retrieve")
    ),
    responses(
        (status = 200, description = "User retrieved", body = UserResponse),
        (status = 400, description = "Invalid id", body = ValidationErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn fetch_user_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_user_id(&raw_id)?;
    let user = state.users.get_user_by_id(id).await?;
    Ok(Json(UserResponse {
        message: "User retrieved successfully".to_string(),
        user,
    }))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "ID of the user to update")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not allowed to update this user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    )
)]
pub async fn update_user_by_id(
    State(state): State<AppState>,
    Extension(caller): Extension<Claims>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_user_id(&raw_id)?;
    let Json(req) = payload.map_err(reject_body)?;
    let update = validate_user_update(req)?;
    let role = current_role(&state, &caller).await?;
    authorize_user_update(caller.id, role, id, &update)?;

    let user = state.users.update_user(id, update).await?;
    Ok(Json(UserResponse {
        message: "User updated successfully".to_string(),
        user,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "ID of the user to delete")
    ),
    responses(
        (status = 200, description = "User deleted", body = DeleteUserResponse),
        (status = 400, description = "Invalid id", body = ValidationErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn delete_user_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let id = parse_user_id(&raw_id)?;
    let user = state.users.delete_user(id).await?;
    Ok(Json(DeleteUserResponse {
        message: "User deleted successfully".to_string(),
        user,
    }))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

pub async fn api_root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Acquisitions API is running!".to_string(),
    })
}
