use axum::{
    Extension,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::{HeaderMap, header};
use tracing::warn;

use crate::api::AppState;
use crate::api::models::ApiError;
use crate::auth::cookies::{TOKEN_COOKIE, read_cookie};
use crate::auth::jwt::Claims;
use crate::core::errors::AcquisitionsError;
use crate::core::models::user::Role;
use crate::core::services::UserUpdate;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the caller from the session cookie, falling back to a bearer
/// token, and stores their [`Claims`] as a request extension.
pub async fn authenticate_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = read_cookie(req.headers(), TOKEN_COOKIE)
        .or_else(|| bearer_token(req.headers()))
        .ok_or_else(|| AcquisitionsError::Unauthorized("Authentication required".to_string()))?;

    let claims = state.jwt.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// The caller's role as stored now. Claims keep the role the token was
/// issued with, which goes stale once an account is demoted or deleted.
pub async fn current_role(state: &AppState, claims: &Claims) -> Result<Role, AcquisitionsError> {
    match state.users.get_user_by_id(claims.id).await {
        Ok(user) => Ok(user.role),
        Err(AcquisitionsError::NotFound(_)) => {
            warn!("Token for deleted user {} presented", claims.id);
            Err(AcquisitionsError::Unauthorized("Authentication required".to_string()))
        }
        Err(e) => Err(e),
    }
}

/// Must run after [`authenticate_token`]. Checks the stored role, not the
/// token claim.
pub async fn require_admin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let role = current_role(&state, &claims).await?;
    if role != Role::Admin {
        warn!("User {} with role {} denied admin route", claims.id, role);
        return Err(AcquisitionsError::Forbidden("Insufficient permissions".to_string()).into());
    }
    Ok(next.run(req).await)
}

/// Users may edit their own record but not their role; admins may edit anyone.
/// Restating one's current role is not a change.
pub fn authorize_user_update(
    caller_id: i64,
    caller_role: Role,
    target_id: i64,
    update: &UserUpdate,
) -> Result<(), AcquisitionsError> {
    if caller_role == Role::Admin {
        return Ok(());
    }
    if caller_id != target_id {
        return Err(AcquisitionsError::Forbidden(
            "You can only update your own information".to_string(),
        ));
    }
    if update.role.is_some_and(|role| role != caller_role) {
        return Err(AcquisitionsError::Forbidden("Only admin users can change roles".to_string()));
    }
    Ok(())
}
