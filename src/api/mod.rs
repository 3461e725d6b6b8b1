pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod validation;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    handler::Handler,
    middleware as axum_middleware,
    routing::{get, post},
};
use http::{Method, header};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::auth::cookies::CookieSettings;
use crate::auth::jwt::JwtService;
use crate::auth::password::PasswordHasher;
use crate::config::Config;
use crate::core::services::{AuthService, UserService};
use crate::infrastructure::storage::Storage;
use handlers::*;
use middleware::{authenticate_token, require_admin};
use openapi::ApiDoc;

/// Everything a handler needs, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub jwt: Arc<JwtService>,
    pub cookies: CookieSettings,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, config: &Config) -> Self {
        let hasher = PasswordHasher::new(config.bcrypt_cost);
        AppState {
            auth: Arc::new(AuthService::new(storage.clone(), hasher)),
            users: Arc::new(UserService::new(storage, hasher)),
            jwt: Arc::new(JwtService::new(&config.jwt_secret, config.jwt_expires_in_secs)),
            cookies: CookieSettings {
                secure: config.is_production(),
                max_age_secs: config.cookie_max_age_secs,
            },
            started_at: Instant::now(),
        }
    }
}

/// `/auth/*` and `/users/*`, meant to be nested under `/api`.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let user_routes = Router::new()
        .route("/users", get(fetch_all_users))
        .route(
            "/users/{id}",
            get(fetch_user_by_id)
                .put(update_user_by_id)
                .delete(delete_user_by_id.layer(axum_middleware::from_fn_with_state(state.clone(), require_admin))),
        )
        .route_layer(axum_middleware::from_fn_with_state(state, authenticate_token));

    Router::new()
        .route("/", get(api_root))
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-out", post(sign_out))
        .merge(user_routes)
}

/// The full application: service routes, API docs and the tower-http stack.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Hello from Acquisitions!" }))
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api", api_routes(state.clone()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
