use crate::api::app;
use crate::core::models::user::{Role, UserChanges};
use crate::infrastructure::storage::Storage;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use crate::tests::create_test_state;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    storage: Arc<InMemoryStorage>,
}

fn test_app() -> TestApp {
    let storage = Arc::new(InMemoryStorage::new());
    let router = app(create_test_state(storage.clone()));
    TestApp { router, storage }
}

enum Auth<'a> {
    None,
    Cookie(&'a str),
    Bearer(&'a str),
}

fn request(method: Method, uri: &str, body: Option<Value>, auth: Auth<'_>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    builder = match auth {
        Auth::None => builder,
        Auth::Cookie(token) => builder.header(header::COOKIE, format!("token={}", token)),
        Auth::Bearer(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
    };
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, headers, body)
}

fn session_token(headers: &HeaderMap) -> String {
    let cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("Set-Cookie header");
    cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("token="))
        .expect("token cookie")
        .to_string()
}

fn contains_key(value: &Value, key: &str) -> bool {
    match value {
        Value::Object(map) => map.contains_key(key) || map.values().any(|v| contains_key(v, key)),
        Value::Array(items) => items.iter().any(|v| contains_key(v, key)),
        _ => false,
    }
}

/// Registers through the API and returns (id, session token).
async fn sign_up(app: &TestApp, name: &str, email: &str, role: &str) -> (i64, String) {
    let (status, headers, body) = send(
        app,
        request(
            Method::POST,
            "/api/auth/sign-up",
            Some(json!({ "name": name, "email": email, "password": "secret1", "role": role })),
            Auth::None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    (body["user"]["id"].as_i64().unwrap(), session_token(&headers))
}

#[tokio::test]
async fn test_sign_up_sets_cookie_and_hides_password() {
    let app = test_app();
    let (status, headers, body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/sign-up",
            Some(json!({ "name": "  ", "email": "a@x.com", "password": "secret1" })),
            Auth::None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"][0]["field"], "name");
    assert!(headers.get(header::SET_COOKIE).is_none());

    let (status, headers, body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/sign-up",
            Some(json!({ "name": "A", "email": "a@x.com", "password": "secret1" })),
            Auth::None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(!contains_key(&body, "password"));
    assert!(!contains_key(&body, "password_hash"));

    let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_duplicate_sign_up_conflicts() {
    let app = test_app();
    sign_up(&app, "Ada", "ada@example.com", "user").await;

    let (status, _, body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/sign-up",
            Some(json!({ "name": "Ada Again", "email": "ADA@example.com", "password": "secret2" })),
            Auth::None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "Email already exists" }));
    assert_eq!(app.storage.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_failure() {
    let app = test_app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/sign-up")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"][0]["field"], "body");
}

#[tokio::test]
async fn test_sign_in_failures_look_identical() {
    let app = test_app();
    sign_up(&app, "Ada", "ada@example.com", "user").await;

    let (wrong_status, wrong_headers, wrong_body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/sign-in",
            Some(json!({ "email": "ada@example.com", "password": "not-it" })),
            Auth::None,
        ),
    )
    .await;
    let (unknown_status, _, unknown_body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/sign-in",
            Some(json!({ "email": "nobody@example.com", "password": "secret1" })),
            Auth::None,
        ),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert!(wrong_headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_sign_in_issues_a_usable_session() {
    let app = test_app();
    sign_up(&app, "Ada", "ada@example.com", "user").await;

    let (status, headers, body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/sign-in",
            Some(json!({ "email": "Ada@Example.com", "password": "secret1" })),
            Auth::None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User signed in successfully");
    assert!(!contains_key(&body, "password"));

    let token = session_token(&headers);
    let (status, _, body) = send(&app, request(Method::GET, "/api/users", None, Auth::Cookie(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert!(!contains_key(&body, "password"));
}

#[tokio::test]
async fn test_sign_out_clears_cookie() {
    let app = test_app();
    let (status, headers, body) = send(&app, request(Method::POST, "/api/auth/sign-out", None, Auth::None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User signed out successfully");
    let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_user_routes_require_a_token() {
    let app = test_app();
    let (status, _, body) = send(&app, request(Method::GET, "/api/users", None, Auth::None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");

    let (status, _, _) = send(&app, request(Method::GET, "/api/users", None, Auth::Bearer("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_fetch_user_by_id() {
    let app = test_app();
    let (id, token) = sign_up(&app, "Ada", "ada@example.com", "user").await;

    let (status, _, body) = send(
        &app,
        request(Method::GET, &format!("/api/users/{}", id), None, Auth::Bearer(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Ada");
    assert!(body["user"]["created_at"].is_string());

    let (status, _, _) = send(&app, request(Method::GET, "/api/users/999", None, Auth::Bearer(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = send(&app, request(Method::GET, "/api/users/abc", None, Auth::Bearer(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "id");
}

#[tokio::test]
async fn test_non_admin_cannot_delete() {
    let app = test_app();
    let (target, _) = sign_up(&app, "Ada", "ada@example.com", "user").await;
    let (_, token) = sign_up(&app, "Bob", "bob@example.com", "user").await;

    let (status, _, body) = send(
        &app,
        request(Method::DELETE, &format!("/api/users/{}", target), None, Auth::Cookie(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Insufficient permissions");
    assert!(app.storage.get_user(target).await.unwrap().is_some());
}

#[tokio::test]
async fn test_admin_deletes_user() {
    let app = test_app();
    let (target, _) = sign_up(&app, "Ada", "ada@example.com", "user").await;
    let (_, admin) = sign_up(&app, "Root", "root@example.com", "admin").await;
    let uri = format!("/api/users/{}", target);

    let (status, _, body) = send(&app, request(Method::DELETE, &uri, None, Auth::Cookie(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");
    assert_eq!(body["user"]["email"], "ada@example.com");

    let (status, _, body) = send(&app, request(Method::DELETE, &uri, None, Auth::Cookie(&admin))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_demoted_admin_loses_admin_routes() {
    let app = test_app();
    let (target, _) = sign_up(&app, "Ada", "ada@example.com", "user").await;
    let (root, admin) = sign_up(&app, "Root", "root@example.com", "admin").await;
    app.storage
        .update_user(
            root,
            UserChanges {
                role: Some(Role::User),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();

    let uri = format!("/api/users/{}", target);
    let (status, _, body) = send(&app, request(Method::DELETE, &uri, None, Auth::Cookie(&admin))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Insufficient permissions");

    let (status, _, _) = send(
        &app,
        request(Method::PUT, &uri, Some(json!({ "name": "Hijacked" })), Auth::Cookie(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.storage.get_user(target).await.unwrap().is_some());
}

#[tokio::test]
async fn test_deleted_admin_token_is_rejected() {
    let app = test_app();
    let (target, _) = sign_up(&app, "Ada", "ada@example.com", "user").await;
    let (root, admin) = sign_up(&app, "Root", "root@example.com", "admin").await;
    app.storage.delete_user(root).await.unwrap();

    let (status, _, _) = send(
        &app,
        request(Method::DELETE, &format!("/api/users/{}", target), None, Auth::Cookie(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.storage.get_user(target).await.unwrap().is_some());
}

#[tokio::test]
async fn test_update_rules() {
    let app = test_app();
    let (ada, ada_token) = sign_up(&app, "Ada", "ada@example.com", "user").await;
    let (bob, _) = sign_up(&app, "Bob", "bob@example.com", "user").await;
    let (_, admin) = sign_up(&app, "Root", "root@example.com", "admin").await;

    // someone else's record
    let (status, _, _) = send(
        &app,
        request(
            Method::PUT,
            &format!("/api/users/{}", bob),
            Some(json!({ "name": "Hijacked" })),
            Auth::Cookie(&ada_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // self-promotion
    let (status, _, _) = send(
        &app,
        request(
            Method::PUT,
            &format!("/api/users/{}", ada),
            Some(json!({ "role": "admin" })),
            Auth::Cookie(&ada_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // restating the current role is fine
    let (status, _, body) = send(
        &app,
        request(
            Method::PUT,
            &format!("/api/users/{}", ada),
            Some(json!({ "role": "user", "name": "Ada L." })),
            Auth::Cookie(&ada_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "user");

    let (status, _, body) = send(
        &app,
        request(
            Method::PUT,
            &format!("/api/users/{}", ada),
            Some(json!({ "email": "bob@example.com" })),
            Auth::Cookie(&ada_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already in use");

    let (status, _, body) = send(
        &app,
        request(
            Method::PUT,
            &format!("/api/users/{}", ada),
            Some(json!({ "email": "ada@example.com", "name": "Ada Lovelace" })),
            Auth::Cookie(&ada_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Ada Lovelace");

    let (status, _, body) = send(
        &app,
        request(
            Method::PUT,
            &format!("/api/users/{}", bob),
            Some(json!({ "role": "admin" })),
            Auth::Bearer(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");

    let (status, _, body) = send(
        &app,
        request(Method::PUT, &format!("/api/users/{}", ada), Some(json!({})), Auth::Cookie(&ada_token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
}

#[tokio::test]
async fn test_health_and_docs() {
    let app = test_app();
    let (status, _, body) = send(&app, request(Method::GET, "/health", None, Auth::None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");

    let (status, _, body) = send(&app, request(Method::GET, "/api-docs/openapi.json", None, Auth::None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/auth/sign-up"].is_object());
}
