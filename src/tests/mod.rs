mod api_tests;

use crate::api::AppState;
use crate::auth::password::PasswordHasher;
use crate::config::Config;
use crate::core::models::user::{Role, UserSummary};
use crate::core::services::{AuthService, UserService};
use crate::infrastructure::storage::Storage;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use std::sync::Arc;

pub const TEST_BCRYPT_COST: u32 = 4;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        log_level: "debug".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_expires_in_secs: 3600,
        cookie_max_age_secs: 900,
        app_env: "test".to_string(),
        bcrypt_cost: TEST_BCRYPT_COST,
    }
}

pub struct TestServices {
    pub storage: Arc<InMemoryStorage>,
    pub auth: AuthService,
    pub users: UserService,
}

pub fn create_test_services() -> TestServices {
    init_tracing();
    let storage = Arc::new(InMemoryStorage::new());
    let hasher = PasswordHasher::new(TEST_BCRYPT_COST);
    TestServices {
        auth: AuthService::new(storage.clone(), hasher),
        users: UserService::new(storage.clone(), hasher),
        storage,
    }
}

pub fn create_test_state(storage: Arc<dyn Storage>) -> AppState {
    init_tracing();
    AppState::new(storage, &test_config())
}

pub async fn register(auth: &AuthService, name: &str, email: &str, role: Role) -> UserSummary {
    auth.create_user(name.to_string(), email.to_string(), "secret1", role)
        .await
        .unwrap()
}
