use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub log_level: String,
    pub jwt_secret: String,
    pub jwt_expires_in_secs: u64,
    pub cookie_max_age_secs: u64,
    pub app_env: String,
    pub bcrypt_cost: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("database_url", &"<redacted>")
            .field("log_level", &self.log_level)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expires_in_secs", &self.jwt_expires_in_secs)
            .field("cookie_max_age_secs", &self.cookie_max_age_secs)
            .field("app_env", &self.app_env)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

fn parsed_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: parsed_var("PORT", 3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()), // Use a secure secret in production
            jwt_expires_in_secs: parsed_var("JWT_EXPIRES_IN_SECS", 24 * 60 * 60),
            cookie_max_age_secs: parsed_var("COOKIE_MAX_AGE_SECS", 15 * 60),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            bcrypt_cost: parsed_var("BCRYPT_COST", bcrypt::DEFAULT_COST),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
