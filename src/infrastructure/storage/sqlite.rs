use crate::core::errors::AcquisitionsError;
use crate::core::models::user::{NewUser, Role, User, UserChanges};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    password TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email);
"#;

const USER_COLUMNS: &str = "id, name, email, password, role, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AcquisitionsError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role).map_err(AcquisitionsError::DatabaseError)?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Relational store backed by SQLite through sqlx.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens the database at `database_url` and bootstraps the schema.
    ///
    /// An in-memory database lives only as long as its connection, so that
    /// case gets a single connection that is never reaped.
    pub async fn connect(database_url: &str) -> Result<Self, AcquisitionsError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        let storage = SqliteStorage { pool };
        storage.migrate().await?;
        info!("Connected to database");
        Ok(storage)
    }

    async fn migrate(&self) -> Result<(), AcquisitionsError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn insert_user(&self, user: NewUser) -> Result<User, AcquisitionsError> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO users (name, email, password, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AcquisitionsError::DuplicateEmail(user.email.clone())
                } else {
                    e.into()
                }
            })?;
        row.try_into()
    }

    async fn list_users(&self) -> Result<Vec<User>, AcquisitionsError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AcquisitionsError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AcquisitionsError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? LIMIT 1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, AcquisitionsError> {
        let query = format!(
            "UPDATE users SET \
                name = COALESCE(?, name), \
                email = COALESCE(?, email), \
                password = COALESCE(?, password), \
                role = COALESCE(?, role), \
                updated_at = ? \
             WHERE id = ? RETURNING {USER_COLUMNS}"
        );
        let email = changes.email.clone();
        sqlx::query_as::<_, UserRow>(&query)
            .bind(changes.name)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.role.map(|role| role.as_str()))
            .bind(updated_at)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| match email {
                Some(email) if is_unique_violation(&e) => AcquisitionsError::EmailConflict(email),
                _ => e.into(),
            })?
            .map(User::try_from)
            .transpose()
    }

    async fn delete_user(&self, id: i64) -> Result<Option<User>, AcquisitionsError> {
        let query = format!("DELETE FROM users WHERE id = ? RETURNING {USER_COLUMNS}");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
