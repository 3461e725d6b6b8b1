use crate::core::errors::AcquisitionsError;
use crate::core::models::user::{NewUser, User, UserChanges};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence seam for the `users` entity.
///
/// Email uniqueness is enforced here, atomically with the write: `insert_user`
/// reports a taken email as [`AcquisitionsError::DuplicateEmail`] and
/// `update_user` as [`AcquisitionsError::EmailConflict`].
#[async_trait]
pub trait Storage: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User, AcquisitionsError>;
    async fn list_users(&self) -> Result<Vec<User>, AcquisitionsError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, AcquisitionsError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AcquisitionsError>;
    /// Returns `None` when no row has `id`.
    async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, AcquisitionsError>;
    /// Returns the removed row, or `None` when no row has `id`.
    async fn delete_user(&self, id: i64) -> Result<Option<User>, AcquisitionsError>;
    async fn close(&self);
}

pub mod in_memory;
pub mod sqlite;
