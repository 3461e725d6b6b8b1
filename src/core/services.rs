use crate::auth::password::PasswordHasher;
use crate::core::errors::AcquisitionsError;
use crate::core::models::user::{NewUser, Role, UserChanges, UserSummary, UserView};
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fields an update may carry, with the password still in plain text.
#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Registration and credential checks.
pub struct AuthService {
    storage: Arc<dyn Storage>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(storage: Arc<dyn Storage>, hasher: PasswordHasher) -> Self {
        AuthService { storage, hasher }
    }

    /// Hashes the password and inserts the account. A taken email comes back
    /// from the store as `DuplicateEmail`; nothing is written in that case.
    pub async fn create_user(
        &self,
        name: String,
        email: String,
        password: &str,
        role: Role,
    ) -> Result<UserSummary, AcquisitionsError> {
        let password_hash = self.hasher.hash(password)?;
        let user = self
            .storage
            .insert_user(NewUser {
                name,
                email,
                password_hash,
                role,
            })
            .await
            .inspect_err(|e| warn!("Unable to create user: {}", e))?;

        info!("User {} created with id {}", user.email, user.id);
        Ok(user.into())
    }

    pub async fn authenticate_user(&self, email: &str, password: &str) -> Result<UserSummary, AcquisitionsError> {
        let user = self
            .storage
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| AcquisitionsError::UserNotFound(email.to_string()))?;

        if !self.hasher.verify(password, &user.password_hash)? {
            warn!("Password mismatch for {}", email);
            return Err(AcquisitionsError::InvalidCredentials);
        }

        info!("User {} authenticated", user.email);
        Ok(user.into())
    }
}

/// Reads and writes on existing accounts. Every result is password-free.
pub struct UserService {
    storage: Arc<dyn Storage>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(storage: Arc<dyn Storage>, hasher: PasswordHasher) -> Self {
        UserService { storage, hasher }
    }

    pub async fn get_all_users(&self) -> Result<Vec<UserView>, AcquisitionsError> {
        let users = self
            .storage
            .list_users()
            .await
            .inspect_err(|e| error!("Error getting users: {}", e))?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<UserView, AcquisitionsError> {
        self.storage
            .get_user(id)
            .await
            .inspect_err(|e| error!("Unable to retrieve user by id {}: {}", id, e))?
            .map(UserView::from)
            .ok_or(AcquisitionsError::NotFound(id))
    }

    /// Applies a partial update and refreshes `updated_at`. Moving to an email
    /// owned by another account fails with `EmailConflict`; keeping one's own
    /// email is not a conflict.
    pub async fn update_user(&self, id: i64, update: UserUpdate) -> Result<UserView, AcquisitionsError> {
        let password_hash = update
            .password
            .as_deref()
            .map(|password| self.hasher.hash(password))
            .transpose()?;
        let changes = UserChanges {
            name: update.name,
            email: update.email,
            password_hash,
            role: update.role,
        };

        let updated = self
            .storage
            .update_user(id, changes, Utc::now())
            .await
            .inspect_err(|e| warn!("Unable to update user by id {}: {}", id, e))?
            .ok_or(AcquisitionsError::NotFound(id))?;

        info!("User {} updated successfully", updated.email);
        Ok(updated.into())
    }

    pub async fn delete_user(&self, id: i64) -> Result<UserSummary, AcquisitionsError> {
        let deleted = self
            .storage
            .delete_user(id)
            .await
            .inspect_err(|e| error!("Error deleting user {}: {}", id, e))?
            .ok_or(AcquisitionsError::NotFound(id))?;

        info!("User {} deleted successfully", deleted.email);
        Ok(deleted.into())
    }
}
