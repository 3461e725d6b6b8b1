use crate::core::errors::AcquisitionsError;
use crate::core::models::user::{NewUser, User, UserChanges};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<i64, User>,
    ids_by_email: HashMap<String, i64>,
}

/// Process-local store. One lock guards rows and the email index together so
/// the uniqueness check and the write happen atomically.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn insert_user(&self, user: NewUser) -> Result<User, AcquisitionsError> {
        let mut tables = self.tables.write().await;
        if tables.ids_by_email.contains_key(&user.email) {
            return Err(AcquisitionsError::DuplicateEmail(user.email));
        }
        tables.last_id += 1;
        let now = Utc::now();
        let stored = User {
            id: tables.last_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.ids_by_email.insert(stored.email.clone(), stored.id);
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_users(&self) -> Result<Vec<User>, AcquisitionsError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().cloned().collect())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AcquisitionsError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AcquisitionsError> {
        let tables = self.tables.read().await;
        Ok(tables
            .ids_by_email
            .get(email)
            .and_then(|id| tables.users.get(id).cloned()))
    }

    async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, AcquisitionsError> {
        let mut tables = self.tables.write().await;
        let Some(current) = tables.users.get(&id).cloned() else {
            return Ok(None);
        };

        if let Some(email) = &changes.email {
            if tables.ids_by_email.get(email).is_some_and(|owner| *owner != id) {
                return Err(AcquisitionsError::EmailConflict(email.clone()));
            }
        }

        let mut updated = current;
        if let Some(name) = changes.name {
            updated.name = name;
        }
        if let Some(email) = changes.email {
            if email != updated.email {
                tables.ids_by_email.remove(&updated.email);
                tables.ids_by_email.insert(email.clone(), id);
                updated.email = email;
            }
        }
        if let Some(password_hash) = changes.password_hash {
            updated.password_hash = password_hash;
        }
        if let Some(role) = changes.role {
            updated.role = role;
        }
        updated.updated_at = updated_at;

        tables.users.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_user(&self, id: i64) -> Result<Option<User>, AcquisitionsError> {
        let mut tables = self.tables.write().await;
        let removed = tables.users.remove(&id);
        if let Some(user) = &removed {
            tables.ids_by_email.remove(&user.email);
        }
        Ok(removed)
    }

    async fn close(&self) {}
}
