pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::api::{AppState, app};
pub use crate::core::errors::AcquisitionsError;
pub use crate::infrastructure::storage::{Storage, in_memory::InMemoryStorage, sqlite::SqliteStorage};

#[cfg(test)]
mod tests;
