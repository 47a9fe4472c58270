//! Repository layer for user persistence.
//!
//! The service talks to the [`UserRepository`] capability only; PostgreSQL
//! and in-memory adapters implement it.

mod memory_user_repo;
mod user_repo;

pub use memory_user_repo::InMemoryUserRepository;
pub use user_repo::DieselUserRepository;

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::models::{NewUser, UpdateUser, User};

/// Persistence operations on users.
///
/// Each call runs in its own transaction: committed on success, rolled back
/// on failure.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user and returns it with the store-assigned id.
    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;

    /// Fails with `NotFound` when no row has `id`.
    async fn get_user_by_id(&self, id: i32) -> AppResult<User>;

    /// Every user in primary-key order.
    async fn get_all_users(&self) -> AppResult<Vec<User>>;

    /// A window of users in primary-key order plus the total row count.
    async fn get_users_page(&self, offset: i64, limit: i64) -> AppResult<(Vec<User>, i64)>;

    /// Writes only the provided fields.
    ///
    /// Rejects an update without fields and fails with `NotFound` when no
    /// row has the id.
    async fn update_user(&self, update: UpdateUser) -> AppResult<()>;

    /// Fails with `NotFound` when no row has `id`.
    async fn delete_user_by_id(&self, id: i32) -> AppResult<()>;
}

/// Aggregates the repositories handed to the service layer.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing `pool`.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool)),
        }
    }

    /// Process-local repositories that start empty.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }
}

pub(crate) fn empty_update_error() -> crate::error::AppError {
    crate::error::AppError::Validation {
        field: "user".to_string(),
        reason: "At least one of username, email or password must be provided".to_string(),
    }
}
