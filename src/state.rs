//! Shared state handed to every axum handler.

use crate::db::AsyncDbPool;
use crate::repositories::Repositories;
use crate::services::Services;

/// Cloning is cheap: services hold `Arc`s and the pool is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// `None` when running on the in-memory store.
    pub db_pool: Option<AsyncDbPool>,
}

impl AppState {
    pub fn new(pool: AsyncDbPool) -> Self {
        let services = Services::new(Repositories::new(pool.clone()));
        Self {
            services,
            db_pool: Some(pool),
        }
    }

    /// State backed by the in-memory user store, used by `serve --in-memory`
    /// and the HTTP tests.
    pub fn in_memory() -> Self {
        Self::from_repositories(Repositories::in_memory())
    }

    pub fn from_repositories(repos: Repositories) -> Self {
        Self {
            services: Services::new(repos),
            db_pool: None,
        }
    }
}
