//! Service layer.
//!
//! Services sit between the HTTP handlers and the repositories and speak in
//! DTOs on their public side.

mod user_service;

pub use user_service::UserService;

use crate::repositories::Repositories;

/// Aggregates all services for the application state.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
}

impl Services {
    pub fn new(repos: Repositories) -> Self {
        Self {
            users: UserService::new(repos.users),
        }
    }
}
