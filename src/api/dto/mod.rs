//! Data Transfer Objects for API requests and responses.

mod error;
mod health;
mod pagination;
mod user;

pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest, PaginationParams};
pub use user::{CreateUserDto, PaginatedUsersDto, UpdateUserDto, UserDto};
