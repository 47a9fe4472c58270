//! HTTP layer: handlers, middleware, DTOs and the mapping between DTOs and
//! persisted models.

pub mod doc;
pub mod dto;
pub mod handlers;
pub mod mapper;
pub mod middleware;
pub mod routes;
