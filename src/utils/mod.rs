//! Request extractors shared by the handlers.

pub mod validate;

pub use validate::{ApiPath, ApiQuery, ValidatedJson};
