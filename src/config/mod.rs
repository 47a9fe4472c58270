//! Layered configuration.
//!
//! # Priority (lowest to highest)
//! 1. `default.toml`
//! 2. `{environment}.toml`
//! 3. `local.toml`
//! 4. `REFSTUDY_*` environment variables
//! 5. The deployment variables `DATABASE_*`, `SERVER_PORT` and `LOG_LEVEL`

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{DatabaseConfig, LoggerSettings, ServerConfig, Settings};
