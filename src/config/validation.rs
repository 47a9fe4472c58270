//! Range and format checks for loaded settings.

use crate::config::error::ConfigError;
use crate::config::settings::{DatabaseConfig, LoggerSettings, ServerConfig, Settings};
use crate::logger::parse_level;

const VALID_URL_SCHEMES: &[&str] = &["postgres://", "postgresql://"];

impl ServerConfig {
    /// Port must be non-zero and the request timeout positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - A non-empty `url` must use the postgres scheme
    /// - Without a `url`, host and database name are required
    /// - Max connections must be greater than 0 and not below min connections
    /// - Connection timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.url.is_empty() {
            if !VALID_URL_SCHEMES.iter().any(|s| self.url.starts_with(s)) {
                return Err(ConfigError::validation(
                    "database.url",
                    "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
                ));
            }
        } else {
            if self.host.trim().is_empty() {
                return Err(ConfigError::validation(
                    "database.host",
                    "Database host is required when database.url is not set.",
                ));
            }
            if self.name.trim().is_empty() {
                return Err(ConfigError::validation(
                    "database.name",
                    "Database name is required when database.url is not set.",
                ));
            }
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_level(&self.level).map_err(|e| ConfigError::ValidationError {
            field: "logger.level".to_string(),
            message: e.to_string(),
        })?;

        // Converting runs the format, path and rotation checks.
        self.clone().into_logger_config()?;
        Ok(())
    }
}

impl Settings {
    /// Returns the first validation error found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}
