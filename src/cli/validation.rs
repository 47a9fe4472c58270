//! Value parsers for CLI arguments.

use std::path::PathBuf;

use crate::config::Environment;

pub fn validate_port(value: &str) -> Result<u16, String> {
    let port: u16 = value
        .parse()
        .map_err(|_| format!("Port must be a number between 1 and 65535, got: '{}'", value))?;

    if port == 0 {
        return Err("Port must be between 1 and 65535".to_string());
    }
    Ok(port)
}

/// The file must exist; its contents are checked when configuration loads.
pub fn validate_config_file_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.is_file() {
        return Err(format!("Configuration file does not exist: '{}'", value));
    }
    Ok(path)
}

pub fn validate_rollback_steps(value: &str) -> Result<u32, String> {
    let steps: u32 = value
        .parse()
        .map_err(|_| format!("Rollback steps must be a positive number, got: '{}'", value))?;

    match steps {
        0 => Err("Rollback steps must be greater than 0".to_string()),
        101.. => Err("Rollback steps cannot exceed 100".to_string()),
        _ => Ok(steps),
    }
}

pub fn validate_host_address(value: &str) -> Result<String, String> {
    let host = value.trim();
    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }
    if host.chars().any(char::is_whitespace) {
        return Err("Host address cannot contain whitespace".to_string());
    }
    Ok(host.to_string())
}

pub fn parse_environment(value: &str) -> Result<Environment, String> {
    value.parse().map_err(|e: crate::config::ConfigError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_port() {
        assert_eq!(validate_port("8080"), Ok(8080));
        assert!(validate_port("0").is_err());
        assert!(validate_port("65536").is_err());
        assert!(validate_port("http").is_err());
    }

    #[test]
    fn test_validate_rollback_steps() {
        assert_eq!(validate_rollback_steps("1"), Ok(1));
        assert_eq!(validate_rollback_steps("100"), Ok(100));
        assert!(validate_rollback_steps("0").is_err());
        assert!(validate_rollback_steps("101").is_err());
        assert!(validate_rollback_steps("-1").is_err());
    }

    #[test]
    fn test_validate_host_address() {
        assert_eq!(validate_host_address(" 0.0.0.0 "), Ok("0.0.0.0".to_string()));
        assert!(validate_host_address("").is_err());
        assert!(validate_host_address("local host").is_err());
    }

    #[test]
    fn test_validate_config_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("app.toml");
        std::fs::write(&file, "[server]\nport = 9000\n").unwrap();

        assert_eq!(
            validate_config_file_path(file.to_str().unwrap()),
            Ok(file.clone())
        );
        assert!(validate_config_file_path(dir.path().to_str().unwrap()).is_err());
        assert!(validate_config_file_path("/definitely/missing.toml").is_err());
    }
}
