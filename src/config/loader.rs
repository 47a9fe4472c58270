//! Configuration loader.
//!
//! All environment lookups go through the variable map held by the loader,
//! so tests can supply their own map instead of mutating the process
//! environment.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, Map};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_ENV: &str = "REFSTUDY_CONFIG_DIR";

const CONFIG_FILE_ENV: &str = "REFSTUDY_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Prefix for `REFSTUDY_SERVER__PORT` style overrides
const ENV_PREFIX: &str = "REFSTUDY";

const ENV_SEPARATOR: &str = "__";

/// Deployment variables applied after everything else.
const LEGACY_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_HOST", "database.host"),
    ("DATABASE_PORT", "database.port"),
    ("DATABASE_USER", "database.user"),
    ("DATABASE_PASSWORD", "database.password"),
    ("DATABASE_NAME", "database.name"),
    ("SERVER_PORT", "server.port"),
    ("LOG_LEVEL", "logger.level"),
];

type Builder = ConfigBuilder<DefaultState>;

/// Loads [`Settings`] from files and environment variables.
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// Single-file mode when set
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
    vars: Map<String, String>,
}

impl ConfigLoader {
    /// Create a loader from the process environment.
    ///
    /// # Errors
    ///
    /// Fails if both `REFSTUDY_CONFIG_DIR` and `REFSTUDY_CONFIG_FILE` are set
    /// or `REFSTUDY_APP_ENV` names an unknown environment.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Create a loader that reads variables from `vars` only.
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let config_dir = lookup(CONFIG_DIR_ENV);
        let config_file = lookup(CONFIG_FILE_ENV).map(PathBuf::from);

        if config_file.is_some() && config_dir.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "REFSTUDY_CONFIG_DIR and REFSTUDY_CONFIG_FILE cannot both be set. \
                 Use REFSTUDY_CONFIG_DIR for layered configuration or \
                 REFSTUDY_CONFIG_FILE for a single configuration file.",
            ));
        }

        let environment = AppEnvironment::from_lookup(lookup)?;

        Ok(Self {
            config_dir: config_dir
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment,
            vars,
        })
    }

    /// Use a single configuration file, as `--config` does.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Override the environment layer, as `--env` does.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load and validate settings from every source.
    ///
    /// # Errors
    ///
    /// - `default.toml` (or the single config file) is missing
    /// - a source fails to parse or deserialize
    /// - the merged settings fail validation
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match &self.config_file {
            Some(config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        let builder = self.add_env_source(builder);
        let builder = self.add_legacy_overrides(builder)?;

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(&self, builder: Builder) -> Result<Builder, ConfigError> {
        let builder = Self::add_file_source(builder, &self.config_dir.join("default.toml"), true)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = Self::add_file_source(builder, &env_path, false)?;

        Self::add_file_source(builder, &self.config_dir.join("local.toml"), false)
    }

    fn add_file_source(builder: Builder, path: &Path, required: bool) -> Result<Builder, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        Ok(builder.add_source(
            File::new(&path.to_string_lossy(), FileFormat::Toml).required(required),
        ))
    }

    /// `REFSTUDY_DATABASE__MAX_CONNECTIONS` maps to `database.max_connections`.
    fn add_env_source(&self, builder: Builder) -> Builder {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true)
                .source(Some(self.vars.clone())),
        )
    }

    fn add_legacy_overrides(&self, mut builder: Builder) -> Result<Builder, ConfigError> {
        for (var, key) in LEGACY_OVERRIDES {
            let value = self.vars.get(*var).filter(|v| !v.is_empty()).cloned();
            builder = builder.set_override_option(*key, value)?;
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DEFAULT_TOML: &str = r#"
[application]
name = "refstudy"

[server]
host = "127.0.0.1"
port = 8080

[database]
host = "localhost"
port = 5432
user = "postgres"
name = "refstudy"

[logger]
level = "info"
"#;

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    fn vars(dir: &TempDir, extra: &[(&str, &str)]) -> Map<String, String> {
        let mut vars = Map::new();
        vars.insert(
            CONFIG_DIR_ENV.to_string(),
            dir.path().to_string_lossy().into_owned(),
        );
        for (key, value) in extra {
            vars.insert(key.to_string(), value.to_string());
        }
        vars
    }

    #[test]
    fn test_defaults_without_variables() {
        let loader = ConfigLoader::from_vars(Map::new()).unwrap();
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_mutual_exclusivity_error() {
        let mut vars = Map::new();
        vars.insert(CONFIG_DIR_ENV.to_string(), "/custom".to_string());
        vars.insert(CONFIG_FILE_ENV.to_string(), "/custom/app.toml".to_string());

        match ConfigLoader::from_vars(vars) {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains("REFSTUDY_CONFIG_DIR"));
                assert!(msg.contains("REFSTUDY_CONFIG_FILE"));
            }
            other => panic!("Expected MutualExclusivityError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_default_toml() {
        let dir = setup_config_dir(&[]);
        let loader = ConfigLoader::from_vars(vars(&dir, &[])).unwrap();

        match loader.load() {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("default.toml")),
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_environment_layer_overrides_default() {
        let dir = setup_config_dir(&[
            ("default.toml", DEFAULT_TOML),
            ("production.toml", "[server]\nhost = \"0.0.0.0\"\n"),
        ]);
        let loader = ConfigLoader::from_vars(vars(&dir, &[("REFSTUDY_APP_ENV", "production")]))
            .unwrap();

        let settings = loader.load().unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn test_local_layer_overrides_environment_layer() {
        let dir = setup_config_dir(&[
            ("default.toml", DEFAULT_TOML),
            ("development.toml", "[server]\nport = 9000\n"),
            ("local.toml", "[server]\nport = 9100\n"),
        ]);
        let settings = ConfigLoader::from_vars(vars(&dir, &[]))
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(settings.server.port, 9100);
    }

    #[test]
    fn test_prefixed_variables_override_files() {
        let dir = setup_config_dir(&[("default.toml", DEFAULT_TOML)]);
        let settings = ConfigLoader::from_vars(vars(
            &dir,
            &[
                ("REFSTUDY_SERVER__PORT", "9200"),
                ("REFSTUDY_DATABASE__MAX_CONNECTIONS", "40"),
            ],
        ))
        .unwrap()
        .load()
        .unwrap();

        assert_eq!(settings.server.port, 9200);
        assert_eq!(settings.database.max_connections, 40);
    }

    #[test]
    fn test_legacy_variables_win() {
        let dir = setup_config_dir(&[("default.toml", DEFAULT_TOML)]);
        let settings = ConfigLoader::from_vars(vars(
            &dir,
            &[
                ("REFSTUDY_SERVER__PORT", "9200"),
                ("SERVER_PORT", "7000"),
                ("DATABASE_HOST", "db.internal"),
                ("DATABASE_PORT", "6543"),
                ("DATABASE_USER", "svc"),
                ("DATABASE_PASSWORD", "pw"),
                ("DATABASE_NAME", "users"),
                ("LOG_LEVEL", "prod"),
            ],
        ))
        .unwrap()
        .load()
        .unwrap();

        assert_eq!(settings.server.port, 7000);
        assert_eq!(settings.database.host, "db.internal");
        assert_eq!(settings.database.port, 6543);
        assert_eq!(settings.database.user, "svc");
        assert_eq!(settings.database.password, "pw");
        assert_eq!(settings.database.name, "users");
        assert_eq!(settings.logger.level, "prod");
    }

    #[test]
    fn test_single_file_mode() {
        let dir = setup_config_dir(&[("custom.toml", "[server]\nport = 9300\n")]);
        let settings = ConfigLoader::from_vars(Map::new())
            .unwrap()
            .with_config_file(dir.path().join("custom.toml"))
            .load()
            .unwrap();

        assert_eq!(settings.server.port, 9300);
        assert_eq!(settings.database.max_connections, 25);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let dir = setup_config_dir(&[("default.toml", "[server]\nport = 0\n")]);
        let result = ConfigLoader::from_vars(vars(&dir, &[])).unwrap().load();

        match result {
            Err(ConfigError::ValidationError { field, .. }) => assert_eq!(field, "server.port"),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }
}
