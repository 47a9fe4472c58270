//! Command-line entry point: configuration loading, logger setup and
//! dispatch to the `serve` and `migrate` handlers.

pub mod handlers;
pub mod parser;
pub mod validation;

pub use parser::{Cli, Commands};

use crate::config::{ConfigLoader, Settings};
use crate::logger::{LogLevelHandle, init_logger};
use handlers::{MigrateCommandHandler, ServeCommandHandler};

/// Loads settings for `cli`, applying `--config`, `--env` and the `serve`
/// host and port overrides.
pub fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut loader = ConfigLoader::new()?;
    if let Some(path) = &cli.config {
        loader = loader.with_config_file(path.clone());
    }
    if let Some(environment) = cli.env {
        loader = loader.with_environment(environment);
    }

    let mut settings = loader.load()?;
    if let Commands::Serve { host, port, .. } = cli.command_or_default() {
        if let Some(host) = host {
            settings.server.host = host;
        }
        if let Some(port) = port {
            settings.server.port = port;
        }
    }
    Ok(settings)
}

fn init_logging(cli: &Cli, settings: &Settings) -> anyhow::Result<LogLevelHandle> {
    let handle = init_logger(settings.logger.clone().into_logger_config()?)?;
    if let Some(level) = cli.log_level_override() {
        handle.set_level(level)?;
    }
    Ok(handle)
}

/// Runs the parsed command line to completion.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(&cli)?;
    let _log_handle = init_logging(&cli, &settings)?;

    match cli.command_or_default() {
        Commands::Serve {
            dry_run, in_memory, ..
        } => {
            ServeCommandHandler::new(settings, in_memory)
                .execute(dry_run)
                .await
        }
        Commands::Migrate { dry_run, rollback } => {
            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await?;
            Ok(())
        }
    }
}
