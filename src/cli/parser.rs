//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Environment;

/// User records over HTTP backed by PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "refstudy")]
#[command(long_about = "
refstudy serves create, read, update, delete and paged listing of user records
over HTTP, backed by PostgreSQL with embedded schema migrations.

EXAMPLES:
    # Start the server with layered configuration from ./config
    refstudy serve

    # Bind to all interfaces on port 9000
    refstudy serve --host 0.0.0.0 --port 9000

    # Try the API without a database
    refstudy serve --in-memory

    # Check configuration without starting the server
    refstudy --config /etc/refstudy/production.toml serve --dry-run

    # Apply, preview or revert migrations
    refstudy migrate
    refstudy migrate --dry-run
    refstudy migrate --rollback 1
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Load this single TOML file instead of the layered config directory
    #[arg(short, long, value_name = "FILE", global = true, value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Environment layer to load (development, test, staging, production)
    #[arg(short, long, global = true, value_parser = super::validation::parse_environment)]
    pub env: Option<Environment>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log warnings and errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the web server (default)
    Serve {
        /// Address to bind, overriding server.host
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port to listen on, overriding server.port
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,

        /// Keep users in process memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },
    /// Apply, preview or revert database migrations
    Migrate {
        /// List pending migrations without applying them
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Revert the most recent N migrations
        #[arg(long, value_name = "STEPS", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

impl Cli {
    /// The subcommand to run, `serve` when none was given.
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            host: None,
            port: None,
            dry_run: false,
            in_memory: false,
        })
    }

    /// Level forced by `--verbose` or `--quiet`.
    pub fn log_level_override(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("warn")
        } else {
            None
        }
    }
}
