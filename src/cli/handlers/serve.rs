//! `serve` command.

use crate::config::Settings;
use crate::server::Server;

pub struct ServeCommandHandler {
    settings: Settings,
    in_memory: bool,
}

impl ServeCommandHandler {
    pub fn new(settings: Settings, in_memory: bool) -> Self {
        Self {
            settings,
            in_memory,
        }
    }

    /// Runs the server, or only validates configuration when `dry_run` is set.
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            return self.validate_only();
        }
        Server::new(self.settings)
            .with_in_memory(self.in_memory)
            .run()
            .await
    }

    fn validate_only(&self) -> anyhow::Result<()> {
        self.settings.validate()?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.settings.server.address());
        if self.in_memory {
            println!("✓ Storage: in-memory");
        } else {
            println!(
                "✓ Storage: PostgreSQL (pool {}..{}, auto migrate: {})",
                self.settings.database.min_connections,
                self.settings.database.max_connections,
                self.settings.database.auto_migrate
            );
        }
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
