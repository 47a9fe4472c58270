//! HTTP server lifecycle: storage setup, binding and graceful shutdown.

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::Settings;
use crate::db::{establish_async_connection_pool, run_migrations};
use crate::state::AppState;

pub struct Server {
    settings: Settings,
    in_memory: bool,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            in_memory: false,
        }
    }

    /// Serve from the in-memory store instead of PostgreSQL.
    pub fn with_in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    /// Start the server and run until a shutdown signal arrives.
    ///
    /// # Errors
    /// - pool initialization or startup migrations fail
    /// - the configured address cannot be bound
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            "Application starting"
        );
        tracing::info!(
            host = %self.settings.server.host,
            port = self.settings.server.port,
            request_timeout = self.settings.server.request_timeout,
            "Server configuration loaded"
        );

        let state = self.build_state().await?;
        let router = create_router(
            state,
            Duration::from_secs(self.settings.server.request_timeout),
        );

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    async fn build_state(&self) -> anyhow::Result<AppState> {
        if self.in_memory {
            tracing::warn!("Using the in-memory user store; data is lost on shutdown");
            return Ok(AppState::in_memory());
        }

        let database = &self.settings.database;
        tracing::info!(
            max_connections = database.max_connections,
            min_connections = database.min_connections,
            connection_timeout = database.connection_timeout,
            "Initializing database connection pool"
        );

        if database.auto_migrate {
            let applied = run_migrations(database.connection_url()).await?;
            tracing::info!(count = applied.len(), "Startup migrations applied");
        }

        let pool = establish_async_connection_pool(database).await?;
        tracing::info!("Database connection pool initialized");

        Ok(AppState::new(pool))
    }
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A signal handler that cannot be installed is logged and that branch never
/// fires, so the server keeps running on the remaining one.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
