//! HTTP server lifecycle: wiring, startup and graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::Settings;
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::repositories::PgPlayerStore;
use crate::state::AppState;

pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Connects to the database, optionally migrates, then serves until
    /// Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// - the initial database connection fails
    /// - automatic migration fails
    /// - the listen address cannot be bound
    pub async fn run(self) -> anyhow::Result<()> {
        let Settings {
            application,
            server,
            database,
            logger,
        } = self.settings;

        tracing::info!(
            app_name = %application.name,
            app_version = %application.version,
            "Application starting"
        );
        tracing::info!(
            host = %server.host,
            port = server.port,
            request_timeout = server.request_timeout,
            "Server configuration loaded"
        );
        // The URL may carry credentials and is never logged
        tracing::info!(
            max_connections = database.max_connections,
            min_connections = database.min_connections,
            connection_timeout = database.connection_timeout,
            auto_migrate = database.auto_migrate,
            "Database configuration loaded"
        );
        tracing::info!(
            level = %logger.level,
            console_enabled = logger.console.enabled,
            file_enabled = logger.file.enabled,
            "Logger configuration loaded"
        );

        let pool = establish_async_connection_pool(&database)
            .await
            .context("Failed to connect to the database")?;

        if database.auto_migrate {
            let applied = run_pending_migrations(&database.url)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!(count = applied.len(), migrations = ?applied, "Migrations applied");
        }

        let state = AppState::new(Arc::new(PgPlayerStore::new(pool)));
        let router = create_router(state, Duration::from_secs(server.request_timeout));

        let address = server.address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind to {}", address))?;
        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Resolves on Ctrl+C or SIGTERM. A signal handler that cannot be installed
/// is logged and never fires.
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
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
