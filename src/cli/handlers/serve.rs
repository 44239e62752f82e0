//! Serve command handler

use crate::config::Settings;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Runs the server, or only reports the effective configuration when `dry_run` is set.
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            return self.validate_only();
        }

        Server::new(self.config).run().await
    }

    fn validate_only(&self) -> anyhow::Result<()> {
        self.config.validate()?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!(
            "✓ Request timeout: {}s",
            self.config.server.request_timeout
        );
        println!(
            "✓ Database pool: {}..{} connections, auto_migrate = {}",
            self.config.database.min_connections,
            self.config.database.max_connections,
            self.config.database.auto_migrate
        );
        println!("✓ Log level: {}", self.config.logger.level);
        println!("Dry run completed successfully");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
