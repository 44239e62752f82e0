//! Dispatches a parsed command to its handler

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;

/// Runs the selected subcommand with merged, validated settings.
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    match cli.subcommand() {
        Commands::Serve { dry_run, .. } => ServeCommandHandler::new(settings).execute(dry_run).await,
        Commands::Migrate { dry_run, rollback } => {
            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await
        }
    }
}
