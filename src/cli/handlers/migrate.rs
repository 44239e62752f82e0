//! Migrate command handler

use crate::config::Settings;
use crate::db::{pending_migrations, revert_migrations, run_pending_migrations};

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Applies pending migrations, lists them (`dry_run`) or reverts `rollback` steps.
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> anyhow::Result<()> {
        self.config.database.validate()?;
        let url = self.config.database.url.as_str();

        if dry_run {
            let pending = pending_migrations(url).await?;
            if pending.is_empty() {
                println!("✓ No pending migrations, database is up to date");
            } else {
                println!("Found {} pending migration(s):", pending.len());
                print_list(&pending);
                println!("Run without --dry-run to apply them");
            }
            return Ok(());
        }

        if let Some(steps) = rollback {
            let reverted = revert_migrations(url, steps).await?;
            tracing::warn!(count = reverted.len(), "Migrations reverted");
            if reverted.is_empty() {
                println!("✓ No applied migrations to revert");
            } else {
                println!("✓ Reverted {} migration(s):", reverted.len());
                print_list(&reverted);
            }
            return Ok(());
        }

        let applied = run_pending_migrations(url).await?;
        tracing::info!(count = applied.len(), "Migrations applied");
        if applied.is_empty() {
            println!("✓ No migrations to apply, database is up to date");
        } else {
            println!("✓ Applied {} migration(s):", applied.len());
            print_list(&applied);
        }
        Ok(())
    }
}

fn print_list(names: &[String]) {
    for name in names {
        println!("  - {}", name);
    }
}
