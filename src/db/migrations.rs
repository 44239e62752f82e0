//! Embedded schema migrations.
//!
//! Migrations run on a dedicated blocking `PgConnection` because
//! `MigrationHarness` is synchronous.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{StoreError, StoreResult};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies pending migrations, returning the applied versions.
pub async fn run_pending_migrations(database_url: &str) -> StoreResult<Vec<String>> {
    with_migration_connection(database_url, "run pending migrations", |conn| {
        let applied = conn.run_pending_migrations(MIGRATIONS)?;
        Ok(applied.iter().map(ToString::to_string).collect())
    })
    .await
}

/// Lists migrations that have not been applied yet.
pub async fn pending_migrations(database_url: &str) -> StoreResult<Vec<String>> {
    with_migration_connection(database_url, "list pending migrations", |conn| {
        let pending = conn.pending_migrations(MIGRATIONS)?;
        Ok(pending.iter().map(|m| m.name().to_string()).collect())
    })
    .await
}

/// Reverts the `steps` most recent migrations, stopping early when none remain.
pub async fn revert_migrations(database_url: &str, steps: u32) -> StoreResult<Vec<String>> {
    with_migration_connection(database_url, "revert migrations", move |conn| {
        let mut reverted = Vec::new();
        for _ in 0..steps {
            if conn.applied_migrations()?.is_empty() {
                break;
            }
            reverted.push(conn.revert_last_migration(MIGRATIONS)?.to_string());
        }
        Ok(reverted)
    })
    .await
}

async fn with_migration_connection<F>(
    database_url: &str,
    operation: &'static str,
    f: F,
) -> StoreResult<Vec<String>>
where
    F: FnOnce(&mut PgConnection) -> diesel::migration::Result<Vec<String>> + Send + 'static,
{
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url).map_err(|e| StoreError::Connection {
            source: anyhow::Error::from(e),
        })?;

        f(&mut conn).map_err(|e| StoreError::query(operation, anyhow::anyhow!("{}", e)))
    })
    .await
    .map_err(|e| StoreError::query(operation, e))?
}
