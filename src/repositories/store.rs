//! Storage ports used by the repository layer.
//!
//! The repository owns transaction flow and error classification; adapters
//! only execute statements. Any type implementing these traits can back the
//! service, which is how the in-memory store stands in for PostgreSQL in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{Planet, Player};

/// Read access plus the ability to open a write transaction.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// All players ordered by creation time, ties broken by id.
    async fn list_players(&self) -> StoreResult<Vec<Player>>;

    /// Single player lookup; `Ok(None)` when no row matches.
    async fn find_player(&self, id: Uuid) -> StoreResult<Option<Player>>;

    /// Opens a transaction. Dropping the handle without committing must leave
    /// no writes behind.
    async fn begin(&self) -> StoreResult<Box<dyn PlayerTx>>;

    /// Round-trip used by readiness checks.
    async fn ping(&self) -> StoreResult<()>;
}

/// Writes scoped to one open transaction.
#[async_trait]
pub trait PlayerTx: Send {
    async fn insert_player(&mut self, username: &str) -> StoreResult<Player>;

    async fn insert_planet(&mut self, player_id: Uuid, name: &str) -> StoreResult<Planet>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}
