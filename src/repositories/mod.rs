//! Repository layer for data access operations.
//!
//! `store` defines the narrow persistence ports; `PgPlayerStore` and
//! `MemoryPlayerStore` implement them, and `PlayerRepository` drives them.

mod memory_store;
mod pg_store;
mod player_repo;
mod store;

pub use memory_store::{FailPoint, MemoryPlayerStore};
pub use pg_store::PgPlayerStore;
pub use player_repo::PlayerRepository;
pub use store::{PlayerStore, PlayerTx};

use std::sync::Arc;

/// Aggregates all repositories for convenient access.
///
/// Cloning is cheap since the store is shared through an `Arc`.
#[derive(Clone)]
pub struct Repositories {
    pub players: PlayerRepository,
}

impl Repositories {
    /// Creates a new Repositories instance over the given store.
    pub fn new(store: Arc<dyn PlayerStore>) -> Self {
        Self {
            players: PlayerRepository::new(store),
        }
    }
}
