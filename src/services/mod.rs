//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

mod player_service;

pub use player_service::{PlayerService, normalize_planet_name, normalize_username};

use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap since the underlying store is shared through an `Arc`.
#[derive(Clone)]
pub struct Services {
    pub players: PlayerService,
}

impl Services {
    /// Creates a new Services instance from Repositories.
    pub fn new(repos: Repositories) -> Self {
        Self {
            players: PlayerService::new(repos.players),
        }
    }
}
