//! Player repository.
//!
//! Runs player queries against a [`PlayerStore`] and owns the transaction for
//! the composite player + planet creation. Store failures are classified into
//! the application error taxonomy here and nowhere else.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, AppResult, StoreError};
use crate::models::{Planet, Player};
use crate::repositories::store::{PlayerStore, PlayerTx};

/// Player repository holding a shared store handle.
///
/// Cloning is cheap (one `Arc` increment).
#[derive(Clone)]
pub struct PlayerRepository {
    store: Arc<dyn PlayerStore>,
}

impl PlayerRepository {
    /// Creates a new PlayerRepository over the given store.
    pub fn new(store: Arc<dyn PlayerStore>) -> Self {
        Self { store }
    }

    /// Lists every player, oldest first.
    ///
    /// # Returns
    /// An empty vector when no players exist
    pub async fn list_players(&self) -> AppResult<Vec<Player>> {
        let players = self.store.list_players().await.map_err(|e| {
            tracing::error!(error = ?e, "Failed to list players");
            AppError::internal("failed to retrieve players", e)
        })?;

        tracing::debug!(count = players.len(), "Listed players");
        Ok(players)
    }

    /// Gets a player by id.
    ///
    /// # Returns
    /// The player, or `NotFound` when no row matches
    pub async fn get_player_by_id(&self, id: Uuid) -> AppResult<Player> {
        let found = self.store.find_player(id).await.map_err(|e| {
            tracing::error!(player_id = %id, error = ?e, "Failed to load player");
            AppError::internal("failed to retrieve player", e)
        })?;

        match found {
            Some(player) => {
                tracing::debug!(player_id = %id, "Loaded player");
                Ok(player)
            }
            None => {
                tracing::debug!(player_id = %id, "Player not found");
                Err(AppError::not_found(
                    "player",
                    "player with given ID does not exist",
                ))
            }
        }
    }

    /// Creates a player and its first planet in one transaction.
    ///
    /// Inputs are expected to be normalized already. On any failure the
    /// transaction is rolled back and neither row persists.
    ///
    /// # Errors
    /// - `AlreadyExists` if the username is taken
    /// - `Internal` for every other storage failure
    pub async fn create_player_with_planet(
        &self,
        username: &str,
        planet_name: &str,
    ) -> AppResult<(Player, Planet)> {
        let mut tx = self.store.begin().await.map_err(|e| {
            tracing::error!(error = ?e, "Failed to begin transaction");
            AppError::internal("failed to start transaction", e)
        })?;

        let player = match tx.insert_player(username).await {
            Ok(player) => player,
            Err(e) => {
                let error = Self::classify_player_insert(username, e);
                Self::rollback_quietly(tx).await;
                return Err(error);
            }
        };

        let planet = match tx.insert_planet(player.id, planet_name).await {
            Ok(planet) => planet,
            Err(e) => {
                tracing::error!(player_id = %player.id, error = ?e, "Failed to insert planet");
                Self::rollback_quietly(tx).await;
                return Err(AppError::internal("failed to create planet", e));
            }
        };

        if let Err(e) = tx.commit().await {
            tracing::error!(player_id = %player.id, error = ?e, "Failed to commit player and planet");
            // The handle is consumed by commit; the store discards the
            // transaction on its side.
            return Err(if e.is_unique_violation() {
                Self::classify_player_insert(username, e)
            } else {
                AppError::internal("failed to save player and planet", e)
            });
        }

        tracing::info!(
            player_id = %player.id,
            planet_id = %planet.id,
            username = %player.username,
            "Created player with planet"
        );
        Ok((player, planet))
    }

    fn classify_player_insert(username: &str, error: StoreError) -> AppError {
        if error.is_unique_violation() {
            tracing::debug!(username, "Username already taken");
            AppError::already_exists("player", "player with this username already exists")
        } else {
            tracing::error!(username, error = ?error, "Failed to insert player");
            AppError::internal("failed to create player", error)
        }
    }

    /// Rolls back, logging but never surfacing a rollback failure so the
    /// original error wins.
    async fn rollback_quietly(tx: Box<dyn PlayerTx>) {
        if let Err(e) = tx.rollback().await {
            tracing::error!(error = ?e, "Failed to roll back transaction");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory_store::{FailPoint, MemoryPlayerStore};

    fn repo_with_store() -> (PlayerRepository, MemoryPlayerStore) {
        let store = MemoryPlayerStore::new();
        (PlayerRepository::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_create_links_planet_to_player() {
        let (repo, _store) = repo_with_store();

        let (player, planet) = repo.create_player_with_planet("nova", "Terra").await.unwrap();

        assert_eq!(planet.player_id, player.id);
        assert_eq!(repo.get_player_by_id(player.id).await.unwrap(), player);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_already_exists() {
        let (repo, store) = repo_with_store();
        repo.create_player_with_planet("nova", "Terra").await.unwrap();

        let err = repo
            .create_player_with_planet("nova", "Mars")
            .await
            .unwrap_err();

        assert_eq!(err.code(), "ALREADY_EXISTS");
        assert_eq!(err.public_message(), "player already exists");
        assert_eq!(err.details(), Some("player with this username already exists"));
        assert_eq!(store.players().len(), 1);
        assert_eq!(store.planets().len(), 1);
        assert_eq!(store.rollback_count(), 1);
    }

    #[tokio::test]
    async fn test_planet_failure_rolls_back_player() {
        let (repo, store) = repo_with_store();
        store.fail_on(FailPoint::InsertPlanet);

        let err = repo
            .create_player_with_planet("nova", "Terra")
            .await
            .unwrap_err();

        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert_eq!(err.public_message(), "failed to create planet");
        assert!(store.players().is_empty());
        assert!(store.planets().is_empty());
        assert_eq!(store.rollback_count(), 1);
    }

    #[tokio::test]
    async fn test_commit_failure_leaves_no_rows() {
        let (repo, store) = repo_with_store();
        store.fail_on(FailPoint::Commit);

        let err = repo
            .create_player_with_planet("nova", "Terra")
            .await
            .unwrap_err();

        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert_eq!(err.public_message(), "failed to save player and planet");
        assert!(store.players().is_empty());
        assert!(store.planets().is_empty());
    }

    #[tokio::test]
    async fn test_rollback_failure_does_not_mask_original_error() {
        let (repo, store) = repo_with_store();
        store.fail_on(FailPoint::InsertPlanet);
        store.fail_on(FailPoint::Rollback);

        let err = repo
            .create_player_with_planet("nova", "Terra")
            .await
            .unwrap_err();

        assert_eq!(err.public_message(), "failed to create planet");
        assert!(store.players().is_empty());
    }

    #[tokio::test]
    async fn test_player_insert_failure_is_internal() {
        let (repo, store) = repo_with_store();
        store.fail_on(FailPoint::InsertPlayer);

        let err = repo
            .create_player_with_planet("nova", "Terra")
            .await
            .unwrap_err();

        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert_eq!(err.public_message(), "failed to create player");
        assert_eq!(store.rollback_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_player_is_not_found() {
        let (repo, _store) = repo_with_store();

        let err = repo.get_player_by_id(Uuid::new_v4()).await.unwrap_err();

        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.public_message(), "player not found");
        assert_eq!(err.details(), Some("player with given ID does not exist"));
    }

    #[tokio::test]
    async fn test_find_failure_is_internal() {
        let (repo, store) = repo_with_store();
        store.fail_on(FailPoint::FindPlayer);

        let err = repo.get_player_by_id(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_list_players_empty_and_idempotent() {
        let (repo, _store) = repo_with_store();
        assert!(repo.list_players().await.unwrap().is_empty());

        repo.create_player_with_planet("nova", "Terra").await.unwrap();
        repo.create_player_with_planet("orion", "Belt").await.unwrap();

        let first = repo.list_players().await.unwrap();
        let second = repo.list_players().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_list_failure_is_internal() {
        let (repo, store) = repo_with_store();
        store.fail_on(FailPoint::ListPlayers);

        let err = repo.list_players().await.unwrap_err();
        assert_eq!(err.public_message(), "failed to retrieve players");
    }
}
