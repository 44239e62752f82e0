//! Player service for business logic operations.
//!
//! Normalizes user input and shapes repository results into the views the
//! API returns. Errors from the repository pass through unchanged.

use uuid::Uuid;

use crate::api::dto::{CreatePlayerResponse, PlanetView, PlayerView};
use crate::error::AppResult;
use crate::repositories::PlayerRepository;

/// Usernames are case-insensitive and stored lowercased.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Planet names keep their capitalization.
pub fn normalize_planet_name(raw: &str) -> String {
    raw.trim().to_string()
}

/// Player service wrapping the `PlayerRepository`.
#[derive(Clone)]
pub struct PlayerService {
    repo: PlayerRepository,
}

impl PlayerService {
    /// Creates a new PlayerService with the given repository.
    pub fn new(repo: PlayerRepository) -> Self {
        Self { repo }
    }

    /// Registers a player together with their first planet.
    ///
    /// # Errors
    /// `AlreadyExists` when the normalized username is taken
    pub async fn create_player_with_planet(
        &self,
        username: &str,
        planet_name: &str,
    ) -> AppResult<CreatePlayerResponse> {
        let username = normalize_username(username);
        let planet_name = normalize_planet_name(planet_name);

        let (player, planet) = self
            .repo
            .create_player_with_planet(&username, &planet_name)
            .await?;

        Ok(CreatePlayerResponse {
            player: PlayerView::from(player),
            planet: PlanetView::from(planet),
        })
    }

    pub async fn get_all_players(&self) -> AppResult<Vec<PlayerView>> {
        let players = self.repo.list_players().await?;
        Ok(players.into_iter().map(PlayerView::from).collect())
    }

    pub async fn get_player_by_id(&self, id: Uuid) -> AppResult<PlayerView> {
        self.repo.get_player_by_id(id).await.map(PlayerView::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryPlayerStore;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn service() -> (PlayerService, MemoryPlayerStore) {
        let store = MemoryPlayerStore::new();
        let repo = PlayerRepository::new(Arc::new(store.clone()));
        (PlayerService::new(repo), store)
    }

    #[tokio::test]
    async fn test_create_normalizes_inputs() {
        let (service, store) = service();

        let created = service
            .create_player_with_planet("  Nova  ", " Terra ")
            .await
            .unwrap();

        assert_eq!(created.player.username, "nova");
        assert_eq!(created.planet.name, "Terra");
        assert_eq!(created.planet.player_id, created.player.id);
        assert_eq!(store.players()[0].username, "nova");
        assert_eq!(store.planets()[0].name, "Terra");
    }

    #[tokio::test]
    async fn test_duplicate_after_normalization() {
        let (service, store) = service();
        service.create_player_with_planet("nova", "Terra").await.unwrap();

        let err = service
            .create_player_with_planet(" NOVA ", "Mars")
            .await
            .unwrap_err();

        assert_eq!(err.code(), "ALREADY_EXISTS");
        assert_eq!(store.players().len(), 1);
        assert_eq!(store.planets().len(), 1);
    }

    #[tokio::test]
    async fn test_get_player_round_trip() {
        let (service, _store) = service();
        let created = service.create_player_with_planet("orion", "Belt").await.unwrap();

        let fetched = service.get_player_by_id(created.player.id).await.unwrap();
        assert_eq!(fetched, created.player);

        let all = service.get_all_players().await.unwrap();
        assert_eq!(all, vec![created.player]);
    }

    #[tokio::test]
    async fn test_get_unknown_player_is_not_found() {
        let (service, _store) = service();
        let err = service.get_player_by_id(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    proptest! {
        #[test]
        fn prop_normalize_username_is_idempotent(raw in "\\PC{0,40}") {
            let once = normalize_username(&raw);
            prop_assert_eq!(normalize_username(&once), once.clone());
            prop_assert_eq!(once.trim(), once.as_str());
        }

        #[test]
        fn prop_planet_name_keeps_case(core in "[A-Za-z][A-Za-z0-9 ]{0,20}[A-Za-z]", pad in " {0,3}") {
            let raw = format!("{pad}{core}{pad}");
            prop_assert_eq!(normalize_planet_name(&raw), core);
        }
    }
}
