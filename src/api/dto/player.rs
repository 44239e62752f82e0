//! Player-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{Planet, Player};
use crate::services::{normalize_planet_name, normalize_username};

/// Column limit shared by usernames and planet names.
pub const MAX_NAME_LENGTH: usize = 255;
pub const MIN_USERNAME_LENGTH: usize = 3;

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for registering a player with their first planet.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "validate_create_player"))]
pub struct CreatePlayerRequest {
    /// Stored trimmed and lowercased
    #[schema(min_length = 3, max_length = 255, example = "nova")]
    pub username: String,
    /// Stored trimmed, capitalization preserved
    #[schema(min_length = 1, max_length = 255, example = "Terra")]
    pub planet_name: String,
}

/// Checks fields in a fixed order and reports the first failure only.
///
/// Lengths are measured in characters of the normalized value, which is what
/// gets stored. Lowercasing can lengthen a username.
fn validate_create_player(request: &CreatePlayerRequest) -> Result<(), ValidationError> {
    let username = normalize_username(&request.username);
    if username.is_empty() {
        return Err(invalid("required", "username is required"));
    }
    let username_len = username.chars().count();
    if username_len < MIN_USERNAME_LENGTH {
        return Err(invalid("length", "username must be at least 3 characters"));
    }
    if username_len > MAX_NAME_LENGTH {
        return Err(invalid("length", "username must be at most 255 characters"));
    }

    let planet_name = normalize_planet_name(&request.planet_name);
    if planet_name.is_empty() {
        return Err(invalid("required", "planet name is required"));
    }
    if planet_name.chars().count() > MAX_NAME_LENGTH {
        return Err(invalid("length", "planet name must be at most 255 characters"));
    }

    Ok(())
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Public view of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlayerView {
    pub id: Uuid,
    #[schema(example = "nova")]
    pub username: String,
    /// RFC 3339 timestamp
    #[schema(value_type = String, format = DateTime, example = "2025-06-01T12:00:00Z")]
    pub created_at: String,
}

impl From<Player> for PlayerView {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            username: player.username,
            created_at: player.created_at.to_string(),
        }
    }
}

/// Public view of a planet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlanetView {
    pub id: Uuid,
    pub player_id: Uuid,
    #[schema(example = "Terra")]
    pub name: String,
    #[schema(value_type = String, format = DateTime, example = "2025-06-01T12:00:00Z")]
    pub created_at: String,
    #[schema(value_type = String, format = DateTime, example = "2025-06-01T12:00:00Z")]
    pub updated_at: String,
}

impl From<Planet> for PlanetView {
    fn from(planet: Planet) -> Self {
        Self {
            id: planet.id,
            player_id: planet.player_id,
            name: planet.name,
            created_at: planet.created_at.to_string(),
            updated_at: planet.updated_at.to_string(),
        }
    }
}

/// Response body for a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CreatePlayerResponse {
    pub player: PlayerView,
    pub planet: PlanetView,
}
