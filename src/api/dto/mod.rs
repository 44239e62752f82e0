//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `envelope` - The uniform response envelope and error payload
//! - `player` - Player and planet request/response DTOs
//! - `health` - Health probe DTOs

mod envelope;
mod health;
mod player;

pub use envelope::{ApiResponse, ErrorBody};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use player::{
    CreatePlayerRequest, CreatePlayerResponse, MAX_NAME_LENGTH, MIN_USERNAME_LENGTH, PlanetView,
    PlayerView,
};
