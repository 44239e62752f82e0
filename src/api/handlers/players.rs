//! Player request handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::api::doc::PLAYER_TAG;
use crate::api::dto::{ApiResponse, CreatePlayerRequest, CreatePlayerResponse, ErrorBody, PlayerView};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates player-related routes.
pub fn player_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_players, create_player))
        .routes(routes!(get_player))
}

/// GET /players - List all players
#[utoipa::path(
    get,
    path = "/players",
    tag = PLAYER_TAG,
    responses(
        (status = 200, description = "All players, oldest first", body = ApiResponse<Vec<PlayerView>>),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
async fn list_players(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<PlayerView>>>> {
    let players = state.services.players.get_all_players().await?;
    Ok(Json(ApiResponse::success(players)))
}

/// POST /players - Register a player with their first planet
#[utoipa::path(
    post,
    path = "/players",
    tag = PLAYER_TAG,
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Player and planet created", body = ApiResponse<CreatePlayerResponse>),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "Username already taken", body = ErrorBody)
    )
)]
async fn create_player(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreatePlayerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CreatePlayerResponse>>)> {
    let created = state
        .services
        .players
        .create_player_with_planet(&req.username, &req.planet_name)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// GET /players/{id} - Get player by ID
///
/// The id is parsed here rather than by the `Path` extractor so a malformed
/// value gets the same envelope as every other input error.
#[utoipa::path(
    get,
    path = "/players/{id}",
    tag = PLAYER_TAG,
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    responses(
        (status = 200, description = "Player found", body = ApiResponse<PlayerView>),
        (status = 400, description = "Malformed player id", body = ErrorBody),
        (status = 404, description = "Player not found", body = ErrorBody)
    )
)]
async fn get_player(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<PlayerView>>> {
    let id = Uuid::parse_str(&raw_id).map_err(|e| {
        AppError::invalid_input("invalid player id").with_details(e.to_string())
    })?;

    let player = state.services.players.get_player_by_id(id).await?;
    Ok(Json(ApiResponse::success(player)))
}
