use utoipa::OpenApi;

pub const PLAYER_TAG: &str = "Players";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Planet Service",
        description = "Player registration and lookup for the planet game backend",
    ),
    components(
        schemas(
            crate::api::dto::ErrorBody,
            crate::api::dto::PlayerView,
            crate::api::dto::PlanetView,
        )
    ),
    tags(
        (name = PLAYER_TAG, description = "Player registration and lookup"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
