pub mod health;
pub mod rooms;

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::AppState;

/// Where the Swagger UI is mounted when API docs are enabled.
pub const DOCS_PATH: &str = "/docs";
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .nest("/api/v1", rooms::router())
}

/// `router()` plus the OpenAPI document and Swagger UI.
pub fn router_with_docs() -> Router<AppState> {
    router().merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MorphLink Relay",
        description = "Room-scoped relay for real-time face tracking data. \
                       Clients connect to `/ws` and exchange `join_room`, `leave_room` \
                       and `face_data` events.",
    ),
    paths(
        // Health
        health::health,
        // Rooms
        rooms::list_rooms,
        rooms::get_room,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::gateway::registry::RoomSummary,
            health::HealthResponse,
            rooms::ListRoomsResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Rooms", description = "Room membership inspection"),
    )
)]
pub struct ApiDoc;
