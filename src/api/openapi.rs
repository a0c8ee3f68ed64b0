//! OpenAPI document assembled from the handlers' `#[utoipa::path]`
//! annotations. Served as JSON at `/api-docs/openapi.json`, with
//! Swagger UI at `/swagger-ui` when the `swagger-ui` feature is on.

use axum::Router;
use utoipa::OpenApi;

use crate::api::handlers::{attempt, puzzle, system, user};
use crate::app_state::AppState;

/// Generated OpenAPI description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Daily Puzzle API",
        description = "Daily chess puzzles with attempt tracking and adaptive recommendations."
    ),
    paths(
        puzzle::todays_puzzle,
        puzzle::puzzle_for_date,
        puzzle::list_puzzles,
        puzzle::get_puzzle,
        attempt::submit_attempt,
        attempt::list_attempts,
        attempt::attach_mint_reference,
        user::get_recommendation,
        user::get_user,
        user::register_user,
        system::health_handler,
    ),
    tags(
        (name = "Puzzles", description = "Daily puzzle and catalog"),
        (name = "Attempts", description = "Move submission and history"),
        (name = "Users", description = "Profiles and recommendations"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(feature = "swagger-ui")]
pub(crate) fn mount(router: Router<AppState>) -> Router<AppState> {
    use utoipa_swagger_ui::SwaggerUi;

    router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(not(feature = "swagger-ui"))]
pub(crate) fn mount(router: Router<AppState>) -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    router.route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
