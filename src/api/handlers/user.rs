//! User handlers: registration, profile, recommendation.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::RegisterUserRequest;
use crate::app_state::AppState;
use crate::domain::{User, WalletAddress};
use crate::error::{ErrorResponse, PuzzleError};
use crate::service::RecommendationResponse;

/// `GET /users/{wallet}/recommendation` — Next puzzle for a user.
///
/// # Errors
///
/// Returns [`PuzzleError::NoPuzzlesAvailable`] if the catalog is empty.
#[utoipa::path(
    get,
    path = "/api/v1/users/{wallet}/recommendation",
    tag = "Users",
    summary = "Recommend a puzzle",
    description = "Recomputes the user's skill profile from their full attempt history, stores it, and picks an unsolved puzzle matching their level and strongest themes. Unknown wallets get a fresh profile.",
    params(
        ("wallet" = String, Path, description = "Wallet address"),
    ),
    responses(
        (status = 200, description = "Recommendation", body = RecommendationResponse),
        (status = 400, description = "Invalid wallet", body = ErrorResponse),
        (status = 503, description = "Catalog is empty", body = ErrorResponse),
    )
)]
pub async fn get_recommendation(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Result<impl IntoResponse, PuzzleError> {
    let wallet = WalletAddress::parse(&wallet)?;
    let recommendation = state.recommender.recommend(&wallet).await?;
    Ok(Json(RecommendationResponse::from(recommendation)))
}

/// `GET /users/{wallet}` — Cached profile.
///
/// # Errors
///
/// Returns [`PuzzleError::UserNotFound`] for unknown wallets.
#[utoipa::path(
    get,
    path = "/api/v1/users/{wallet}",
    tag = "Users",
    summary = "Get a user",
    description = "Returns the user with the profile computed by the last recommendation.",
    params(
        ("wallet" = String, Path, description = "Wallet address"),
    ),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Result<impl IntoResponse, PuzzleError> {
    let wallet = WalletAddress::parse(&wallet)?;
    let user = state.users.get(&wallet).await?;
    Ok(Json(user))
}

/// `PUT /users/{wallet}` — Register a user or set the display name.
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidRequest`] for a bad wallet or name.
#[utoipa::path(
    put,
    path = "/api/v1/users/{wallet}",
    tag = "Users",
    summary = "Register a user",
    params(
        ("wallet" = String, Path, description = "Wallet address"),
    ),
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "Registered user", body = User),
        (status = 400, description = "Invalid wallet or display name", body = ErrorResponse),
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, PuzzleError> {
    let wallet = WalletAddress::parse(&wallet)?;
    let user = state
        .users
        .register(&wallet, req.display_name.as_deref())
        .await?;
    Ok(Json(user))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{wallet}", get(get_user).put(register_user))
        .route("/users/{wallet}/recommendation", get(get_recommendation))
}
