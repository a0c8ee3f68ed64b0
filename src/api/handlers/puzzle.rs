//! Puzzle handlers: daily puzzle, puzzle by date, catalog reads.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;

use crate::api::dto::{PuzzleListParams, PuzzleListResponse};
use crate::app_state::AppState;
use crate::domain::{PuzzleId, PuzzleView};
use crate::error::{ErrorResponse, PuzzleError};
use crate::service::DailyPuzzle;

/// `GET /puzzles/today` — Today's puzzle.
///
/// # Errors
///
/// Returns [`PuzzleError::NoPuzzlesAvailable`] if the catalog is empty.
#[utoipa::path(
    get,
    path = "/api/v1/puzzles/today",
    tag = "Puzzles",
    summary = "Get today's puzzle",
    description = "Returns the puzzle bound to the server's current day, binding one first if this is the day's first request. The solution is never included.",
    responses(
        (status = 200, description = "Today's puzzle", body = DailyPuzzle),
        (status = 503, description = "Catalog is empty", body = ErrorResponse),
    )
)]
pub async fn todays_puzzle(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PuzzleError> {
    let daily = state.scheduler.todays_puzzle().await?;
    Ok(Json(daily))
}

/// `GET /puzzles/daily/{date}` — Puzzle for a past day.
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidRequest`] for unparsable or future dates.
#[utoipa::path(
    get,
    path = "/api/v1/puzzles/daily/{date}",
    tag = "Puzzles",
    summary = "Get the puzzle for a date",
    description = "Returns the puzzle bound to a past date or today. Future dates are rejected.",
    params(
        ("date" = String, Path, description = "Calendar date, YYYY-MM-DD"),
    ),
    responses(
        (status = 200, description = "Puzzle for the date", body = DailyPuzzle),
        (status = 400, description = "Invalid or future date", body = ErrorResponse),
        (status = 503, description = "Catalog is empty", body = ErrorResponse),
    )
)]
pub async fn puzzle_for_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, PuzzleError> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| PuzzleError::InvalidRequest(format!("invalid date '{date}': {e}")))?;
    let daily = state.scheduler.puzzle_for_date(date).await?;
    Ok(Json(daily))
}

/// `GET /puzzles` — List the catalog.
///
/// # Errors
///
/// Returns a [`PuzzleError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/puzzles",
    tag = "Puzzles",
    summary = "List puzzles",
    description = "Returns catalog puzzles ordered by id, optionally filtered by difficulty and theme.",
    params(PuzzleListParams),
    responses(
        (status = 200, description = "Matching puzzles", body = PuzzleListResponse),
    )
)]
pub async fn list_puzzles(
    State(state): State<AppState>,
    Query(params): Query<PuzzleListParams>,
) -> Result<impl IntoResponse, PuzzleError> {
    let puzzles = state.repository.scan_puzzles(&params.into_filter()).await?;
    let data: Vec<PuzzleView> = puzzles.iter().map(PuzzleView::from).collect();
    Ok(Json(PuzzleListResponse {
        total: data.len(),
        data,
    }))
}

/// `GET /puzzles/{id}` — Single puzzle.
///
/// # Errors
///
/// Returns [`PuzzleError::PuzzleNotFound`] if the puzzle does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/puzzles/{id}",
    tag = "Puzzles",
    summary = "Get a puzzle",
    params(
        ("id" = u32, Path, description = "Puzzle id"),
    ),
    responses(
        (status = 200, description = "Puzzle without its solution", body = PuzzleView),
        (status = 404, description = "Puzzle not found", body = ErrorResponse),
    )
)]
pub async fn get_puzzle(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<impl IntoResponse, PuzzleError> {
    let id = PuzzleId::new(id);
    let puzzle = state
        .repository
        .get_puzzle(id)
        .await?
        .ok_or(PuzzleError::PuzzleNotFound(id))?;
    Ok(Json(puzzle.view()))
}

/// Puzzle routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/puzzles", get(list_puzzles))
        .route("/puzzles/today", get(todays_puzzle))
        .route("/puzzles/daily/{date}", get(puzzle_for_date))
        .route("/puzzles/{id}", get(get_puzzle))
}
