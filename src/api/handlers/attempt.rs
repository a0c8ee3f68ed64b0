//! Attempt handlers: submit, list, attach mint reference.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{post, put};
use axum::{Json, Router};

use crate::api::dto::{MintRequest, SubmitAttemptRequest, SubmitAttemptResponse, WalletQuery};
use crate::app_state::AppState;
use crate::domain::{Attempt, AttemptId, MintReference, PuzzleId, WalletAddress};
use crate::error::{ErrorResponse, PuzzleError};
use crate::service::AttemptSummary;

/// `POST /puzzles/{id}/attempts` — Submit a move.
///
/// # Errors
///
/// Returns [`PuzzleError::MalformedMove`], [`PuzzleError::PuzzleNotFound`],
/// or [`PuzzleError::AttemptsExhausted`] after three attempts.
#[utoipa::path(
    post,
    path = "/api/v1/puzzles/{id}/attempts",
    tag = "Attempts",
    summary = "Submit an attempt",
    description = "Grades the move against the puzzle's solution (case-insensitive) and records it. At most three attempts are accepted per wallet and puzzle.",
    params(
        ("id" = u32, Path, description = "Puzzle id"),
    ),
    request_body = SubmitAttemptRequest,
    responses(
        (status = 201, description = "Attempt recorded", body = SubmitAttemptResponse),
        (status = 400, description = "Malformed move or wallet", body = ErrorResponse),
        (status = 404, description = "Puzzle not found", body = ErrorResponse),
        (status = 409, description = "No attempts left", body = ErrorResponse),
    )
)]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, PuzzleError> {
    let wallet = WalletAddress::parse(&req.wallet)?;
    let attempt = state
        .tracker
        .submit(
            &wallet,
            PuzzleId::new(id),
            &req.submitted_move,
            req.elapsed_seconds,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(SubmitAttemptResponse::from(attempt))))
}

/// `GET /puzzles/{id}/attempts?wallet=` — A wallet's attempts on a puzzle.
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidRequest`] for a malformed wallet.
#[utoipa::path(
    get,
    path = "/api/v1/puzzles/{id}/attempts",
    tag = "Attempts",
    summary = "List attempts",
    description = "Returns the wallet's attempts on the puzzle in order, the attempts left, and the fastest correct attempt.",
    params(
        ("id" = u32, Path, description = "Puzzle id"),
        WalletQuery,
    ),
    responses(
        (status = 200, description = "Attempt summary", body = AttemptSummary),
        (status = 400, description = "Invalid wallet", body = ErrorResponse),
    )
)]
pub async fn list_attempts(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Query(query): Query<WalletQuery>,
) -> Result<impl IntoResponse, PuzzleError> {
    let wallet = WalletAddress::parse(&query.wallet)?;
    let summary = state.tracker.summary(&wallet, PuzzleId::new(id)).await?;
    Ok(Json(summary))
}

/// `PUT /attempts/{id}/mint` — Attach a mint reference.
///
/// Repeating the call with the same reference is a no-op.
///
/// # Errors
///
/// Returns [`PuzzleError::AttemptNotFound`] or
/// [`PuzzleError::MintAlreadyAttached`] when a different reference is
/// already stored.
#[utoipa::path(
    put,
    path = "/api/v1/attempts/{id}/mint",
    tag = "Attempts",
    summary = "Attach a mint reference",
    params(
        ("id" = uuid::Uuid, Path, description = "Attempt UUID"),
    ),
    request_body = MintRequest,
    responses(
        (status = 200, description = "Updated attempt", body = Attempt),
        (status = 400, description = "Empty or over-long reference", body = ErrorResponse),
        (status = 404, description = "Attempt not found", body = ErrorResponse),
        (status = 409, description = "Different reference already attached", body = ErrorResponse),
    )
)]
pub async fn attach_mint_reference(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<MintRequest>,
) -> Result<impl IntoResponse, PuzzleError> {
    let reference = MintReference::parse(&req.reference)?;
    let attempt = state
        .tracker
        .attach_mint_reference(AttemptId::from_uuid(id), reference)
        .await?;
    Ok(Json(attempt))
}

/// Attempt routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/puzzles/{id}/attempts",
            post(submit_attempt).get(list_attempts),
        )
        .route("/attempts/{id}/mint", put(attach_mint_reference))
}
