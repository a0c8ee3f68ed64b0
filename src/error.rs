//! Service error types with HTTP status code mapping.
//!
//! [`PuzzleError`] is the central error type for the engine. Each variant
//! belongs to an [`ErrorCategory`] and maps to a specific HTTP status code
//! and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AttemptId, PuzzleId, WalletAddress};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2101,
///     "message": "no attempts left for puzzle 4 (limit 3)"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Coarse failure taxonomy shared by every [`PuzzleError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input rejected before any business logic ran.
    Malformed,
    /// A referenced entity does not exist.
    NotFound,
    /// A business rule forbids the operation (e.g. attempts exhausted).
    PreconditionFailed,
    /// The deployment cannot serve the request (e.g. empty catalog).
    ResourceExhausted,
    /// Storage or programming defect.
    Internal,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status               |
/// |-----------|---------------------|---------------------------|
/// | 1000–1999 | Malformed           | 400 Bad Request           |
/// | 2000–2099 | Not Found           | 404 Not Found             |
/// | 2100–2199 | Precondition Failed | 409 Conflict              |
/// | 3000–3099 | Internal            | 500 Internal Server Error |
/// | 3100–3199 | Resource Exhausted  | 503 Service Unavailable   |
#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    /// Submitted move failed format validation.
    #[error("malformed move: {0}")]
    MalformedMove(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Puzzle with the given ID was not found.
    #[error("puzzle not found: {0}")]
    PuzzleNotFound(PuzzleId),

    /// Attempt with the given ID was not found.
    #[error("attempt not found: {0}")]
    AttemptNotFound(AttemptId),

    /// No user is registered under the given wallet.
    #[error("user not found: {0}")]
    UserNotFound(WalletAddress),

    /// The user already used every attempt on this puzzle.
    #[error("no attempts left for puzzle {puzzle_id} (limit {limit})")]
    AttemptsExhausted {
        /// Wallet that submitted the rejected attempt.
        wallet: WalletAddress,
        /// Puzzle the attempt targeted.
        puzzle_id: PuzzleId,
        /// Attempt ceiling that was hit.
        limit: u32,
    },

    /// A different mint reference is already attached to the attempt.
    #[error("attempt {0} already carries a different mint reference")]
    MintAlreadyAttached(AttemptId),

    /// The catalog is empty; nothing can be assigned or recommended.
    #[error("no puzzles available")]
    NoPuzzlesAvailable,

    /// The puzzle catalog could not be loaded or contains invalid entries.
    #[error("invalid puzzle catalog: {0}")]
    InvalidCatalog(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PuzzleError {
    /// Returns the failure category of this variant.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedMove(_) | Self::InvalidRequest(_) => ErrorCategory::Malformed,
            Self::PuzzleNotFound(_) | Self::AttemptNotFound(_) | Self::UserNotFound(_) => {
                ErrorCategory::NotFound
            }
            Self::AttemptsExhausted { .. } | Self::MintAlreadyAttached(_) => {
                ErrorCategory::PreconditionFailed
            }
            Self::NoPuzzlesAvailable => ErrorCategory::ResourceExhausted,
            Self::InvalidCatalog(_) | Self::PersistenceError(_) | Self::Internal(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::MalformedMove(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::PuzzleNotFound(_) => 2001,
            Self::AttemptNotFound(_) => 2002,
            Self::UserNotFound(_) => 2003,
            Self::AttemptsExhausted { .. } => 2101,
            Self::MintAlreadyAttached(_) => 2102,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::InvalidCatalog(_) => 3002,
            Self::NoPuzzlesAvailable => 3101,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Malformed => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::PreconditionFailed => StatusCode::CONFLICT,
            ErrorCategory::ResourceExhausted => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for PuzzleError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for PuzzleError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
