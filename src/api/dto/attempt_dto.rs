//! Attempt submission and mint DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Attempt, MAX_ATTEMPTS};

/// Request body for `POST /puzzles/{id}/attempts`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAttemptRequest {
    /// Submitting wallet.
    pub wallet: String,
    /// Move in algebraic notation (e.g. `"Qxf7#"`).
    #[serde(rename = "move")]
    pub submitted_move: String,
    /// Seconds the player spent before submitting.
    #[serde(default)]
    pub elapsed_seconds: u32,
}

/// Response body for `POST /puzzles/{id}/attempts`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitAttemptResponse {
    /// The recorded attempt.
    pub attempt: Attempt,
    /// Attempts still allowed on this puzzle.
    pub remaining_attempts: u32,
    /// Short human-readable outcome.
    pub message: String,
}

impl From<Attempt> for SubmitAttemptResponse {
    fn from(attempt: Attempt) -> Self {
        let remaining_attempts = MAX_ATTEMPTS.saturating_sub(attempt.attempt_number);
        let message = match (attempt.is_correct, remaining_attempts) {
            (true, _) => "Correct! Puzzle solved.".to_string(),
            (false, 0) => "Incorrect. No attempts left on this puzzle.".to_string(),
            (false, 1) => "Incorrect. 1 attempt left.".to_string(),
            (false, n) => format!("Incorrect. {n} attempts left."),
        };
        Self {
            attempt,
            remaining_attempts,
            message,
        }
    }
}

/// Query parameters identifying the acting wallet.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WalletQuery {
    /// Wallet address.
    pub wallet: String,
}

/// Request body for `PUT /attempts/{id}/mint`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MintRequest {
    /// Opaque reference from the minting service (e.g. a transaction id).
    pub reference: String,
}
