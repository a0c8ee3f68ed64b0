//! Puzzle catalog DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Difficulty, PuzzleView};
use crate::repository::PuzzleFilter;

/// Query parameters for `GET /puzzles`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PuzzleListParams {
    /// Only puzzles of this difficulty.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Only puzzles tagged with this theme.
    #[serde(default)]
    pub theme: Option<String>,
}

impl PuzzleListParams {
    /// Converts the query into a repository filter. Themes are matched
    /// in their normalized (trimmed, lowercase) form.
    #[must_use]
    pub fn into_filter(self) -> PuzzleFilter {
        PuzzleFilter {
            difficulty: self.difficulty,
            theme: self
                .theme
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty()),
        }
    }
}

/// Response body for `GET /puzzles`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PuzzleListResponse {
    /// Matching puzzles ordered by id, without solutions.
    pub data: Vec<PuzzleView>,
    /// Number of matching puzzles.
    pub total: usize,
}
