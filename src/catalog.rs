//! Puzzle catalog loading and repository seeding.
//!
//! The built-in catalog (`data/puzzles.json`) is compiled into the
//! binary; `PUZZLE_CATALOG_PATH` points at a replacement file.

use std::collections::HashSet;
use std::path::Path;

use crate::domain::Puzzle;
use crate::error::PuzzleError;
use crate::repository::Repository;

const BUILTIN_CATALOG: &str = include_str!("../data/puzzles.json");

/// Parses a JSON array of puzzles.
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidCatalog`] on malformed JSON, an invalid
/// entry, or a repeated puzzle id.
pub fn parse_catalog(json: &str) -> Result<Vec<Puzzle>, PuzzleError> {
    let puzzles: Vec<Puzzle> =
        serde_json::from_str(json).map_err(|e| PuzzleError::InvalidCatalog(e.to_string()))?;

    let mut seen = HashSet::with_capacity(puzzles.len());
    for puzzle in &puzzles {
        if !seen.insert(puzzle.id()) {
            return Err(PuzzleError::InvalidCatalog(format!(
                "puzzle id {} appears twice",
                puzzle.id()
            )));
        }
    }
    Ok(puzzles)
}

/// The catalog shipped with the binary.
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidCatalog`] if the embedded file is
/// invalid.
pub fn builtin_catalog() -> Result<Vec<Puzzle>, PuzzleError> {
    parse_catalog(BUILTIN_CATALOG)
}

/// Loads the catalog from `path`, or the built-in one when `None`.
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidCatalog`] if the file cannot be read
/// or parsed.
pub async fn load_catalog(path: Option<&Path>) -> Result<Vec<Puzzle>, PuzzleError> {
    let Some(path) = path else {
        return builtin_catalog();
    };
    let json = tokio::fs::read_to_string(path).await.map_err(|e| {
        PuzzleError::InvalidCatalog(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_catalog(&json)
}

/// Inserts every puzzle not already stored. Returns how many were new.
///
/// Safe to run on every startup: stored puzzles are never overwritten.
///
/// # Errors
///
/// Returns a [`PuzzleError`] if the repository rejects a write.
pub async fn seed(repository: &dyn Repository, puzzles: Vec<Puzzle>) -> Result<usize, PuzzleError> {
    if puzzles.is_empty() {
        tracing::warn!("puzzle catalog is empty; daily puzzles and recommendations will fail");
        return Ok(0);
    }
    let total = puzzles.len();
    let mut inserted = 0_usize;
    for puzzle in puzzles {
        if repository.insert_puzzle(puzzle).await? {
            inserted = inserted.saturating_add(1);
        }
    }
    tracing::info!(total, inserted, "puzzle catalog seeded");
    Ok(inserted)
}
