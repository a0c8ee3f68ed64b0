//! Catalog puzzles and their client-facing projection.
//!
//! [`Puzzle`] is deserializable (the catalog is JSON) but intentionally
//! does not implement `Serialize`: the only serializable form is
//! [`PuzzleView`], which carries no solution.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PuzzleId;
use crate::error::PuzzleError;

/// Shortest accepted move string (e.g. `e4`).
const MOVE_MIN_LEN: usize = 2;
/// Longest accepted move string (e.g. `exd8=Q+`, `e7e8q`).
const MOVE_MAX_LEN: usize = 10;

/// Difficulty tier of a puzzle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Entry level.
    Easy,
    /// Intermediate.
    Medium,
    /// Advanced.
    Hard,
}

impl Difficulty {
    /// Maps a success rate (0–100) to the tier a player should practise.
    ///
    /// `>= 80` is hard, `>= 40` medium, anything lower easy.
    #[must_use]
    pub fn for_success_rate(rate: f64) -> Self {
        if rate >= 80.0 {
            Self::Hard
        } else if rate >= 40.0 {
            Self::Medium
        } else {
            Self::Easy
        }
    }

    /// One tier easier; easy stays easy.
    #[must_use]
    pub const fn easier(self) -> Self {
        match self {
            Self::Hard => Self::Medium,
            Self::Medium | Self::Easy => Self::Easy,
        }
    }

    /// Lowercase name as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(PuzzleError::InvalidCatalog(format!(
                "unknown difficulty: {other}"
            ))),
        }
    }
}

/// Side to move in the puzzle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// White to move.
    White,
    /// Black to move.
    Black,
}

impl Side {
    /// Lowercase name as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl FromStr for Side {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(Self::White),
            "black" => Ok(Self::Black),
            other => Err(PuzzleError::InvalidCatalog(format!("unknown side: {other}"))),
        }
    }
}

/// Validates a move string and returns it trimmed.
///
/// The engine never checks legality; it only requires something shaped
/// like SAN or UCI notation: 2–10 characters of ASCII alphanumerics and
/// `+#=-`.
///
/// # Errors
///
/// Returns [`PuzzleError::MalformedMove`] when the string is too short,
/// too long, or contains other characters.
pub fn validate_move(raw: &str) -> Result<&str, PuzzleError> {
    let mv = raw.trim();
    if mv.len() < MOVE_MIN_LEN || mv.len() > MOVE_MAX_LEN {
        return Err(PuzzleError::MalformedMove(format!(
            "move must be {MOVE_MIN_LEN}-{MOVE_MAX_LEN} characters, got {}",
            mv.len()
        )));
    }
    if let Some(bad) = mv
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '=' | '-')))
    {
        return Err(PuzzleError::MalformedMove(format!(
            "unexpected character {bad:?} in move"
        )));
    }
    Ok(mv)
}

/// Raw catalog entry as it appears in JSON or a database row.
#[derive(Debug, Clone, Deserialize)]
pub struct PuzzleRecord {
    /// Puzzle number.
    pub id: u32,
    /// Board position in FEN.
    pub fen: String,
    /// Side to move.
    pub side_to_move: Side,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Theme tags; must not contain duplicates.
    pub themes: Vec<String>,
    /// Solution move.
    pub solution: String,
    /// Optional popularity score.
    #[serde(default)]
    pub popularity: Option<u32>,
    /// Optional historical success rate (0–100).
    #[serde(default)]
    pub success_rate: Option<f64>,
}

/// A catalog puzzle. Immutable once created.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "PuzzleRecord")]
pub struct Puzzle {
    id: PuzzleId,
    fen: String,
    side_to_move: Side,
    difficulty: Difficulty,
    themes: BTreeSet<String>,
    solution: String,
    popularity: Option<u32>,
    success_rate: Option<f64>,
}

impl Puzzle {
    /// Returns the puzzle identifier.
    #[must_use]
    pub const fn id(&self) -> PuzzleId {
        self.id
    }

    /// Returns the board position in FEN.
    #[must_use]
    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// Returns the side to move.
    #[must_use]
    pub const fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// Returns the difficulty tier.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Returns the normalized theme set.
    #[must_use]
    pub const fn themes(&self) -> &BTreeSet<String> {
        &self.themes
    }

    /// Returns `true` if the puzzle is tagged with `theme`.
    #[must_use]
    pub fn has_theme(&self, theme: &str) -> bool {
        self.themes.contains(theme)
    }

    /// Returns the solution move. Never expose this to clients.
    #[must_use]
    pub fn solution(&self) -> &str {
        &self.solution
    }

    /// Returns the optional popularity score.
    #[must_use]
    pub const fn popularity(&self) -> Option<u32> {
        self.popularity
    }

    /// Returns the optional historical success rate.
    #[must_use]
    pub const fn success_rate(&self) -> Option<f64> {
        self.success_rate
    }

    /// Case-insensitive comparison of a submitted move against the solution.
    #[must_use]
    pub fn is_solved_by(&self, mv: &str) -> bool {
        mv.trim().eq_ignore_ascii_case(self.solution.trim())
    }

    /// Client-facing projection without the solution.
    #[must_use]
    pub fn view(&self) -> PuzzleView {
        PuzzleView::from(self)
    }
}

impl TryFrom<PuzzleRecord> for Puzzle {
    type Error = PuzzleError;

    fn try_from(record: PuzzleRecord) -> Result<Self, Self::Error> {
        let id = PuzzleId::new(record.id);
        if record.fen.trim().is_empty() {
            return Err(PuzzleError::InvalidCatalog(format!("puzzle {id} has no FEN")));
        }
        let solution = validate_move(&record.solution)
            .map_err(|e| PuzzleError::InvalidCatalog(format!("puzzle {id}: {e}")))?
            .to_string();

        let mut themes = BTreeSet::new();
        for raw in &record.themes {
            let theme = raw.trim().to_ascii_lowercase();
            if theme.is_empty() {
                return Err(PuzzleError::InvalidCatalog(format!(
                    "puzzle {id} has an empty theme"
                )));
            }
            if !themes.insert(theme) {
                return Err(PuzzleError::InvalidCatalog(format!(
                    "puzzle {id} lists theme {raw:?} twice"
                )));
            }
        }

        if let Some(rate) = record.success_rate
            && !(0.0..=100.0).contains(&rate)
        {
            return Err(PuzzleError::InvalidCatalog(format!(
                "puzzle {id} success rate {rate} outside 0-100"
            )));
        }

        Ok(Self {
            id,
            fen: record.fen.trim().to_string(),
            side_to_move: record.side_to_move,
            difficulty: record.difficulty,
            themes,
            solution,
            popularity: record.popularity,
            success_rate: record.success_rate,
        })
    }
}

/// Puzzle as shown to clients: everything except the solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PuzzleView {
    /// Puzzle identifier.
    pub id: PuzzleId,
    /// Board position in FEN.
    pub fen: String,
    /// Side to move.
    pub side_to_move: Side,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Theme tags in alphabetical order.
    pub themes: Vec<String>,
    /// Optional popularity score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
    /// Optional historical success rate (0–100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<f64>,
}

impl From<&Puzzle> for PuzzleView {
    fn from(puzzle: &Puzzle) -> Self {
        Self {
            id: puzzle.id,
            fen: puzzle.fen.clone(),
            side_to_move: puzzle.side_to_move,
            difficulty: puzzle.difficulty,
            themes: puzzle.themes.iter().cloned().collect(),
            popularity: puzzle.popularity,
            success_rate: puzzle.success_rate,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn record() -> PuzzleRecord {
        PuzzleRecord {
            id: 1,
            fen: "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1".to_string(),
            side_to_move: Side::White,
            difficulty: Difficulty::Easy,
            themes: vec!["Back-Rank".to_string(), "mate-in-one".to_string()],
            solution: "Rd8#".to_string(),
            popularity: Some(120),
            success_rate: Some(81.5),
        }
    }

    #[test]
    fn themes_are_normalized() {
        let Ok(puzzle) = Puzzle::try_from(record()) else {
            panic!("valid record");
        };
        assert!(puzzle.has_theme("back-rank"));
        assert!(puzzle.has_theme("mate-in-one"));
        assert_eq!(puzzle.themes().len(), 2);
    }

    #[test]
    fn duplicate_themes_are_rejected() {
        let mut rec = record();
        rec.themes = vec!["fork".to_string(), "FORK".to_string()];
        assert!(Puzzle::try_from(rec).is_err());
    }

    #[test]
    fn out_of_range_success_rate_is_rejected() {
        let mut rec = record();
        rec.success_rate = Some(140.0);
        assert!(Puzzle::try_from(rec).is_err());
    }

    #[test]
    fn solution_comparison_ignores_case() {
        let mut rec = record();
        rec.solution = "e2e4".to_string();
        let Ok(puzzle) = Puzzle::try_from(rec) else {
            panic!("valid record");
        };
        assert!(puzzle.is_solved_by("E2E4"));
        assert!(puzzle.is_solved_by(" e2e4 "));
        assert!(!puzzle.is_solved_by("e2e3"));
    }

    #[test]
    fn view_never_contains_solution() {
        let Ok(puzzle) = Puzzle::try_from(record()) else {
            panic!("valid record");
        };
        let json = serde_json::to_string(&puzzle.view()).unwrap_or_default();
        assert!(json.contains("back-rank"));
        assert!(!json.contains("Rd8#"));
        assert!(!json.contains("solution"));
    }

    #[test]
    fn move_validation() {
        assert!(validate_move("e4").is_ok());
        assert!(validate_move("exd8=Q+").is_ok());
        assert!(validate_move("O-O-O").is_ok());
        assert!(validate_move("e").is_err());
        assert!(validate_move("Qxf7# !!").is_err());
        assert!(validate_move("aaaaaaaaaaa").is_err());
        assert!(matches!(
            validate_move(""),
            Err(PuzzleError::MalformedMove(_))
        ));
    }

    #[test]
    fn difficulty_thresholds() {
        assert_eq!(Difficulty::for_success_rate(80.0), Difficulty::Hard);
        assert_eq!(Difficulty::for_success_rate(79.9), Difficulty::Medium);
        assert_eq!(Difficulty::for_success_rate(40.0), Difficulty::Medium);
        assert_eq!(Difficulty::for_success_rate(39.9), Difficulty::Easy);
        assert_eq!(Difficulty::Hard.easier(), Difficulty::Medium);
        assert_eq!(Difficulty::Easy.easier(), Difficulty::Easy);
    }

    #[test]
    fn catalog_json_deserializes_through_validation() {
        let json = r#"{"id":3,"fen":"8/8/8/8/8/8/8/8 w - - 0 1","side_to_move":"black",
            "difficulty":"medium","themes":["pin"],"solution":"Bb4"}"#;
        let parsed: Result<Puzzle, _> = serde_json::from_str(json);
        let Ok(puzzle) = parsed else {
            panic!("valid json");
        };
        assert_eq!(puzzle.id(), PuzzleId::new(3));
        assert_eq!(puzzle.side_to_move(), Side::Black);
        assert_eq!(puzzle.popularity(), None);
    }
}
