//! Users and their cached skill profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::profile::{DEFAULT_SUCCESS_RATE, SkillProfile};
use super::{Difficulty, WalletAddress};
use crate::error::PuzzleError;

/// Longest accepted display name.
const DISPLAY_NAME_MAX_LEN: usize = 64;

/// A player, keyed by wallet address.
///
/// The profile fields are a cache of the last [`SkillProfile`] computed
/// by the recommendation engine. Nothing else writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Wallet address (unique).
    pub wallet: WalletAddress,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Percentage of correct attempts (0–100).
    pub success_rate: f64,
    /// Distinct puzzles solved correctly at least once.
    pub puzzles_solved: u32,
    /// Themes the user solves reliably, alphabetical.
    pub preferred_themes: Vec<String>,
    /// Tier the user should practise next.
    pub preferred_difficulty: Difficulty,
    /// When the last recommendation was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_recommended_at: Option<DateTime<Utc>>,
    /// First interaction timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a user with a fresh profile.
    #[must_use]
    pub fn new(wallet: WalletAddress) -> Self {
        Self {
            wallet,
            display_name: None,
            success_rate: DEFAULT_SUCCESS_RATE,
            puzzles_solved: 0,
            preferred_themes: Vec::new(),
            preferred_difficulty: Difficulty::for_success_rate(DEFAULT_SUCCESS_RATE),
            last_recommended_at: None,
            created_at: Utc::now(),
        }
    }

    /// Overwrites the cached profile fields, leaving identity and display
    /// name untouched.
    pub fn apply_snapshot(&mut self, snapshot: &ProfileSnapshot) {
        self.success_rate = snapshot.success_rate;
        self.puzzles_solved = snapshot.puzzles_solved;
        self.preferred_themes.clone_from(&snapshot.preferred_themes);
        self.preferred_difficulty = snapshot.preferred_difficulty;
        self.last_recommended_at = Some(snapshot.recommended_at);
    }
}

/// The profile columns of a [`User`], as written after a recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSnapshot {
    /// Percentage of correct attempts (0–100).
    pub success_rate: f64,
    /// Distinct puzzles solved.
    pub puzzles_solved: u32,
    /// Preferred themes, alphabetical.
    pub preferred_themes: Vec<String>,
    /// Tier to practise next.
    pub preferred_difficulty: Difficulty,
    /// Becomes `last_recommended_at`.
    pub recommended_at: DateTime<Utc>,
}

impl ProfileSnapshot {
    /// Captures a derived profile at `at`.
    #[must_use]
    pub fn from_profile(profile: &SkillProfile, at: DateTime<Utc>) -> Self {
        Self {
            success_rate: profile.success_rate,
            puzzles_solved: u32::try_from(profile.solved.len()).unwrap_or(u32::MAX),
            preferred_themes: profile.preferred_themes.iter().cloned().collect(),
            preferred_difficulty: profile.preferred_difficulty,
            recommended_at: at,
        }
    }
}

/// Trims a display name; blank names become `None`.
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidRequest`] for names longer than 64
/// characters.
pub fn normalize_display_name(raw: Option<&str>) -> Result<Option<String>, PuzzleError> {
    let Some(name) = raw.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if name.chars().count() > DISPLAY_NAME_MAX_LEN {
        return Err(PuzzleError::InvalidRequest(format!(
            "display name longer than {DISPLAY_NAME_MAX_LEN} characters"
        )));
    }
    Ok(Some(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_user_defaults_to_medium() {
        let user = User::new(WalletAddress::new_unchecked("0xabc"));
        assert!((user.success_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(user.preferred_difficulty, Difficulty::Medium);
        assert!(user.preferred_themes.is_empty());
        assert!(user.last_recommended_at.is_none());
    }

    #[test]
    fn display_name_normalization() {
        assert!(matches!(normalize_display_name(None), Ok(None)));
        assert!(matches!(normalize_display_name(Some("   ")), Ok(None)));
        assert!(matches!(
            normalize_display_name(Some("  Magnus ")),
            Ok(Some(ref n)) if n == "Magnus"
        ));
        assert!(normalize_display_name(Some(&"k".repeat(65))).is_err());
    }

    #[test]
    fn snapshot_keeps_display_name() {
        let mut user = User::new(WalletAddress::new_unchecked("0xabc"));
        user.display_name = Some("Judit".to_string());
        let snapshot = ProfileSnapshot {
            success_rate: 90.0,
            puzzles_solved: 4,
            preferred_themes: vec!["Fork".to_string()],
            preferred_difficulty: Difficulty::Hard,
            recommended_at: Utc::now(),
        };
        user.apply_snapshot(&snapshot);
        assert_eq!(user.display_name.as_deref(), Some("Judit"));
        assert_eq!(user.preferred_difficulty, Difficulty::Hard);
        assert_eq!(user.puzzles_solved, 4);
        assert_eq!(user.last_recommended_at, Some(snapshot.recommended_at));
    }
}
