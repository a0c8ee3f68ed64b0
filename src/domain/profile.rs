//! Skill profile derived from a user's attempt history.
//!
//! [`SkillProfile::derive`] is a pure function of the attempts and the
//! catalog. The copy stored on [`super::User`] is only a cache; callers
//! that need a profile recompute it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{Attempt, Difficulty, Puzzle, PuzzleId};

/// Success rate assumed for a user with no attempts.
pub const DEFAULT_SUCCESS_RATE: f64 = 50.0;

/// Attempts a theme needs before it can become preferred.
pub const THEME_MIN_ATTEMPTS: u32 = 2;

/// Success rate (percent) a theme needs to become preferred.
pub const THEME_MIN_SUCCESS_RATE: f64 = 60.0;

/// Attempt and success counts for one theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeTally {
    /// Attempts on puzzles carrying the theme.
    pub attempts: u32,
    /// Correct attempts among them.
    pub correct: u32,
}

impl ThemeTally {
    /// Success rate in percent; zero when there are no attempts.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.attempts) * 100.0
    }

    /// Whether the theme qualifies as preferred.
    #[must_use]
    pub fn is_preferred(&self) -> bool {
        self.attempts >= THEME_MIN_ATTEMPTS && self.success_rate() >= THEME_MIN_SUCCESS_RATE
    }
}

/// Difficulty and theme profile of a user.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillProfile {
    /// Total attempts considered.
    pub total_attempts: u32,
    /// Correct attempts among them.
    pub correct_attempts: u32,
    /// Percentage of correct attempts, or the default for no history.
    pub success_rate: f64,
    /// Per-theme tallies.
    pub themes: BTreeMap<String, ThemeTally>,
    /// Themes with at least two attempts and a 60% success rate.
    pub preferred_themes: BTreeSet<String>,
    /// Tier matching the success rate.
    pub preferred_difficulty: Difficulty,
    /// Puzzles with at least one correct attempt.
    pub solved: BTreeSet<PuzzleId>,
}

impl SkillProfile {
    /// Profile of a user with no history.
    #[must_use]
    pub fn fresh() -> Self {
        Self::derive(&[], &[])
    }

    /// Derives the profile from all of a user's attempts.
    ///
    /// Attempts on puzzles missing from `catalog` still count towards the
    /// overall success rate but contribute no themes.
    #[must_use]
    pub fn derive(attempts: &[Attempt], catalog: &[Puzzle]) -> Self {
        let by_id: HashMap<PuzzleId, &Puzzle> = catalog.iter().map(|p| (p.id(), p)).collect();

        let mut total_attempts = 0_u32;
        let mut correct_attempts = 0_u32;
        let mut themes: BTreeMap<String, ThemeTally> = BTreeMap::new();
        let mut solved = BTreeSet::new();

        for attempt in attempts {
            total_attempts = total_attempts.saturating_add(1);
            if attempt.is_correct {
                correct_attempts = correct_attempts.saturating_add(1);
                solved.insert(attempt.puzzle_id);
            }
            let Some(puzzle) = by_id.get(&attempt.puzzle_id) else {
                continue;
            };
            for theme in puzzle.themes() {
                let tally = themes.entry(theme.clone()).or_default();
                tally.attempts = tally.attempts.saturating_add(1);
                if attempt.is_correct {
                    tally.correct = tally.correct.saturating_add(1);
                }
            }
        }

        let success_rate = if total_attempts == 0 {
            DEFAULT_SUCCESS_RATE
        } else {
            f64::from(correct_attempts) / f64::from(total_attempts) * 100.0
        };

        let preferred_themes = themes
            .iter()
            .filter(|(_, tally)| tally.is_preferred())
            .map(|(theme, _)| theme.clone())
            .collect();

        Self {
            total_attempts,
            correct_attempts,
            success_rate,
            themes,
            preferred_themes,
            preferred_difficulty: Difficulty::for_success_rate(success_rate),
            solved,
        }
    }

    /// Whether the user has solved the puzzle at least once.
    #[must_use]
    pub fn has_solved(&self, puzzle_id: PuzzleId) -> bool {
        self.solved.contains(&puzzle_id)
    }
}
