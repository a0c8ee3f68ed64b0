//! Recommendation engine: turns attempt history into a puzzle pick.
//!
//! Candidate tiers, each limited to puzzles the user has not solved:
//!
//! 1. target difficulty and a preferred theme
//! 2. target difficulty
//! 3. one tier easier
//! 4. anything unsolved
//! 5. anything in the catalog (the user has solved everything)
//!
//! The first non-empty tier wins and the pick within it is uniform.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    Difficulty, EventBus, ProfileSnapshot, Puzzle, PuzzleEvent, PuzzleView, SkillProfile, User,
    WalletAddress,
};
use crate::error::PuzzleError;
use crate::repository::{AttemptFilter, PuzzleFilter, Repository};

/// Why a puzzle was recommended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationReason {
    /// Target difficulty and one of the user's strong themes.
    ThemeMatch {
        /// Matched preferred theme.
        theme: String,
        /// Target difficulty.
        difficulty: Difficulty,
    },
    /// Target difficulty only.
    DifficultyFit {
        /// Target difficulty.
        difficulty: Difficulty,
    },
    /// One tier below the target.
    SkillBuilding {
        /// Difficulty of the recommended puzzle.
        difficulty: Difficulty,
    },
    /// Any puzzle the user has not solved.
    NewPuzzle,
    /// The user solved the whole catalog; this one is a repeat.
    Revisit,
}

impl RecommendationReason {
    /// Stable machine-readable name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ThemeMatch { .. } => "theme_match",
            Self::DifficultyFit { .. } => "difficulty_fit",
            Self::SkillBuilding { .. } => "skill_building",
            Self::NewPuzzle => "new_puzzle",
            Self::Revisit => "revisit",
        }
    }
}

impl fmt::Display for RecommendationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThemeMatch { theme, difficulty } => {
                write!(f, "Sharpen your {theme} skills with a {difficulty} puzzle")
            }
            Self::DifficultyFit { difficulty } => {
                write!(f, "Matched to your {difficulty} skill level")
            }
            Self::SkillBuilding { difficulty } => {
                write!(f, "A {difficulty} puzzle to build your skills")
            }
            Self::NewPuzzle => f.write_str("A new puzzle for you"),
            Self::Revisit => f.write_str("You've solved every puzzle! Here's one to revisit"),
        }
    }
}

/// A recommended puzzle and the refreshed profile behind it.
#[derive(Debug, Clone)]
pub struct Recommendation {
    /// Recommended puzzle, without its solution.
    pub puzzle: PuzzleView,
    /// Why it was chosen.
    pub reason: RecommendationReason,
    /// The user record with the freshly derived profile.
    pub user: User,
}

/// Serializable form of a [`Recommendation`].
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecommendationResponse {
    /// Recommended puzzle, without its solution.
    pub puzzle: PuzzleView,
    /// Human-readable reason.
    pub reason: String,
    /// Machine-readable reason (`theme_match`, `difficulty_fit`, ...).
    pub reason_kind: String,
    /// Refreshed profile.
    pub profile: User,
}

impl From<Recommendation> for RecommendationResponse {
    fn from(rec: Recommendation) -> Self {
        Self {
            puzzle: rec.puzzle,
            reason: rec.reason.to_string(),
            reason_kind: rec.reason.kind().to_string(),
            profile: rec.user,
        }
    }
}

/// Picks a puzzle for `profile` from `catalog`.
///
/// Returns `None` only for an empty catalog.
pub fn select_puzzle<'a, R>(
    profile: &SkillProfile,
    catalog: &'a [Puzzle],
    rng: &mut R,
) -> Option<(&'a Puzzle, RecommendationReason)>
where
    R: Rng + ?Sized,
{
    let target = profile.preferred_difficulty;
    let unsolved: Vec<&Puzzle> = catalog
        .iter()
        .filter(|p| !profile.has_solved(p.id()))
        .collect();

    let themed: Vec<&Puzzle> = unsolved
        .iter()
        .copied()
        .filter(|p| p.difficulty() == target)
        .filter(|p| profile.preferred_themes.iter().any(|t| p.has_theme(t)))
        .collect();
    if let Some(&puzzle) = themed.choose(rng) {
        let theme = profile
            .preferred_themes
            .iter()
            .find(|t| puzzle.has_theme(t))
            .cloned()
            .unwrap_or_default();
        return Some((
            puzzle,
            RecommendationReason::ThemeMatch {
                theme,
                difficulty: target,
            },
        ));
    }

    let fitting: Vec<&Puzzle> = unsolved
        .iter()
        .copied()
        .filter(|p| p.difficulty() == target)
        .collect();
    if let Some(&puzzle) = fitting.choose(rng) {
        return Some((puzzle, RecommendationReason::DifficultyFit { difficulty: target }));
    }

    let easier = target.easier();
    let building: Vec<&Puzzle> = unsolved
        .iter()
        .copied()
        .filter(|p| p.difficulty() == easier)
        .collect();
    if let Some(&puzzle) = building.choose(rng) {
        return Some((puzzle, RecommendationReason::SkillBuilding { difficulty: easier }));
    }

    if let Some(&puzzle) = unsolved.choose(rng) {
        return Some((puzzle, RecommendationReason::NewPuzzle));
    }

    catalog
        .choose(rng)
        .map(|puzzle| (puzzle, RecommendationReason::Revisit))
}

/// Builds skill profiles and recommends puzzles.
#[derive(Debug)]
pub struct RecommendationEngine {
    repository: Arc<dyn Repository>,
    event_bus: EventBus,
    rng: Mutex<StdRng>,
}

impl RecommendationEngine {
    /// Creates an engine with an entropy-seeded RNG.
    #[must_use]
    pub fn new(repository: Arc<dyn Repository>, event_bus: EventBus) -> Self {
        Self::with_rng(repository, event_bus, StdRng::from_entropy())
    }

    /// Creates an engine with a deterministic RNG.
    #[must_use]
    pub fn with_seed(repository: Arc<dyn Repository>, event_bus: EventBus, seed: u64) -> Self {
        Self::with_rng(repository, event_bus, StdRng::seed_from_u64(seed))
    }

    fn with_rng(repository: Arc<dyn Repository>, event_bus: EventBus, rng: StdRng) -> Self {
        Self {
            repository,
            event_bus,
            rng: Mutex::new(rng),
        }
    }

    /// Recomputes the user's profile, stores it, and recommends a puzzle.
    ///
    /// Unknown wallets get a fresh profile and a new user record.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NoPuzzlesAvailable`] for an empty catalog,
    /// or a repository error.
    pub async fn recommend(&self, wallet: &WalletAddress) -> Result<Recommendation, PuzzleError> {
        let catalog = self.repository.scan_puzzles(&PuzzleFilter::all()).await?;
        if catalog.is_empty() {
            tracing::error!(%wallet, "catalog is empty; cannot recommend a puzzle");
            return Err(PuzzleError::NoPuzzlesAvailable);
        }
        let attempts = self
            .repository
            .scan_attempts(&AttemptFilter::by_wallet(wallet))
            .await?;
        let profile = SkillProfile::derive(&attempts, &catalog);

        let user = self
            .repository
            .save_profile(wallet, &ProfileSnapshot::from_profile(&profile, Utc::now()))
            .await?;

        let (puzzle, reason) = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            select_puzzle(&profile, &catalog, &mut *rng)
                .map(|(p, r)| (p.view(), r))
                .ok_or(PuzzleError::NoPuzzlesAvailable)?
        };

        tracing::info!(
            %wallet,
            puzzle_id = %puzzle.id,
            reason = reason.kind(),
            success_rate = profile.success_rate,
            difficulty = %profile.preferred_difficulty,
            "recommendation issued"
        );
        let _ = self.event_bus.publish(PuzzleEvent::RecommendationIssued {
            wallet: wallet.clone(),
            puzzle_id: puzzle.id,
            reason_kind: reason.kind().to_string(),
            timestamp: Utc::now(),
        });

        Ok(Recommendation {
            puzzle,
            reason,
            user,
        })
    }
}
