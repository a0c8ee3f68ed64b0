//! Storage layer: the [`Repository`] contract and its implementations.
//!
//! Business logic only ever talks to `dyn Repository`. The in-memory
//! implementation backs tests and single-node deployments; the
//! PostgreSQL implementation backs production.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

use async_trait::async_trait;

use crate::domain::{
    Attempt, AttemptDraft, AttemptId, DailyAssignment, Difficulty, EpochDay, MintReference,
    ProfileSnapshot, Puzzle, PuzzleId, User, WalletAddress,
};
use crate::error::PuzzleError;

/// Predicate for [`Repository::scan_puzzles`]. `None` fields match all.
#[derive(Debug, Clone, Default)]
pub struct PuzzleFilter {
    /// Only puzzles of this tier.
    pub difficulty: Option<Difficulty>,
    /// Only puzzles tagged with this theme.
    pub theme: Option<String>,
}

impl PuzzleFilter {
    /// Matches every puzzle.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns `true` if `puzzle` satisfies the filter.
    #[must_use]
    pub fn matches(&self, puzzle: &Puzzle) -> bool {
        self.difficulty.is_none_or(|d| puzzle.difficulty() == d)
            && self.theme.as_deref().is_none_or(|t| puzzle.has_theme(t))
    }
}

/// Predicate for [`Repository::scan_attempts`]. `None` fields match all.
#[derive(Debug, Clone, Default)]
pub struct AttemptFilter {
    /// Only attempts by this wallet.
    pub wallet: Option<WalletAddress>,
    /// Only attempts on this puzzle.
    pub puzzle_id: Option<PuzzleId>,
    /// Only correct (or only incorrect) attempts.
    pub is_correct: Option<bool>,
}

impl AttemptFilter {
    /// All attempts by one wallet.
    #[must_use]
    pub fn by_wallet(wallet: &WalletAddress) -> Self {
        Self {
            wallet: Some(wallet.clone()),
            ..Self::default()
        }
    }

    /// All attempts by one wallet on one puzzle.
    #[must_use]
    pub fn by_pair(wallet: &WalletAddress, puzzle_id: PuzzleId) -> Self {
        Self {
            wallet: Some(wallet.clone()),
            puzzle_id: Some(puzzle_id),
            is_correct: None,
        }
    }

    /// Returns `true` if `attempt` satisfies the filter.
    #[must_use]
    pub fn matches(&self, attempt: &Attempt) -> bool {
        self.wallet.as_ref().is_none_or(|w| attempt.wallet == *w)
            && self.puzzle_id.is_none_or(|p| attempt.puzzle_id == p)
            && self.is_correct.is_none_or(|c| attempt.is_correct == c)
    }
}

/// Keyed storage for puzzles, users, attempts and daily assignments.
///
/// Absence is always `Ok(None)`, never an error. Every write is atomic
/// per entity; the conditional operations (`insert_*_if_absent`,
/// `append_attempt`, `attach_mint_reference`) are atomic as a whole.
/// User writes update disjoint column sets, so a profile refresh and a
/// rename never overwrite each other.
#[async_trait]
pub trait Repository: Send + Sync + std::fmt::Debug {
    /// Inserts a puzzle unless its id already exists.
    ///
    /// Returns `false` (leaving the stored puzzle untouched) if it did.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::PersistenceError`] on storage failure.
    async fn insert_puzzle(&self, puzzle: Puzzle) -> Result<bool, PuzzleError>;

    /// Looks up a puzzle.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::PersistenceError`] on storage failure.
    async fn get_puzzle(&self, id: PuzzleId) -> Result<Option<Puzzle>, PuzzleError>;

    /// Returns matching puzzles ordered by ascending id.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::PersistenceError`] on storage failure.
    async fn scan_puzzles(&self, filter: &PuzzleFilter) -> Result<Vec<Puzzle>, PuzzleError>;

    /// Looks up a user.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::PersistenceError`] on storage failure.
    async fn get_user(&self, wallet: &WalletAddress) -> Result<Option<User>, PuzzleError>;

    /// Stores `user` unless the wallet is known; returns the stored user.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::PersistenceError`] on storage failure.
    async fn insert_user_if_absent(&self, user: User) -> Result<User, PuzzleError>;

    /// Writes the profile columns of a user, creating the user if needed,
    /// and returns the stored row. The display name is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::PersistenceError`] on storage failure.
    async fn save_profile(
        &self,
        wallet: &WalletAddress,
        snapshot: &ProfileSnapshot,
    ) -> Result<User, PuzzleError>;

    /// Sets a user's display name, creating the user if needed, and
    /// returns the stored row. Profile columns are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::PersistenceError`] on storage failure.
    async fn set_display_name(
        &self,
        wallet: &WalletAddress,
        display_name: &str,
    ) -> Result<User, PuzzleError>;

    /// Looks up an attempt.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::PersistenceError`] on storage failure.
    async fn get_attempt(&self, id: AttemptId) -> Result<Option<Attempt>, PuzzleError>;

    /// Returns matching attempts ordered by creation time, then attempt
    /// number.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::PersistenceError`] on storage failure.
    async fn scan_attempts(&self, filter: &AttemptFilter) -> Result<Vec<Attempt>, PuzzleError>;

    /// Appends an attempt numbered one past the pair's current count.
    ///
    /// Counting and inserting happen atomically with respect to other
    /// appends for the same (wallet, puzzle) pair.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::AttemptsExhausted`] if the pair already has
    /// `limit` attempts, or [`PuzzleError::PersistenceError`] on storage
    /// failure.
    async fn append_attempt(&self, draft: AttemptDraft, limit: u32)
    -> Result<Attempt, PuzzleError>;

    /// Attaches a mint reference to an attempt; `Ok(None)` if the attempt
    /// does not exist. Re-attaching the same reference is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::MintAlreadyAttached`] if a different
    /// reference is present, or [`PuzzleError::PersistenceError`] on
    /// storage failure.
    async fn attach_mint_reference(
        &self,
        id: AttemptId,
        reference: MintReference,
    ) -> Result<Option<Attempt>, PuzzleError>;

    /// Looks up the assignment for a day.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::PersistenceError`] on storage failure.
    async fn get_assignment(&self, day: EpochDay) -> Result<Option<DailyAssignment>, PuzzleError>;

    /// Stores `assignment` unless its day is already bound; returns the
    /// binding that survives.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::PersistenceError`] on storage failure.
    async fn insert_assignment_if_absent(
        &self,
        assignment: DailyAssignment,
    ) -> Result<DailyAssignment, PuzzleError>;
}
