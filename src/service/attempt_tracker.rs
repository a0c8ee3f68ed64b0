//! Attempt tracker: scores submissions and enforces the attempt ceiling.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::attempt::{best_attempt, remaining_attempts};
use crate::domain::puzzle::validate_move;
use crate::domain::{
    Attempt, AttemptDraft, AttemptId, EventBus, MAX_ATTEMPTS, MintReference, PuzzleEvent,
    PuzzleId, User, WalletAddress,
};
use crate::error::PuzzleError;
use crate::repository::{AttemptFilter, Repository};

/// A user's standing on one puzzle.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttemptSummary {
    /// Attempts ordered by attempt number.
    pub attempts: Vec<Attempt>,
    /// Attempts still allowed.
    pub remaining_attempts: u32,
    /// Fastest correct attempt, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_attempt: Option<Attempt>,
}

/// Records attempts and answers questions about them.
///
/// The read-count-then-append sequence is delegated to
/// [`Repository::append_attempt`], which is atomic per (wallet, puzzle)
/// pair, so concurrent submissions can never share an attempt number or
/// exceed [`MAX_ATTEMPTS`].
#[derive(Debug, Clone)]
pub struct AttemptTracker {
    repository: Arc<dyn Repository>,
    event_bus: EventBus,
}

impl AttemptTracker {
    /// Creates a new `AttemptTracker`.
    #[must_use]
    pub fn new(repository: Arc<dyn Repository>, event_bus: EventBus) -> Self {
        Self {
            repository,
            event_bus,
        }
    }

    /// Scores and records a move.
    ///
    /// # Errors
    ///
    /// - [`PuzzleError::MalformedMove`] if the move fails format checks.
    /// - [`PuzzleError::PuzzleNotFound`] if the puzzle does not exist.
    /// - [`PuzzleError::AttemptsExhausted`] if three attempts exist already;
    ///   nothing is recorded in that case.
    pub async fn submit(
        &self,
        wallet: &WalletAddress,
        puzzle_id: PuzzleId,
        submitted_move: &str,
        elapsed_seconds: u32,
    ) -> Result<Attempt, PuzzleError> {
        let mv = validate_move(submitted_move)?;
        let puzzle = self
            .repository
            .get_puzzle(puzzle_id)
            .await?
            .ok_or(PuzzleError::PuzzleNotFound(puzzle_id))?;

        self.repository
            .insert_user_if_absent(User::new(wallet.clone()))
            .await?;

        let draft = AttemptDraft {
            wallet: wallet.clone(),
            puzzle_id,
            submitted_move: mv.to_string(),
            is_correct: puzzle.is_solved_by(mv),
            elapsed_seconds,
        };

        let attempt = match self.repository.append_attempt(draft, MAX_ATTEMPTS).await {
            Ok(attempt) => attempt,
            Err(err @ PuzzleError::AttemptsExhausted { .. }) => {
                tracing::warn!(%wallet, %puzzle_id, "attempt rejected: no attempts left");
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let remaining = MAX_ATTEMPTS.saturating_sub(attempt.attempt_number);
        tracing::info!(
            %wallet,
            %puzzle_id,
            attempt_number = attempt.attempt_number,
            is_correct = attempt.is_correct,
            remaining,
            "attempt recorded"
        );
        let _ = self.event_bus.publish(PuzzleEvent::AttemptSubmitted {
            attempt_id: attempt.id,
            wallet: wallet.clone(),
            puzzle_id,
            attempt_number: attempt.attempt_number,
            is_correct: attempt.is_correct,
            remaining_attempts: remaining,
            timestamp: Utc::now(),
        });

        Ok(attempt)
    }

    /// All attempts by `wallet` on `puzzle_id`, ordered by attempt number.
    ///
    /// # Errors
    ///
    /// Returns a repository error on storage failure.
    pub async fn list_attempts(
        &self,
        wallet: &WalletAddress,
        puzzle_id: PuzzleId,
    ) -> Result<Vec<Attempt>, PuzzleError> {
        let mut attempts = self
            .repository
            .scan_attempts(&AttemptFilter::by_pair(wallet, puzzle_id))
            .await?;
        attempts.sort_by_key(|a| a.attempt_number);
        Ok(attempts)
    }

    /// Fastest correct attempt by `wallet` on `puzzle_id`.
    ///
    /// # Errors
    ///
    /// Returns a repository error on storage failure.
    pub async fn best_attempt(
        &self,
        wallet: &WalletAddress,
        puzzle_id: PuzzleId,
    ) -> Result<Option<Attempt>, PuzzleError> {
        let attempts = self.list_attempts(wallet, puzzle_id).await?;
        Ok(best_attempt(&attempts).cloned())
    }

    /// Attempts, remaining count and best attempt in one read.
    ///
    /// # Errors
    ///
    /// Returns a repository error on storage failure.
    pub async fn summary(
        &self,
        wallet: &WalletAddress,
        puzzle_id: PuzzleId,
    ) -> Result<AttemptSummary, PuzzleError> {
        let attempts = self.list_attempts(wallet, puzzle_id).await?;
        Ok(AttemptSummary {
            remaining_attempts: remaining_attempts(attempts.len()),
            best_attempt: best_attempt(&attempts).cloned(),
            attempts,
        })
    }

    /// Attaches a mint reference produced by the minting service.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::AttemptNotFound`] if the attempt does not
    /// exist, or [`PuzzleError::MintAlreadyAttached`] if it carries a
    /// different reference.
    pub async fn attach_mint_reference(
        &self,
        attempt_id: AttemptId,
        reference: MintReference,
    ) -> Result<Attempt, PuzzleError> {
        let attempt = self
            .repository
            .attach_mint_reference(attempt_id, reference.clone())
            .await?
            .ok_or(PuzzleError::AttemptNotFound(attempt_id))?;

        tracing::info!(%attempt_id, %reference, "mint reference attached");
        let _ = self.event_bus.publish(PuzzleEvent::MintReferenceAttached {
            attempt_id,
            wallet: attempt.wallet.clone(),
            reference,
            timestamp: Utc::now(),
        });
        Ok(attempt)
    }
}
