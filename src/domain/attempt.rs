//! Scored attempts against a puzzle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AttemptId, PuzzleId, WalletAddress};
use crate::error::PuzzleError;

/// Maximum number of attempts a user may make on a single puzzle.
pub const MAX_ATTEMPTS: u32 = 3;

/// Longest accepted mint reference.
const MINT_REFERENCE_MAX_LEN: usize = 256;

/// Opaque reference to an artifact minted for an attempt (e.g. a token
/// id or transaction hash). Produced by an external minting service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct MintReference(String);

impl MintReference {
    /// Validates a mint reference.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidRequest`] if the reference is blank
    /// or longer than 256 characters.
    pub fn parse(raw: &str) -> Result<Self, PuzzleError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.len() > MINT_REFERENCE_MAX_LEN {
            return Err(PuzzleError::InvalidRequest(format!(
                "mint reference must be 1-{MINT_REFERENCE_MAX_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the reference string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MintReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MintReference {
    type Error = PuzzleError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<MintReference> for String {
    fn from(reference: MintReference) -> Self {
        reference.0
    }
}

/// A recorded attempt.
///
/// Immutable after creation except for [`Attempt::mint_reference`],
/// which the minting service attaches later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attempt {
    /// Attempt identifier.
    pub id: AttemptId,
    /// Wallet of the user who made the attempt.
    pub wallet: WalletAddress,
    /// Puzzle the attempt targeted.
    pub puzzle_id: PuzzleId,
    /// Move as submitted (trimmed).
    pub submitted_move: String,
    /// Whether the move matched the solution.
    pub is_correct: bool,
    /// Seconds the user spent before submitting.
    pub elapsed_seconds: u32,
    /// 1-based position within the (wallet, puzzle) pair.
    pub attempt_number: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Reference to a minted artifact, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint_reference: Option<MintReference>,
}

/// Everything needed to append an attempt except its number, which the
/// repository assigns atomically.
#[derive(Debug, Clone)]
pub struct AttemptDraft {
    /// Wallet of the submitting user.
    pub wallet: WalletAddress,
    /// Target puzzle.
    pub puzzle_id: PuzzleId,
    /// Submitted move (trimmed).
    pub submitted_move: String,
    /// Correctness computed before the append.
    pub is_correct: bool,
    /// Seconds spent.
    pub elapsed_seconds: u32,
}

impl AttemptDraft {
    /// Turns the draft into an attempt with the given number, stamped now.
    #[must_use]
    pub fn into_attempt(self, attempt_number: u32) -> Attempt {
        Attempt {
            id: AttemptId::new(),
            wallet: self.wallet,
            puzzle_id: self.puzzle_id,
            submitted_move: self.submitted_move,
            is_correct: self.is_correct,
            elapsed_seconds: self.elapsed_seconds,
            attempt_number,
            created_at: Utc::now(),
            mint_reference: None,
        }
    }
}

/// Attempts left after `used` attempts.
#[must_use]
pub fn remaining_attempts(used: usize) -> u32 {
    let used = u32::try_from(used).unwrap_or(u32::MAX);
    MAX_ATTEMPTS.saturating_sub(used)
}

/// The fastest correct attempt; ties go to the earlier attempt.
///
/// Returns `None` when no attempt is correct: an incorrect attempt is
/// never "best".
#[must_use]
pub fn best_attempt<'a, I>(attempts: I) -> Option<&'a Attempt>
where
    I: IntoIterator<Item = &'a Attempt>,
{
    attempts
        .into_iter()
        .filter(|a| a.is_correct)
        .min_by_key(|a| (a.elapsed_seconds, a.attempt_number))
}
