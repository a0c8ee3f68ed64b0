//! Domain events emitted after state changes.
//!
//! Events are broadcast through the [`super::EventBus`] to WebSocket
//! subscribers such as the minting service.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{AttemptId, MintReference, PuzzleId, WalletAddress};

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PuzzleEvent {
    /// A puzzle was bound to a calendar day for the first time.
    DailyPuzzleAssigned {
        /// Calendar date of the assignment.
        date: NaiveDate,
        /// Assigned puzzle.
        puzzle_id: PuzzleId,
        /// Assignment timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An attempt was recorded.
    AttemptSubmitted {
        /// New attempt.
        attempt_id: AttemptId,
        /// Submitting wallet.
        wallet: WalletAddress,
        /// Target puzzle.
        puzzle_id: PuzzleId,
        /// 1-based attempt number.
        attempt_number: u32,
        /// Whether the move was correct.
        is_correct: bool,
        /// Attempts left on this puzzle.
        remaining_attempts: u32,
        /// Submission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A mint reference was attached to an attempt.
    MintReferenceAttached {
        /// Patched attempt.
        attempt_id: AttemptId,
        /// Owner of the attempt.
        wallet: WalletAddress,
        /// Attached reference.
        reference: MintReference,
        /// Patch timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A recommendation was produced.
    RecommendationIssued {
        /// Wallet the recommendation was made for.
        wallet: WalletAddress,
        /// Recommended puzzle.
        puzzle_id: PuzzleId,
        /// Machine-readable reason kind.
        reason_kind: String,
        /// Recommendation timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl PuzzleEvent {
    /// Returns the wallet this event concerns, if any.
    #[must_use]
    pub fn wallet(&self) -> Option<&WalletAddress> {
        match self {
            Self::DailyPuzzleAssigned { .. } => None,
            Self::AttemptSubmitted { wallet, .. }
            | Self::MintReferenceAttached { wallet, .. }
            | Self::RecommendationIssued { wallet, .. } => Some(wallet),
        }
    }

    /// Returns the event type as a snake_case string.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::DailyPuzzleAssigned { .. } => "daily_puzzle_assigned",
            Self::AttemptSubmitted { .. } => "attempt_submitted",
            Self::MintReferenceAttached { .. } => "mint_reference_attached",
            Self::RecommendationIssued { .. } => "recommendation_issued",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn attempt_submitted_serializes_with_tag() {
        let event = PuzzleEvent::AttemptSubmitted {
            attempt_id: AttemptId::new(),
            wallet: WalletAddress::new_unchecked("0xabc"),
            puzzle_id: PuzzleId::new(7),
            attempt_number: 2,
            is_correct: true,
            remaining_attempts: 1,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "attempt_submitted");
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"attempt_submitted\""));
        assert!(json.contains("\"wallet\":\"0xabc\""));
    }

    #[test]
    fn daily_assignment_has_no_wallet() {
        let Some(date) = NaiveDate::from_ymd_opt(2025, 1, 1) else {
            panic!("valid date");
        };
        let event = PuzzleEvent::DailyPuzzleAssigned {
            date,
            puzzle_id: PuzzleId::new(10),
            timestamp: Utc::now(),
        };
        assert!(event.wallet().is_none());
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("2025-01-01"));
    }
}
