//! In-memory repository.
//!
//! Each collection sits behind its own [`tokio::sync::RwLock`]. Attempts
//! and their (wallet, puzzle) index share one lock so that counting and
//! appending happen in a single critical section.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AttemptFilter, PuzzleFilter, Repository};
use crate::domain::{
    Attempt, AttemptDraft, AttemptId, DailyAssignment, EpochDay, MintReference, ProfileSnapshot,
    Puzzle, PuzzleId, User, WalletAddress,
};
use crate::error::PuzzleError;

/// Attempts plus the secondary index by (wallet, puzzle).
#[derive(Debug, Default)]
struct AttemptTable {
    by_id: HashMap<AttemptId, Attempt>,
    by_pair: HashMap<(WalletAddress, PuzzleId), Vec<AttemptId>>,
}

impl AttemptTable {
    fn pair_count(&self, wallet: &WalletAddress, puzzle_id: PuzzleId) -> usize {
        self.by_pair
            .get(&(wallet.clone(), puzzle_id))
            .map_or(0, Vec::len)
    }
}

/// Repository backed by process memory.
///
/// # Concurrency
///
/// - Reads of the same collection run concurrently.
/// - Writes to different collections are concurrent.
/// - Writes to the same collection are serialized.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    puzzles: RwLock<BTreeMap<PuzzleId, Puzzle>>,
    users: RwLock<HashMap<WalletAddress, User>>,
    attempts: RwLock<AttemptTable>,
    assignments: RwLock<HashMap<EpochDay, DailyAssignment>>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert_puzzle(&self, puzzle: Puzzle) -> Result<bool, PuzzleError> {
        let mut map = self.puzzles.write().await;
        if map.contains_key(&puzzle.id()) {
            return Ok(false);
        }
        map.insert(puzzle.id(), puzzle);
        Ok(true)
    }

    async fn get_puzzle(&self, id: PuzzleId) -> Result<Option<Puzzle>, PuzzleError> {
        Ok(self.puzzles.read().await.get(&id).cloned())
    }

    async fn scan_puzzles(&self, filter: &PuzzleFilter) -> Result<Vec<Puzzle>, PuzzleError> {
        // BTreeMap iteration is already ordered by id.
        let map = self.puzzles.read().await;
        Ok(map.values().filter(|p| filter.matches(p)).cloned().collect())
    }

    async fn get_user(&self, wallet: &WalletAddress) -> Result<Option<User>, PuzzleError> {
        Ok(self.users.read().await.get(wallet).cloned())
    }

    async fn insert_user_if_absent(&self, user: User) -> Result<User, PuzzleError> {
        let mut map = self.users.write().await;
        let stored = map.entry(user.wallet.clone()).or_insert(user);
        Ok(stored.clone())
    }

    async fn save_profile(
        &self,
        wallet: &WalletAddress,
        snapshot: &ProfileSnapshot,
    ) -> Result<User, PuzzleError> {
        let mut map = self.users.write().await;
        let user = map
            .entry(wallet.clone())
            .or_insert_with(|| User::new(wallet.clone()));
        user.apply_snapshot(snapshot);
        Ok(user.clone())
    }

    async fn set_display_name(
        &self,
        wallet: &WalletAddress,
        display_name: &str,
    ) -> Result<User, PuzzleError> {
        let mut map = self.users.write().await;
        let user = map
            .entry(wallet.clone())
            .or_insert_with(|| User::new(wallet.clone()));
        user.display_name = Some(display_name.to_string());
        Ok(user.clone())
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Option<Attempt>, PuzzleError> {
        Ok(self.attempts.read().await.by_id.get(&id).cloned())
    }

    async fn scan_attempts(&self, filter: &AttemptFilter) -> Result<Vec<Attempt>, PuzzleError> {
        let table = self.attempts.read().await;
        let mut found: Vec<Attempt> = match (&filter.wallet, filter.puzzle_id) {
            (Some(wallet), Some(puzzle_id)) => table
                .by_pair
                .get(&(wallet.clone(), puzzle_id))
                .into_iter()
                .flatten()
                .filter_map(|id| table.by_id.get(id))
                .filter(|a| filter.matches(a))
                .cloned()
                .collect(),
            _ => table
                .by_id
                .values()
                .filter(|a| filter.matches(a))
                .cloned()
                .collect(),
        };
        found.sort_by_key(|a| (a.created_at, a.attempt_number));
        Ok(found)
    }

    async fn append_attempt(
        &self,
        draft: AttemptDraft,
        limit: u32,
    ) -> Result<Attempt, PuzzleError> {
        let mut table = self.attempts.write().await;
        let count = table.pair_count(&draft.wallet, draft.puzzle_id);
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        if count >= limit {
            return Err(PuzzleError::AttemptsExhausted {
                wallet: draft.wallet,
                puzzle_id: draft.puzzle_id,
                limit,
            });
        }

        let attempt = draft.into_attempt(count.saturating_add(1));
        table
            .by_pair
            .entry((attempt.wallet.clone(), attempt.puzzle_id))
            .or_default()
            .push(attempt.id);
        table.by_id.insert(attempt.id, attempt.clone());
        Ok(attempt)
    }

    async fn attach_mint_reference(
        &self,
        id: AttemptId,
        reference: MintReference,
    ) -> Result<Option<Attempt>, PuzzleError> {
        let mut table = self.attempts.write().await;
        let Some(attempt) = table.by_id.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(existing) = &attempt.mint_reference
            && *existing != reference
        {
            return Err(PuzzleError::MintAlreadyAttached(id));
        }
        attempt.mint_reference = Some(reference);
        Ok(Some(attempt.clone()))
    }

    async fn get_assignment(&self, day: EpochDay) -> Result<Option<DailyAssignment>, PuzzleError> {
        Ok(self.assignments.read().await.get(&day).cloned())
    }

    async fn insert_assignment_if_absent(
        &self,
        assignment: DailyAssignment,
    ) -> Result<DailyAssignment, PuzzleError> {
        let mut map = self.assignments.write().await;
        let stored = map.entry(assignment.day).or_insert(assignment);
        Ok(stored.clone())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::puzzle::{PuzzleRecord, Side};
    use crate::domain::{Difficulty, MAX_ATTEMPTS};

    fn puzzle(id: u32, difficulty: Difficulty, themes: &[&str]) -> Puzzle {
        let record = PuzzleRecord {
            id,
            fen: "8/8/8/8/8/8/8/8 w - - 0 1".to_string(),
            side_to_move: Side::White,
            difficulty,
            themes: themes.iter().map(|t| (*t).to_string()).collect(),
            solution: "Kh1".to_string(),
            popularity: None,
            success_rate: None,
        };
        let Ok(p) = Puzzle::try_from(record) else {
            panic!("valid puzzle");
        };
        p
    }

    fn wallet(raw: &str) -> WalletAddress {
        let Ok(w) = WalletAddress::parse(raw) else {
            panic!("valid wallet");
        };
        w
    }

    fn draft(wallet_raw: &str, puzzle_id: u32, correct: bool) -> AttemptDraft {
        AttemptDraft {
            wallet: wallet(wallet_raw),
            puzzle_id: PuzzleId::new(puzzle_id),
            submitted_move: "Kh1".to_string(),
            is_correct: correct,
            elapsed_seconds: 10,
        }
    }

    #[tokio::test]
    async fn puzzles_are_immutable_once_inserted() {
        let repo = InMemoryRepository::new();
        assert!(matches!(
            repo.insert_puzzle(puzzle(1, Difficulty::Easy, &[])).await,
            Ok(true)
        ));
        assert!(matches!(
            repo.insert_puzzle(puzzle(1, Difficulty::Hard, &[])).await,
            Ok(false)
        ));
        let Ok(Some(stored)) = repo.get_puzzle(PuzzleId::new(1)).await else {
            panic!("puzzle missing");
        };
        assert_eq!(stored.difficulty(), Difficulty::Easy);
    }

    #[tokio::test]
    async fn missing_entities_are_none_not_errors() {
        let repo = InMemoryRepository::new();
        assert!(matches!(repo.get_puzzle(PuzzleId::new(9)).await, Ok(None)));
        assert!(matches!(repo.get_user(&wallet("0xnobody")).await, Ok(None)));
        assert!(matches!(repo.get_attempt(AttemptId::new()).await, Ok(None)));
        assert!(matches!(repo.get_assignment(EpochDay::new(1)).await, Ok(None)));
    }

    #[tokio::test]
    async fn scan_puzzles_orders_by_id_and_filters() {
        let repo = InMemoryRepository::new();
        for p in [
            puzzle(3, Difficulty::Medium, &["fork"]),
            puzzle(1, Difficulty::Easy, &["pin"]),
            puzzle(2, Difficulty::Medium, &["pin"]),
        ] {
            let _ = repo.insert_puzzle(p).await;
        }

        let Ok(all) = repo.scan_puzzles(&PuzzleFilter::all()).await else {
            panic!("scan failed");
        };
        let ids: Vec<u32> = all.iter().map(|p| p.id().get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let filter = PuzzleFilter {
            difficulty: Some(Difficulty::Medium),
            theme: Some("pin".to_string()),
        };
        let Ok(matched) = repo.scan_puzzles(&filter).await else {
            panic!("scan failed");
        };
        assert_eq!(matched.len(), 1);
        assert_eq!(matched.first().map(Puzzle::id), Some(PuzzleId::new(2)));
    }

    #[tokio::test]
    async fn append_numbers_attempts_and_enforces_limit() {
        let repo = InMemoryRepository::new();
        for expected in 1..=MAX_ATTEMPTS {
            let Ok(attempt) = repo.append_attempt(draft("0xa", 1, false), MAX_ATTEMPTS).await
            else {
                panic!("append failed");
            };
            assert_eq!(attempt.attempt_number, expected);
        }
        let result = repo.append_attempt(draft("0xa", 1, true), MAX_ATTEMPTS).await;
        assert!(matches!(result, Err(PuzzleError::AttemptsExhausted { limit: 3, .. })));

        // Other pairs are unaffected.
        let Ok(other) = repo.append_attempt(draft("0xa", 2, true), MAX_ATTEMPTS).await else {
            panic!("append failed");
        };
        assert_eq!(other.attempt_number, 1);
        let Ok(other_user) = repo.append_attempt(draft("0xb", 1, true), MAX_ATTEMPTS).await
        else {
            panic!("append failed");
        };
        assert_eq!(other_user.attempt_number, 1);
    }

    #[tokio::test]
    async fn scan_attempts_by_pair_and_correctness() {
        let repo = InMemoryRepository::new();
        let _ = repo.append_attempt(draft("0xa", 1, false), 3).await;
        let _ = repo.append_attempt(draft("0xa", 1, true), 3).await;
        let _ = repo.append_attempt(draft("0xa", 2, true), 3).await;
        let _ = repo.append_attempt(draft("0xb", 1, true), 3).await;

        let Ok(pair) = repo
            .scan_attempts(&AttemptFilter::by_pair(&wallet("0xa"), PuzzleId::new(1)))
            .await
        else {
            panic!("scan failed");
        };
        let numbers: Vec<u32> = pair.iter().map(|a| a.attempt_number).collect();
        assert_eq!(numbers, vec![1, 2]);

        let filter = AttemptFilter {
            is_correct: Some(true),
            ..AttemptFilter::by_wallet(&wallet("0xa"))
        };
        let Ok(correct) = repo.scan_attempts(&filter).await else {
            panic!("scan failed");
        };
        assert_eq!(correct.len(), 2);
        assert!(correct.iter().all(|a| a.is_correct));
    }

    #[tokio::test]
    async fn mint_reference_is_attached_once() {
        let repo = InMemoryRepository::new();
        let Ok(attempt) = repo.append_attempt(draft("0xa", 1, true), 3).await else {
            panic!("append failed");
        };
        let Ok(first) = MintReference::parse("token-1") else {
            panic!("valid reference");
        };
        let Ok(second) = MintReference::parse("token-2") else {
            panic!("valid reference");
        };

        let Ok(Some(patched)) = repo.attach_mint_reference(attempt.id, first.clone()).await else {
            panic!("attach failed");
        };
        assert_eq!(patched.mint_reference, Some(first.clone()));
        assert_eq!(patched.is_correct, attempt.is_correct);

        assert!(matches!(
            repo.attach_mint_reference(attempt.id, first).await,
            Ok(Some(_))
        ));
        assert!(matches!(
            repo.attach_mint_reference(attempt.id, second).await,
            Err(PuzzleError::MintAlreadyAttached(_))
        ));
        let Ok(third) = MintReference::parse("token-3") else {
            panic!("valid reference");
        };
        assert!(matches!(
            repo.attach_mint_reference(AttemptId::new(), third).await,
            Ok(None)
        ));
    }

    #[tokio::test]
    async fn first_assignment_for_a_day_survives() {
        let repo = InMemoryRepository::new();
        let day = EpochDay::new(20_089);
        let Ok(first) = repo
            .insert_assignment_if_absent(DailyAssignment::new(day, PuzzleId::new(10)))
            .await
        else {
            panic!("insert failed");
        };
        let Ok(second) = repo
            .insert_assignment_if_absent(DailyAssignment::new(day, PuzzleId::new(3)))
            .await
        else {
            panic!("insert failed");
        };
        assert_eq!(first, second);
        assert_eq!(second.puzzle_id, PuzzleId::new(10));
    }

    #[tokio::test]
    async fn insert_user_if_absent_keeps_existing_profile() {
        let repo = InMemoryRepository::new();
        let Ok(_) = repo.set_display_name(&wallet("0xa"), "Judit").await else {
            panic!("rename failed");
        };

        let Ok(stored) = repo.insert_user_if_absent(User::new(wallet("0xa"))).await else {
            panic!("insert failed");
        };
        assert_eq!(stored.display_name.as_deref(), Some("Judit"));
    }

    #[tokio::test]
    async fn profile_and_display_name_writes_are_disjoint() {
        let repo = InMemoryRepository::new();
        let w = wallet("0xa");
        let snapshot = ProfileSnapshot {
            success_rate: 85.0,
            puzzles_solved: 3,
            preferred_themes: vec!["fork".to_string()],
            preferred_difficulty: Difficulty::Hard,
            recommended_at: chrono::Utc::now(),
        };

        let Ok(created) = repo.save_profile(&w, &snapshot).await else {
            panic!("save failed");
        };
        assert!(created.display_name.is_none());

        let Ok(renamed) = repo.set_display_name(&w, "Judit").await else {
            panic!("rename failed");
        };
        assert_eq!(renamed.preferred_difficulty, Difficulty::Hard);
        assert_eq!(renamed.created_at, created.created_at);

        let Ok(refreshed) = repo.save_profile(&w, &snapshot).await else {
            panic!("save failed");
        };
        assert_eq!(refreshed.display_name.as_deref(), Some("Judit"));
        assert_eq!(refreshed.puzzles_solved, 3);
    }
}
