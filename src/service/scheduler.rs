//! Daily scheduler: binds each calendar day to one catalog puzzle.

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{DailyAssignment, EpochDay, EventBus, Puzzle, PuzzleEvent, PuzzleView};
use crate::error::PuzzleError;
use crate::repository::{PuzzleFilter, Repository};

/// The puzzle served on a given day.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyPuzzle {
    /// Calendar date (server local day).
    pub date: NaiveDate,
    /// Day key the assignment is stored under.
    pub epoch_day: EpochDay,
    /// The puzzle, without its solution.
    pub puzzle: PuzzleView,
}

/// Deterministic, lazily persisted daily assignment.
///
/// A day with no binding gets catalog index `epoch_day mod catalog_len`
/// (catalog ordered by id), so every process computes the same puzzle for
/// the same day. The first binding written wins and is never recomputed.
#[derive(Debug, Clone)]
pub struct DailyScheduler {
    repository: Arc<dyn Repository>,
    event_bus: EventBus,
}

impl DailyScheduler {
    /// Creates a new `DailyScheduler`.
    #[must_use]
    pub fn new(repository: Arc<dyn Repository>, event_bus: EventBus) -> Self {
        Self {
            repository,
            event_bus,
        }
    }

    /// Today's date at the server's local day boundary.
    #[must_use]
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Puzzle for today.
    ///
    /// # Errors
    ///
    /// See [`DailyScheduler::get_or_assign`].
    pub async fn todays_puzzle(&self) -> Result<DailyPuzzle, PuzzleError> {
        self.get_or_assign(Self::today()).await
    }

    /// Puzzle for a past date or today.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidRequest`] for future dates, otherwise
    /// see [`DailyScheduler::get_or_assign`].
    pub async fn puzzle_for_date(&self, date: NaiveDate) -> Result<DailyPuzzle, PuzzleError> {
        if date > Self::today() {
            return Err(PuzzleError::InvalidRequest(format!(
                "daily puzzle for {date} is not available yet"
            )));
        }
        self.get_or_assign(date).await
    }

    /// Returns the puzzle bound to `date`, binding one first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::NoPuzzlesAvailable`] if the catalog is
    /// empty, [`PuzzleError::Internal`] if a stored binding points at a
    /// missing puzzle, or a repository error.
    pub async fn get_or_assign(&self, date: NaiveDate) -> Result<DailyPuzzle, PuzzleError> {
        let day = EpochDay::from_date(date);

        if let Some(assignment) = self.repository.get_assignment(day).await? {
            let puzzle = self.assigned_puzzle(&assignment).await?;
            return Ok(DailyPuzzle {
                date,
                epoch_day: day,
                puzzle: puzzle.view(),
            });
        }

        let catalog = self.repository.scan_puzzles(&PuzzleFilter::all()).await?;
        let Some(index) = day.catalog_index(catalog.len()) else {
            tracing::error!(%date, "catalog is empty; cannot assign a daily puzzle");
            return Err(PuzzleError::NoPuzzlesAvailable);
        };
        let chosen = catalog
            .get(index)
            .ok_or_else(|| PuzzleError::Internal(format!("catalog index {index} out of range")))?;

        let stored = self
            .repository
            .insert_assignment_if_absent(DailyAssignment::new(day, chosen.id()))
            .await?;

        let puzzle = if stored.puzzle_id == chosen.id() {
            chosen.clone()
        } else {
            // Another writer bound the day from a different catalog snapshot.
            self.assigned_puzzle(&stored).await?
        };

        tracing::info!(%date, epoch_day = %day, puzzle_id = %puzzle.id(), "daily puzzle assigned");
        let _ = self.event_bus.publish(PuzzleEvent::DailyPuzzleAssigned {
            date,
            puzzle_id: puzzle.id(),
            timestamp: Utc::now(),
        });

        Ok(DailyPuzzle {
            date,
            epoch_day: day,
            puzzle: puzzle.view(),
        })
    }

    async fn assigned_puzzle(&self, assignment: &DailyAssignment) -> Result<Puzzle, PuzzleError> {
        self.repository
            .get_puzzle(assignment.puzzle_id)
            .await?
            .ok_or_else(|| {
                PuzzleError::Internal(format!(
                    "day {} is bound to missing puzzle {}",
                    assignment.day, assignment.puzzle_id
                ))
            })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::domain::PuzzleId;
    use crate::domain::puzzle::{Difficulty, PuzzleRecord, Side};
    use crate::repository::InMemoryRepository;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
            panic!("valid date");
        };
        date
    }

    async fn seeded_repo() -> Arc<InMemoryRepository> {
        let repo = Arc::new(InMemoryRepository::new());
        let Ok(puzzles) = catalog::builtin_catalog() else {
            panic!("builtin catalog invalid");
        };
        let Ok(_) = catalog::seed(repo.as_ref(), puzzles).await else {
            panic!("seeding failed");
        };
        repo
    }

    fn scheduler(repo: &Arc<InMemoryRepository>) -> DailyScheduler {
        let repository: Arc<dyn Repository> = Arc::clone(repo) as Arc<dyn Repository>;
        DailyScheduler::new(repository, EventBus::new(16))
    }

    #[tokio::test]
    async fn new_year_2025_maps_to_computed_index() {
        let repo = seeded_repo().await;
        let day = date(2025, 1, 1);
        // 20089 mod 10 = 9 -> tenth puzzle in id order.
        let expected_index = EpochDay::from_date(day).catalog_index(10);
        assert_eq!(expected_index, Some(9));

        let Ok(daily) = scheduler(&repo).get_or_assign(day).await else {
            panic!("assignment failed");
        };
        assert_eq!(daily.epoch_day.get(), 20_089);
        assert_eq!(daily.puzzle.id, PuzzleId::new(10));
    }

    #[tokio::test]
    async fn same_date_returns_same_puzzle() {
        let repo = seeded_repo().await;
        let s = scheduler(&repo);
        let day = date(2024, 6, 15);
        let Ok(first) = s.get_or_assign(day).await else {
            panic!("assignment failed");
        };
        let Ok(second) = s.get_or_assign(day).await else {
            panic!("assignment failed");
        };
        assert_eq!(first.puzzle.id, second.puzzle.id);
    }

    #[tokio::test]
    async fn persisted_binding_survives_restart_and_catalog_growth() {
        let repo = seeded_repo().await;
        let day = date(2025, 1, 1);
        let Ok(before) = scheduler(&repo).get_or_assign(day).await else {
            panic!("assignment failed");
        };

        // Growing the catalog changes what the formula would compute today...
        let extra = PuzzleRecord {
            id: 11,
            fen: "8/8/8/8/8/8/8/K6k w - - 0 1".to_string(),
            side_to_move: Side::White,
            difficulty: Difficulty::Easy,
            themes: vec!["endgame".to_string()],
            solution: "Kb2".to_string(),
            popularity: None,
            success_rate: None,
        };
        let Ok(extra) = Puzzle::try_from(extra) else {
            panic!("valid puzzle");
        };
        let _ = repo.insert_puzzle(extra).await;
        assert_eq!(EpochDay::from_date(day).catalog_index(11), Some(3));

        // ...but a fresh scheduler over the same store keeps the binding.
        let Ok(after) = scheduler(&repo).get_or_assign(day).await else {
            panic!("assignment failed");
        };
        assert_eq!(before.puzzle.id, after.puzzle.id);
    }

    #[tokio::test]
    async fn empty_catalog_is_no_puzzles_available() {
        let repo = Arc::new(InMemoryRepository::new());
        let result = scheduler(&repo).get_or_assign(date(2025, 1, 1)).await;
        assert!(matches!(result, Err(PuzzleError::NoPuzzlesAvailable)));
    }

    #[tokio::test]
    async fn future_dates_are_rejected() {
        let repo = seeded_repo().await;
        let Some(tomorrow) = DailyScheduler::today().succ_opt() else {
            panic!("date overflow");
        };
        let result = scheduler(&repo).puzzle_for_date(tomorrow).await;
        assert!(matches!(result, Err(PuzzleError::InvalidRequest(_))));
        assert!(scheduler(&repo).todays_puzzle().await.is_ok());
    }

    #[tokio::test]
    async fn first_assignment_emits_event() {
        let repo = seeded_repo().await;
        let s = scheduler(&repo);
        let mut rx = s.event_bus.subscribe();
        let Ok(_) = s.get_or_assign(date(2025, 3, 9)).await else {
            panic!("assignment failed");
        };
        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "daily_puzzle_assigned");

        let Ok(_) = s.get_or_assign(date(2025, 3, 9)).await else {
            panic!("assignment failed");
        };
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn concurrent_first_requests_agree() {
        let repo = seeded_repo().await;
        let s = scheduler(&repo);
        let day = date(2025, 7, 4);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let s = s.clone();
            handles.push(tokio::spawn(async move { s.get_or_assign(day).await }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            let Ok(Ok(daily)) = handle.await else {
                panic!("task failed");
            };
            ids.push(daily.puzzle.id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
    }
}
