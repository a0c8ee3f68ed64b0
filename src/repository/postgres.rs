//! PostgreSQL implementation of the repository.
//!
//! Schema lives in `migrations/` and is embedded into the binary.
//! Attempt appends take a transaction-scoped advisory lock on the
//! (wallet, puzzle) pair; the unique
//! `(wallet, puzzle_id, attempt_number)` constraint and the attempt-number
//! check back that up at the schema level.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::{AttemptFilter, PuzzleFilter, Repository};
use crate::config::PuzzleConfig;
use crate::domain::puzzle::PuzzleRecord;
use crate::domain::{
    Attempt, AttemptDraft, AttemptId, DailyAssignment, EpochDay, MintReference, ProfileSnapshot,
    Puzzle, PuzzleId, User, WalletAddress,
};
use crate::error::PuzzleError;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

type PuzzleRow = (
    i64,
    String,
    String,
    String,
    Vec<String>,
    String,
    Option<i64>,
    Option<f64>,
);

type UserRow = (
    String,
    Option<String>,
    f64,
    i64,
    Vec<String>,
    String,
    Option<DateTime<Utc>>,
    DateTime<Utc>,
);

type AttemptRow = (
    Uuid,
    String,
    i64,
    String,
    bool,
    i64,
    i32,
    DateTime<Utc>,
    Option<String>,
);

type AssignmentRow = (i64, i64, DateTime<Utc>);

const PUZZLE_COLUMNS: &str =
    "id, fen, side_to_move, difficulty, themes, solution, popularity, success_rate";
const USER_COLUMNS: &str = "wallet, display_name, success_rate, puzzles_solved, \
     preferred_themes, preferred_difficulty, last_recommended_at, created_at";
const ATTEMPT_COLUMNS: &str = "id, wallet, puzzle_id, submitted_move, is_correct, \
     elapsed_seconds, attempt_number, created_at, mint_reference";

/// PostgreSQL-backed repository using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a repository over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the pool settings from `config` and runs pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &PuzzleConfig) -> Result<Self, PuzzleError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| PuzzleError::PersistenceError(e.to_string()))?;

        tracing::info!("postgres repository ready");
        Ok(Self::new(pool))
    }
}

fn corrupt(what: &str, detail: impl std::fmt::Display) -> PuzzleError {
    PuzzleError::PersistenceError(format!("corrupt {what} row: {detail}"))
}

fn puzzle_from_row(row: PuzzleRow) -> Result<Puzzle, PuzzleError> {
    let (id, fen, side, difficulty, themes, solution, popularity, success_rate) = row;
    let record = PuzzleRecord {
        id: u32::try_from(id).map_err(|e| corrupt("puzzle", e))?,
        fen,
        side_to_move: side.parse()?,
        difficulty: difficulty.parse()?,
        themes,
        solution,
        popularity: popularity
            .map(u32::try_from)
            .transpose()
            .map_err(|e| corrupt("puzzle", e))?,
        success_rate,
    };
    Puzzle::try_from(record)
}

fn user_from_row(row: UserRow) -> Result<User, PuzzleError> {
    let (wallet, display_name, success_rate, solved, themes, difficulty, last, created_at) = row;
    Ok(User {
        wallet: WalletAddress::new_unchecked(&wallet),
        display_name,
        success_rate,
        puzzles_solved: u32::try_from(solved).map_err(|e| corrupt("user", e))?,
        preferred_themes: themes,
        preferred_difficulty: difficulty.parse()?,
        last_recommended_at: last,
        created_at,
    })
}

fn attempt_from_row(row: AttemptRow) -> Result<Attempt, PuzzleError> {
    let (id, wallet, puzzle_id, mv, is_correct, elapsed, number, created_at, mint) = row;
    Ok(Attempt {
        id: AttemptId::from_uuid(id),
        wallet: WalletAddress::new_unchecked(&wallet),
        puzzle_id: PuzzleId::new(u32::try_from(puzzle_id).map_err(|e| corrupt("attempt", e))?),
        submitted_move: mv,
        is_correct,
        elapsed_seconds: u32::try_from(elapsed).map_err(|e| corrupt("attempt", e))?,
        attempt_number: u32::try_from(number).map_err(|e| corrupt("attempt", e))?,
        created_at,
        mint_reference: mint.as_deref().map(MintReference::parse).transpose()?,
    })
}

fn assignment_from_row(row: AssignmentRow) -> Result<DailyAssignment, PuzzleError> {
    let (day, puzzle_id, assigned_at) = row;
    Ok(DailyAssignment {
        day: EpochDay::new(day),
        puzzle_id: PuzzleId::new(u32::try_from(puzzle_id).map_err(|e| corrupt("assignment", e))?),
        assigned_at,
    })
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn insert_puzzle(&self, puzzle: Puzzle) -> Result<bool, PuzzleError> {
        let themes: Vec<String> = puzzle.themes().iter().cloned().collect();
        let result = sqlx::query(
            "INSERT INTO puzzles (id, fen, side_to_move, difficulty, themes, solution, popularity, success_rate) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) ON CONFLICT (id) DO NOTHING",
        )
        .bind(i64::from(puzzle.id().get()))
        .bind(puzzle.fen())
        .bind(puzzle.side_to_move().as_str())
        .bind(puzzle.difficulty().as_str())
        .bind(themes)
        .bind(puzzle.solution())
        .bind(puzzle.popularity().map(i64::from))
        .bind(puzzle.success_rate())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_puzzle(&self, id: PuzzleId) -> Result<Option<Puzzle>, PuzzleError> {
        let row = sqlx::query_as::<_, PuzzleRow>(&format!(
            "SELECT {PUZZLE_COLUMNS} FROM puzzles WHERE id = $1"
        ))
        .bind(i64::from(id.get()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(puzzle_from_row).transpose()
    }

    async fn scan_puzzles(&self, filter: &PuzzleFilter) -> Result<Vec<Puzzle>, PuzzleError> {
        let rows = sqlx::query_as::<_, PuzzleRow>(&format!(
            "SELECT {PUZZLE_COLUMNS} FROM puzzles \
             WHERE ($1::text IS NULL OR difficulty = $1) \
               AND ($2::text IS NULL OR $2 = ANY(themes)) \
             ORDER BY id ASC"
        ))
        .bind(filter.difficulty.map(|d| d.as_str()))
        .bind(filter.theme.as_deref())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(puzzle_from_row).collect()
    }

    async fn get_user(&self, wallet: &WalletAddress) -> Result<Option<User>, PuzzleError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE wallet = $1"
        ))
        .bind(wallet.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(user_from_row).transpose()
    }

    async fn insert_user_if_absent(&self, user: User) -> Result<User, PuzzleError> {
        sqlx::query(
            "INSERT INTO users (wallet, display_name, success_rate, puzzles_solved, \
             preferred_themes, preferred_difficulty, last_recommended_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) ON CONFLICT (wallet) DO NOTHING",
        )
        .bind(user.wallet.as_str())
        .bind(user.display_name.as_deref())
        .bind(user.success_rate)
        .bind(i64::from(user.puzzles_solved))
        .bind(&user.preferred_themes)
        .bind(user.preferred_difficulty.as_str())
        .bind(user.last_recommended_at)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        self.get_user(&user.wallet)
            .await?
            .ok_or_else(|| PuzzleError::Internal(format!("user {} vanished", user.wallet)))
    }

    async fn save_profile(
        &self,
        wallet: &WalletAddress,
        snapshot: &ProfileSnapshot,
    ) -> Result<User, PuzzleError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (wallet, success_rate, puzzles_solved, preferred_themes, \
             preferred_difficulty, last_recommended_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (wallet) DO UPDATE SET \
               success_rate = excluded.success_rate, \
               puzzles_solved = excluded.puzzles_solved, \
               preferred_themes = excluded.preferred_themes, \
               preferred_difficulty = excluded.preferred_difficulty, \
               last_recommended_at = excluded.last_recommended_at \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(wallet.as_str())
        .bind(snapshot.success_rate)
        .bind(i64::from(snapshot.puzzles_solved))
        .bind(&snapshot.preferred_themes)
        .bind(snapshot.preferred_difficulty.as_str())
        .bind(snapshot.recommended_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        user_from_row(row)
    }

    async fn set_display_name(
        &self,
        wallet: &WalletAddress,
        display_name: &str,
    ) -> Result<User, PuzzleError> {
        let fresh = User::new(wallet.clone());
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (wallet, display_name, success_rate, puzzles_solved, \
             preferred_themes, preferred_difficulty, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (wallet) DO UPDATE SET display_name = excluded.display_name \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(wallet.as_str())
        .bind(display_name)
        .bind(fresh.success_rate)
        .bind(i64::from(fresh.puzzles_solved))
        .bind(&fresh.preferred_themes)
        .bind(fresh.preferred_difficulty.as_str())
        .bind(fresh.created_at)
        .fetch_one(&self.pool)
        .await?;

        user_from_row(row)
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Option<Attempt>, PuzzleError> {
        let row = sqlx::query_as::<_, AttemptRow>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(attempt_from_row).transpose()
    }

    async fn scan_attempts(&self, filter: &AttemptFilter) -> Result<Vec<Attempt>, PuzzleError> {
        let rows = sqlx::query_as::<_, AttemptRow>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM attempts \
             WHERE ($1::text IS NULL OR wallet = $1) \
               AND ($2::bigint IS NULL OR puzzle_id = $2) \
               AND ($3::bool IS NULL OR is_correct = $3) \
             ORDER BY created_at ASC, attempt_number ASC"
        ))
        .bind(filter.wallet.as_ref().map(WalletAddress::as_str))
        .bind(filter.puzzle_id.map(|p| i64::from(p.get())))
        .bind(filter.is_correct)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(attempt_from_row).collect()
    }

    async fn append_attempt(
        &self,
        draft: AttemptDraft,
        limit: u32,
    ) -> Result<Attempt, PuzzleError> {
        let puzzle_key = i64::from(draft.puzzle_id.get());
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{}:{}", draft.wallet, draft.puzzle_id))
            .execute(&mut *tx)
            .await?;

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attempts WHERE wallet = $1 AND puzzle_id = $2",
        )
        .bind(draft.wallet.as_str())
        .bind(puzzle_key)
        .fetch_one(&mut *tx)
        .await?;

        if count >= i64::from(limit) {
            return Err(PuzzleError::AttemptsExhausted {
                wallet: draft.wallet,
                puzzle_id: draft.puzzle_id,
                limit,
            });
        }

        let number = u32::try_from(count.saturating_add(1)).map_err(|e| corrupt("attempt", e))?;
        let attempt = draft.into_attempt(number);

        sqlx::query(
            "INSERT INTO attempts (id, wallet, puzzle_id, submitted_move, is_correct, \
             elapsed_seconds, attempt_number, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(*attempt.id.as_uuid())
        .bind(attempt.wallet.as_str())
        .bind(puzzle_key)
        .bind(&attempt.submitted_move)
        .bind(attempt.is_correct)
        .bind(i64::from(attempt.elapsed_seconds))
        .bind(i32::try_from(attempt.attempt_number).map_err(|e| corrupt("attempt", e))?)
        .bind(attempt.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(attempt)
    }

    async fn attach_mint_reference(
        &self,
        id: AttemptId,
        reference: MintReference,
    ) -> Result<Option<Attempt>, PuzzleError> {
        let row = sqlx::query_as::<_, AttemptRow>(&format!(
            "UPDATE attempts SET mint_reference = $2 \
             WHERE id = $1 AND (mint_reference IS NULL OR mint_reference = $2) \
             RETURNING {ATTEMPT_COLUMNS}"
        ))
        .bind(*id.as_uuid())
        .bind(reference.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return attempt_from_row(row).map(Some);
        }
        match self.get_attempt(id).await? {
            Some(_) => Err(PuzzleError::MintAlreadyAttached(id)),
            None => Ok(None),
        }
    }

    async fn get_assignment(&self, day: EpochDay) -> Result<Option<DailyAssignment>, PuzzleError> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            "SELECT epoch_day, puzzle_id, assigned_at FROM daily_assignments WHERE epoch_day = $1",
        )
        .bind(day.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(assignment_from_row).transpose()
    }

    async fn insert_assignment_if_absent(
        &self,
        assignment: DailyAssignment,
    ) -> Result<DailyAssignment, PuzzleError> {
        sqlx::query(
            "INSERT INTO daily_assignments (epoch_day, puzzle_id, assigned_at) \
             VALUES ($1, $2, $3) ON CONFLICT (epoch_day) DO NOTHING",
        )
        .bind(assignment.day.get())
        .bind(i64::from(assignment.puzzle_id.get()))
        .bind(assignment.assigned_at)
        .execute(&self.pool)
        .await?;

        self.get_assignment(assignment.day)
            .await?
            .ok_or_else(|| PuzzleError::Internal(format!("assignment {} vanished", assignment.day)))
    }
}
