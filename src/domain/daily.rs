//! Calendar-day keys and daily puzzle bindings.

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PuzzleId;

/// Days since 1970-01-01.
///
/// The integer key for daily assignments, independent of timezone and
/// date formatting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct EpochDay(i64);

impl EpochDay {
    /// Epoch day of a calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.signed_duration_since(unix_epoch()).num_days())
    }

    /// Wraps a raw day count.
    #[must_use]
    pub const fn new(days: i64) -> Self {
        Self(days)
    }

    /// Returns the raw day count.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Calendar date of this epoch day, if representable.
    #[must_use]
    pub fn to_date(self) -> Option<NaiveDate> {
        let magnitude = Days::new(self.0.unsigned_abs());
        if self.0 >= 0 {
            unix_epoch().checked_add_days(magnitude)
        } else {
            unix_epoch().checked_sub_days(magnitude)
        }
    }

    /// Index into a catalog of `len` puzzles; `None` for an empty catalog.
    #[must_use]
    pub fn catalog_index(self, len: usize) -> Option<usize> {
        let len = i64::try_from(len).ok().filter(|l| *l > 0)?;
        usize::try_from(self.0.rem_euclid(len)).ok()
    }
}

/// 1970-01-01.
fn unix_epoch() -> NaiveDate {
    DateTime::<Utc>::UNIX_EPOCH.date_naive()
}

impl fmt::Display for EpochDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Binding of one calendar day to one puzzle. Never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailyAssignment {
    /// Day key.
    pub day: EpochDay,
    /// Puzzle served on that day.
    pub puzzle_id: PuzzleId,
    /// When the binding was first persisted.
    pub assigned_at: DateTime<Utc>,
}

impl DailyAssignment {
    /// Creates a binding stamped now.
    #[must_use]
    pub fn new(day: EpochDay, puzzle_id: PuzzleId) -> Self {
        Self {
            day,
            puzzle_id,
            assigned_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
            panic!("valid date");
        };
        date
    }

    #[test]
    fn new_year_2025_is_day_20089() {
        // 55 years since 1970, 14 of them leap years.
        let day = EpochDay::from_date(date(2025, 1, 1));
        assert_eq!(day.get(), 55 * 365 + 14);
        assert_eq!(day.get(), 20_089);
        assert_eq!(day.catalog_index(10), Some(9));
    }

    #[test]
    fn epoch_is_zero_and_round_trips() {
        assert_eq!(EpochDay::from_date(date(1970, 1, 1)).get(), 0);
        let day = EpochDay::from_date(date(2024, 2, 29));
        assert_eq!(day.to_date(), Some(date(2024, 2, 29)));
        assert_eq!(EpochDay::new(-1).to_date(), Some(date(1969, 12, 31)));
    }

    #[test]
    fn far_dates_round_trip() {
        for d in [date(1900, 3, 1), date(2000, 2, 29), date(2100, 12, 31)] {
            assert_eq!(EpochDay::from_date(d).to_date(), Some(d));
        }
        assert_eq!(EpochDay::from_date(date(2100, 12, 31)).get(), 47_846);
    }

    #[test]
    fn consecutive_days_rotate_through_catalog() {
        let first = EpochDay::from_date(date(2025, 1, 1));
        let second = EpochDay::from_date(date(2025, 1, 2));
        assert_eq!(second.get() - first.get(), 1);
        assert_eq!(second.catalog_index(10), Some(0));
    }

    #[test]
    fn empty_catalog_has_no_index() {
        assert_eq!(EpochDay::new(5).catalog_index(0), None);
    }

    #[test]
    fn negative_days_still_index() {
        assert_eq!(EpochDay::new(-1).catalog_index(10), Some(9));
    }
}
