//! Habit domain model.
//!
//! A habit belongs to exactly one user and tracks a streak of consecutive
//! daily check-ins toward a target length. The streak transition rules
//! live in [`streak`]; list ordering lives in [`sort`].

pub mod sort;
pub mod streak;

pub use sort::{sort_habits, SortKey, SortOrder};
pub use streak::{check_in, CheckIn, CheckInRejection};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single tracked habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    /// Row id, assigned by storage.
    pub id: i64,

    /// Owning user's id. A habit is never shared.
    pub user_id: i64,

    /// Display title (non-blank).
    pub title: String,

    /// Streak length that marks the habit completed.
    pub target_days: u32,

    /// Creation date; immutable thereafter.
    pub start_date: NaiveDate,

    /// Length of the contiguous run ending at `last_check_in`.
    pub current_streak: u32,

    /// Most recent date a check-in was accepted, if any.
    pub last_check_in: Option<NaiveDate>,

    /// Every date a check-in was ever accepted. Grows monotonically;
    /// entries are only removed by deleting the whole habit.
    pub completed_days: BTreeSet<NaiveDate>,

    /// True once `current_streak` has ever reached `target_days`.
    /// Never reset by check-in operations.
    pub completed: bool,
}

impl Habit {
    /// A fresh habit with no check-in history.
    pub fn new(user_id: i64, title: impl Into<String>, target_days: u32, start_date: NaiveDate) -> Self {
        Self {
            id: 0,
            user_id,
            title: title.into(),
            target_days,
            start_date,
            current_streak: 0,
            last_check_in: None,
            completed_days: BTreeSet::new(),
            completed: false,
        }
    }
}

/// Field updates applied by the edit operation.
///
/// `title`, `target_days` and `completed` are applied unconditionally;
/// the streak is not re-validated against a new target. `reminder_time`
/// follows the blank-means-delete convention: `Some(non-blank)` creates
/// or updates the habit's reminder, `None` or blank deletes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitEdit {
    pub title: String,
    pub target_days: u32,
    pub completed: bool,
    pub reminder_time: Option<String>,
}
