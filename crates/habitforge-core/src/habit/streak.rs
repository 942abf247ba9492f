//! Streak engine: the check-in state transition.
//!
//! Pure domain logic, independent of storage and transport. Callers are
//! responsible for the ownership check and for persisting the updated
//! habit atomically with the decision.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Habit;

/// Outcome of an accepted check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    /// The date that was recorded.
    pub date: NaiveDate,
    /// Streak length after the check-in.
    pub streak: u32,
    /// Whether this check-in crossed the target for the first time.
    pub completed_now: bool,
}

/// Why a check-in attempt was rejected. The habit is left unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInRejection {
    /// A check-in for `today` was already accepted.
    AlreadyCheckedIn,
    /// `today` is earlier than the last accepted check-in.
    Backdated { last: NaiveDate },
}

/// Apply a check-in attempt for `today`.
///
/// At most one check-in is accepted per calendar date. An accepted
/// check-in records the date, extends the streak by one when yesterday
/// was also checked in, and otherwise restarts it at 1. Crossing
/// `target_days` sets `completed`, which no later check-in clears.
///
/// Dates earlier than `last_check_in` are rejected outright rather than
/// recorded with a reset streak.
pub fn check_in(habit: &mut Habit, today: NaiveDate) -> Result<CheckIn, CheckInRejection> {
    if let Some(last) = habit.last_check_in {
        if today == last {
            return Err(CheckInRejection::AlreadyCheckedIn);
        }
        if today < last {
            return Err(CheckInRejection::Backdated { last });
        }
    }

    habit.completed_days.insert(today);

    let maintained = habit.last_check_in == Some(today - Duration::days(1));
    let streak = if maintained { habit.current_streak + 1 } else { 1 };

    habit.current_streak = streak;
    habit.last_check_in = Some(today);

    let completed_now = !habit.completed && streak >= habit.target_days;
    if completed_now {
        habit.completed = true;
    }

    Ok(CheckIn {
        date: today,
        streak,
        completed_now,
    })
}
