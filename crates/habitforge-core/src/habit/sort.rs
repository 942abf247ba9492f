//! Habit list ordering.
//!
//! Ordering is a two-stage pipeline: each key sorts by its natural order
//! first (streak descending, completed before not-completed), then a
//! descending `order` flag reverses the whole list. For `streak` and
//! `completed` the two stages compose into a double reversal, so
//! `order=desc` on `streak` yields ascending streaks. That combined order
//! is part of the compatibility surface and is preserved as-is.

use serde::{Deserialize, Serialize};

use super::Habit;

/// Sort key for habit listings. Unrecognized key strings fall back to `Id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    StartDate,
    Streak,
    Completed,
    Id,
}

impl SortKey {
    /// Parse a key string, case-insensitively. Unknown keys mean `Id`.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "startdate" => SortKey::StartDate,
            "streak" => SortKey::Streak,
            "completed" => SortKey::Completed,
            _ => SortKey::Id,
        }
    }
}

/// Final ordering flag applied after the natural sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse an order string, case-insensitively. Anything but "desc" is `Asc`.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// Sort habits in place: natural order for the key, then an optional
/// whole-list reverse for `Desc`.
pub fn sort_habits(habits: &mut [Habit], key: SortKey, order: SortOrder) {
    match key {
        SortKey::StartDate => habits.sort_by_key(|h| h.start_date),
        SortKey::Streak => habits.sort_by(|a, b| b.current_streak.cmp(&a.current_streak)),
        SortKey::Completed => habits.sort_by(|a, b| b.completed.cmp(&a.completed)),
        SortKey::Id => habits.sort_by_key(|h| h.id),
    }

    if order == SortOrder::Desc {
        habits.reverse();
    }
}
