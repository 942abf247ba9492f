//! Reminder model and time parsing.
//!
//! Each habit has at most one reminder, owned by the habit and deleted
//! with it. Times are stored at minute precision; matching in the
//! scheduler is exact-minute equality.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A daily reminder for one habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Row id, assigned by storage.
    pub id: i64,

    /// The owning habit (one-to-one).
    pub habit_id: i64,

    /// Time-of-day at minute precision.
    pub time: NaiveTime,

    /// Only enabled reminders are eligible for delivery.
    pub enabled: bool,
}

/// Parse a reminder time string and truncate to minute precision.
///
/// Accepts "HH:MM" and "HH:MM:SS"; seconds are discarded.
pub fn parse_time(input: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = input.trim();
    let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidTime {
            input: input.to_string(),
        })?;
    Ok(NaiveTime::from_hms_opt(parsed.hour(), parsed.minute(), 0).unwrap_or(parsed))
}

/// Format a reminder time back to the wire form "HH:MM".
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
