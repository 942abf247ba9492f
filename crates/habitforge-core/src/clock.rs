//! Injectable calendar/time provider.
//!
//! Check-in decisions and reminder matching both depend on "today" and
//! "now". Injecting them through a trait lets tests advance a fake clock
//! instead of waiting on real time.

use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use std::sync::Mutex;

/// Supplies the current calendar date and time-of-day.
pub trait Clock: Send + Sync {
    /// Current calendar date.
    fn today(&self) -> NaiveDate;

    /// Current time-of-day (full precision; callers truncate as needed).
    fn time_now(&self) -> NaiveTime;
}

/// Wall-clock implementation backed by the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn time_now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Settable clock for tests.
pub struct FixedClock {
    now: Mutex<(NaiveDate, NaiveTime)>,
}

impl FixedClock {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            now: Mutex::new((date, time)),
        }
    }

    /// Replace the current instant.
    pub fn set(&self, date: NaiveDate, time: NaiveTime) {
        *self.now.lock().unwrap() = (date, time);
    }

    /// Move the date forward, leaving time-of-day unchanged.
    pub fn advance_days(&self, days: u32) {
        let mut now = self.now.lock().unwrap();
        now.0 += chrono::Duration::days(days as i64);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.now.lock().unwrap().0
    }

    fn time_now(&self) -> NaiveTime {
        self.now.lock().unwrap().1
    }
}

/// Zero out seconds and sub-second components.
pub fn truncate_to_minute(t: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_drops_seconds_and_nanos() {
        let t = NaiveTime::from_hms_nano_opt(8, 0, 37, 123_456_789).unwrap();
        assert_eq!(truncate_to_minute(t), NaiveTime::from_hms_opt(8, 0, 0).unwrap());
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        );
        clock.advance_days(3);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(clock.time_now(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }
}
