//! Reminder delivery scheduler.
//!
//! A single long-lived task, decoupled from request traffic. Once per
//! minute, aligned to the minute boundary, it fetches every enabled
//! reminder whose stored time equals the current minute and attempts
//! delivery for each one independently. There is no durable retry queue:
//! a failed send is logged and the reminder simply fires again the next
//! day.
//!
//! Matching is exact-minute equality, so the loop must fire exactly once
//! per minute boundary. Firing twice for one minute would double-send;
//! skipping a minute silently drops that day's reminders. The loop guards
//! the former with the last fired (date, minute) pair and the latter by
//! sleeping to each boundary instead of a free-running interval.

use chrono::{NaiveDate, NaiveTime, Timelike};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clock::{truncate_to_minute, Clock};
use crate::error::DatabaseError;
use crate::notify::Notifier;
use crate::storage::Database;

/// What happened during one scheduler tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Enabled reminders whose time matched the minute.
    pub matched: usize,
    /// Deliveries handed to the notifier successfully.
    pub delivered: usize,
    /// Reminders skipped silently (missing habit, user, or address).
    pub skipped: usize,
    /// Deliveries that failed or timed out.
    pub failed: usize,
}

/// Render the fixed reminder notification for one habit.
fn render_reminder(username: &str, habit_title: &str) -> (String, String) {
    let subject = format!("Habit Reminder: {habit_title}");
    let body = format!(
        "<p>Hi {username},</p>\n\
         <p>This is your daily reminder to work on your habit: <strong>{habit_title}</strong>.</p>\n\
         <p>Keep up the great work!</p>\n"
    );
    (subject, body)
}

/// Milliseconds until the next minute boundary after `t`.
fn ms_until_next_minute(t: NaiveTime) -> u64 {
    let into_minute = u64::from(t.second()) * 1000 + u64::from(t.nanosecond() / 1_000_000);
    60_000 - into_minute.min(59_999)
}

/// The recurring reminder delivery task.
///
/// Owns its own database connection; collaborators are injected so tests
/// can drive it with a fake clock and a recording notifier.
pub struct ReminderScheduler<C: Clock, N: Notifier> {
    db: Database,
    clock: C,
    notifier: N,
    send_timeout: Duration,
}

impl<C: Clock, N: Notifier> ReminderScheduler<C, N> {
    pub fn new(db: Database, clock: C, notifier: N, send_timeout: Duration) -> Self {
        Self {
            db,
            clock,
            notifier,
            send_timeout,
        }
    }

    /// Run forever, firing one tick per minute boundary.
    ///
    /// A storage failure aborts that tick's batch but never the loop.
    pub async fn run(&self) {
        info!(notifier = self.notifier.name(), "reminder scheduler started");
        let mut last_fired: Option<(NaiveDate, NaiveTime)> = None;

        loop {
            let wait = ms_until_next_minute(self.clock.time_now());
            tokio::time::sleep(Duration::from_millis(wait)).await;

            let minute = truncate_to_minute(self.clock.time_now());
            let stamp = (self.clock.today(), minute);
            if last_fired == Some(stamp) {
                // Woke twice inside the same minute; never double-send.
                continue;
            }
            last_fired = Some(stamp);

            match self.run_tick(minute).await {
                Ok(summary) if summary.matched > 0 => {
                    info!(
                        matched = summary.matched,
                        delivered = summary.delivered,
                        skipped = summary.skipped,
                        failed = summary.failed,
                        "reminder tick finished"
                    );
                }
                Ok(_) => debug!(minute = %minute, "no reminders due"),
                Err(e) => {
                    warn!(error = %e, "reminder batch fetch failed; retrying next minute");
                }
            }
        }
    }

    /// Deliver every reminder due at the given minute.
    ///
    /// Each reminder is handled independently: missing habit, user, or
    /// address is skipped silently; a delivery failure is logged and the
    /// rest of the batch still runs.
    ///
    /// # Errors
    /// Returns an error only when the due-reminder fetch itself fails.
    pub async fn run_tick(&self, now: NaiveTime) -> Result<TickSummary, DatabaseError> {
        let minute = truncate_to_minute(now);
        let due = self.db.due_reminders(minute)?;

        let mut summary = TickSummary {
            matched: due.len(),
            ..TickSummary::default()
        };

        for reminder in due {
            let habit = match self.db.habit_by_id(reminder.habit_id) {
                Ok(Some(h)) => h,
                Ok(None) => {
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, habit_id = reminder.habit_id, "habit lookup failed");
                    summary.failed += 1;
                    continue;
                }
            };

            let user = match self.db.user_by_id(habit.user_id) {
                Ok(Some(u)) => u,
                Ok(None) => {
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, user_id = habit.user_id, "user lookup failed");
                    summary.failed += 1;
                    continue;
                }
            };

            let Some(email) = user.contact_email() else {
                summary.skipped += 1;
                continue;
            };

            let (subject, body) = render_reminder(&user.username, &habit.title);
            match tokio::time::timeout(
                self.send_timeout,
                self.notifier.send(email, &subject, &body),
            )
            .await
            {
                Ok(Ok(())) => summary.delivered += 1,
                Ok(Err(e)) => {
                    summary.failed += 1;
                    warn!(error = %e, recipient = email, habit = %habit.title, "reminder delivery failed");
                }
                Err(_) => {
                    summary.failed += 1;
                    warn!(recipient = email, habit = %habit.title, "reminder delivery timed out");
                }
            }
        }

        Ok(summary)
    }
}
