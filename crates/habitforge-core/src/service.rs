//! Habit operations: the surface invoked once per inbound request.
//!
//! Every operation resolves the caller, enforces ownership, runs the pure
//! streak/reminder rules, and persists the result. Mutating sequences run
//! inside a storage transaction so an operation either fully applies or
//! leaves nothing behind. Rejections come back as distinct
//! [`HabitError`] variants; outer transports may collapse not-found and
//! not-owned into one response, but they stay separate here.

use chrono::NaiveDate;

use crate::clock::{Clock, SystemClock};
use crate::error::{HabitError, ValidationError};
use crate::habit::{self, sort_habits, Habit, HabitEdit, SortKey, SortOrder};
use crate::reminder::{self, Reminder};
use crate::storage::Database;
use crate::account::User;

/// Request-facing habit operations over one database connection.
pub struct HabitService<C: Clock = SystemClock> {
    db: Database,
    clock: C,
}

impl HabitService<SystemClock> {
    pub fn new(db: Database) -> Self {
        Self::with_clock(db, SystemClock)
    }
}

impl<C: Clock> HabitService<C> {
    pub fn with_clock(db: Database, clock: C) -> Self {
        Self { db, clock }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn user(&self, username: &str) -> Result<User, HabitError> {
        let trimmed = username.trim();
        self.db
            .user_by_username(trimmed)?
            .ok_or_else(|| HabitError::UserNotFound(trimmed.to_string()))
    }

    /// Resolve a habit and verify the caller owns it.
    fn owned_habit(&self, user: &User, habit_id: i64) -> Result<Habit, HabitError> {
        let habit = self
            .db
            .habit_by_id(habit_id)?
            .ok_or(HabitError::HabitNotFound(habit_id))?;
        if habit.user_id != user.id {
            return Err(HabitError::NotOwner {
                habit_id,
                username: user.username.clone(),
            });
        }
        Ok(habit)
    }

    // === Users ===

    /// Register a user record. Habit ownership needs nothing more; the
    /// host platform's auth stack owns credentials.
    pub fn register_user(&self, username: &str, email: Option<&str>) -> Result<User, HabitError> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Blank {
                field: "username".into(),
            }
            .into());
        }
        Ok(self.db.insert_user(trimmed, email)?)
    }

    pub fn users(&self) -> Result<Vec<User>, HabitError> {
        Ok(self.db.list_users()?)
    }

    // === Habits ===

    /// Create a habit starting today with an empty streak.
    pub fn create_habit(
        &self,
        username: &str,
        title: &str,
        target_days: u32,
    ) -> Result<Habit, HabitError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::Blank {
                field: "title".into(),
            }
            .into());
        }
        if target_days == 0 {
            return Err(ValidationError::NotPositive {
                field: "target_days".into(),
                value: 0,
            }
            .into());
        }

        let user = self.user(username)?;
        let habit = Habit::new(user.id, title, target_days, self.clock.today());
        Ok(self.db.insert_habit(&habit)?)
    }

    /// All habits for a user. An unknown user yields an empty list.
    pub fn list_habits(&self, username: &str) -> Result<Vec<Habit>, HabitError> {
        match self.db.user_by_username(username.trim())? {
            Some(user) => Ok(self.db.habits_for_user(user.id)?),
            None => Ok(Vec::new()),
        }
    }

    /// Habits ordered by the two-stage sort pipeline. Key and order
    /// strings are parsed leniently: unknown keys fall back to id,
    /// anything but "desc" means ascending.
    pub fn sorted_habits(
        &self,
        username: &str,
        sort_by: &str,
        order: &str,
    ) -> Result<Vec<Habit>, HabitError> {
        let mut habits = self.list_habits(username)?;
        sort_habits(&mut habits, SortKey::parse(sort_by), SortOrder::parse(order));
        Ok(habits)
    }

    /// Accept today's check-in for the habit, or explain why not.
    pub fn check_in(&self, username: &str, habit_id: i64) -> Result<Habit, HabitError> {
        self.check_in_on(username, habit_id, self.clock.today())
    }

    /// Check-in with an explicit date; the transition itself lives in
    /// [`habit::streak`]. Runs inside a transaction so concurrent
    /// attempts against the same habit serialize into one acceptance.
    pub fn check_in_on(
        &self,
        username: &str,
        habit_id: i64,
        today: NaiveDate,
    ) -> Result<Habit, HabitError> {
        self.db.transaction(|db| {
            let user = self.user(username)?;
            let mut habit = self.owned_habit(&user, habit_id)?;

            match habit::check_in(&mut habit, today) {
                Ok(_) => {
                    db.update_habit(&habit)?;
                    Ok(habit)
                }
                Err(habit::CheckInRejection::AlreadyCheckedIn) => Err(HabitError::AlreadyCheckedIn),
                Err(habit::CheckInRejection::Backdated { last }) => Err(HabitError::Backdated {
                    attempted: today,
                    last,
                }),
            }
        })
    }

    /// Apply field edits and the reminder rule: a non-blank time creates
    /// or updates the reminder, a blank/absent one deletes it.
    pub fn edit_habit(
        &self,
        username: &str,
        habit_id: i64,
        edit: &HabitEdit,
    ) -> Result<Habit, HabitError> {
        self.db.transaction(|db| {
            let user = self.user(username)?;
            let mut habit = self.owned_habit(&user, habit_id)?;

            habit.title = edit.title.trim().to_string();
            habit.target_days = edit.target_days;
            habit.completed = edit.completed;

            match edit.reminder_time.as_deref().map(str::trim) {
                Some(time_str) if !time_str.is_empty() => {
                    let time = reminder::parse_time(time_str)?;
                    db.upsert_reminder(habit.id, time)?;
                }
                _ => {
                    db.delete_reminder_for_habit(habit.id)?;
                }
            }

            db.update_habit(&habit)?;
            Ok(habit)
        })
    }

    /// Delete a habit; its reminder and check-in history go with it.
    pub fn delete_habit(&self, username: &str, habit_id: i64) -> Result<(), HabitError> {
        let user = self.user(username)?;
        let habit = self.owned_habit(&user, habit_id)?;
        Ok(self.db.delete_habit(habit.id)?)
    }

    // === Reminders ===

    /// Set or clear the habit's reminder. Blank time means clear.
    pub fn set_reminder(
        &self,
        username: &str,
        habit_id: i64,
        time_str: &str,
    ) -> Result<Option<Reminder>, HabitError> {
        let user = self.user(username)?;
        let habit = self.owned_habit(&user, habit_id)?;

        let trimmed = time_str.trim();
        if trimmed.is_empty() {
            self.db.delete_reminder_for_habit(habit.id)?;
            return Ok(None);
        }

        let time = reminder::parse_time(trimmed)?;
        Ok(Some(self.db.upsert_reminder(habit.id, time)?))
    }

    /// Current reminder for a habit, if any.
    pub fn reminder_for(&self, habit_id: i64) -> Result<Option<Reminder>, HabitError> {
        Ok(self.db.reminder_for_habit(habit_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> HabitService<FixedClock> {
        let db = Database::open_memory().unwrap();
        let clock = FixedClock::new(date(2025, 6, 1), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        HabitService::with_clock(db, clock)
    }

    fn service_with_user() -> HabitService<FixedClock> {
        let s = service();
        s.register_user("ana", Some("ana@example.com")).unwrap();
        s
    }

    #[test]
    fn create_habit_starts_today_with_zero_streak() {
        let s = service_with_user();
        let habit = s.create_habit("ana", "Read", 3).unwrap();
        assert_eq!(habit.start_date, date(2025, 6, 1));
        assert_eq!(habit.current_streak, 0);
        assert!(habit.last_check_in.is_none());
        assert!(!habit.completed);
    }

    #[test]
    fn create_habit_validates_input() {
        let s = service_with_user();
        assert!(matches!(
            s.create_habit("ana", "   ", 3),
            Err(HabitError::Validation(ValidationError::Blank { .. }))
        ));
        assert!(matches!(
            s.create_habit("ana", "Read", 0),
            Err(HabitError::Validation(ValidationError::NotPositive { .. }))
        ));
        assert!(matches!(
            s.create_habit("nobody", "Read", 3),
            Err(HabitError::UserNotFound(_))
        ));
    }

    #[test]
    fn check_in_twice_same_day_accepts_once() {
        let s = service_with_user();
        let habit = s.create_habit("ana", "Read", 3).unwrap();

        let updated = s.check_in("ana", habit.id).unwrap();
        assert_eq!(updated.current_streak, 1);

        let err = s.check_in("ana", habit.id).unwrap_err();
        assert!(matches!(err, HabitError::AlreadyCheckedIn));

        let stored = s.database().habit_by_id(habit.id).unwrap().unwrap();
        assert_eq!(stored.completed_days.len(), 1);
    }

    #[test]
    fn ownership_is_enforced_on_every_mutation() {
        let s = service_with_user();
        s.register_user("mallory", None).unwrap();
        let habit = s.create_habit("ana", "Read", 3).unwrap();

        assert!(matches!(
            s.check_in("mallory", habit.id),
            Err(HabitError::NotOwner { .. })
        ));
        assert!(matches!(
            s.edit_habit("mallory", habit.id, &HabitEdit {
                title: "Stolen".into(),
                target_days: 1,
                completed: false,
                reminder_time: None,
            }),
            Err(HabitError::NotOwner { .. })
        ));
        assert!(matches!(
            s.delete_habit("mallory", habit.id),
            Err(HabitError::NotOwner { .. })
        ));
        assert!(matches!(
            s.set_reminder("mallory", habit.id, "08:00"),
            Err(HabitError::NotOwner { .. })
        ));

        // Untouched.
        let stored = s.database().habit_by_id(habit.id).unwrap().unwrap();
        assert_eq!(stored.title, "Read");
    }

    #[test]
    fn missing_habit_is_distinct_from_not_owned() {
        let s = service_with_user();
        assert!(matches!(
            s.check_in("ana", 999),
            Err(HabitError::HabitNotFound(999))
        ));
    }

    #[test]
    fn unknown_user_lists_empty() {
        let s = service_with_user();
        assert!(s.list_habits("nobody").unwrap().is_empty());
        assert!(s.sorted_habits("nobody", "streak", "asc").unwrap().is_empty());
    }

    #[test]
    fn edit_applies_fields_without_revalidating_streak() {
        let s = service_with_user();
        let habit = s.create_habit("ana", "Read", 3).unwrap();
        s.check_in("ana", habit.id).unwrap();

        // Lowering the target below the streak does not flip completed.
        let updated = s
            .edit_habit("ana", habit.id, &HabitEdit {
                title: "  Read more  ".into(),
                target_days: 1,
                completed: false,
                reminder_time: None,
            })
            .unwrap();
        assert_eq!(updated.title, "Read more");
        assert_eq!(updated.target_days, 1);
        assert!(!updated.completed);
        assert_eq!(updated.current_streak, 1);
    }

    #[test]
    fn edit_manages_the_reminder() {
        let s = service_with_user();
        let habit = s.create_habit("ana", "Read", 3).unwrap();

        let edit = HabitEdit {
            title: "Read".into(),
            target_days: 3,
            completed: false,
            reminder_time: Some("08:30".into()),
        };
        s.edit_habit("ana", habit.id, &edit).unwrap();
        assert!(s.reminder_for(habit.id).unwrap().is_some());

        let edit = HabitEdit {
            reminder_time: Some("  ".into()),
            ..edit
        };
        s.edit_habit("ana", habit.id, &edit).unwrap();
        assert!(s.reminder_for(habit.id).unwrap().is_none());
    }

    #[test]
    fn invalid_reminder_time_rolls_the_edit_back() {
        let s = service_with_user();
        let habit = s.create_habit("ana", "Read", 3).unwrap();

        let err = s
            .edit_habit("ana", habit.id, &HabitEdit {
                title: "Changed".into(),
                target_days: 9,
                completed: false,
                reminder_time: Some("nonsense".into()),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            HabitError::Validation(ValidationError::InvalidTime { .. })
        ));

        let stored = s.database().habit_by_id(habit.id).unwrap().unwrap();
        assert_eq!(stored.title, "Read");
        assert_eq!(stored.target_days, 3);
    }

    #[test]
    fn set_and_clear_reminder() {
        let s = service_with_user();
        let habit = s.create_habit("ana", "Read", 3).unwrap();

        let reminder = s.set_reminder("ana", habit.id, "07:15").unwrap().unwrap();
        assert_eq!(
            reminder.time,
            NaiveTime::from_hms_opt(7, 15, 0).unwrap()
        );
        assert!(reminder.enabled);

        assert!(s.set_reminder("ana", habit.id, "").unwrap().is_none());
        assert!(s.reminder_for(habit.id).unwrap().is_none());

        assert!(matches!(
            s.set_reminder("ana", habit.id, "8 o'clock"),
            Err(HabitError::Validation(ValidationError::InvalidTime { .. }))
        ));
    }

    #[test]
    fn delete_habit_removes_reminder_too() {
        let s = service_with_user();
        let habit = s.create_habit("ana", "Read", 3).unwrap();
        s.set_reminder("ana", habit.id, "08:00").unwrap();

        s.delete_habit("ana", habit.id).unwrap();
        assert!(s.database().habit_by_id(habit.id).unwrap().is_none());
        assert!(s.reminder_for(habit.id).unwrap().is_none());
        assert!(matches!(
            s.delete_habit("ana", habit.id),
            Err(HabitError::HabitNotFound(_))
        ));
    }

    #[test]
    fn end_to_end_streak_scenario() {
        let s = service_with_user();
        let habit = s.create_habit("ana", "Read", 3).unwrap();

        // Day 1: accepted, streak 1.
        let h = s.check_in("ana", habit.id).unwrap();
        assert_eq!(h.current_streak, 1);

        // Day 2: accepted, streak 2; repeat rejected.
        s.clock.advance_days(1);
        let h = s.check_in("ana", habit.id).unwrap();
        assert_eq!(h.current_streak, 2);
        assert!(matches!(
            s.check_in("ana", habit.id),
            Err(HabitError::AlreadyCheckedIn)
        ));

        // Day 4: gap, streak resets to 1, completed stays false.
        s.clock.advance_days(2);
        let h = s.check_in("ana", habit.id).unwrap();
        assert_eq!(h.current_streak, 1);
        assert!(!h.completed);
        assert_eq!(h.completed_days.len(), 3);
    }

    #[test]
    fn completion_is_monotonic_across_operations() {
        let s = service_with_user();
        let habit = s.create_habit("ana", "Read", 2).unwrap();

        s.check_in("ana", habit.id).unwrap();
        s.clock.advance_days(1);
        let h = s.check_in("ana", habit.id).unwrap();
        assert!(h.completed);

        // Later reset-streak check-in leaves completion set.
        s.clock.advance_days(5);
        let h = s.check_in("ana", habit.id).unwrap();
        assert_eq!(h.current_streak, 1);
        assert!(h.completed);
    }

    #[test]
    fn backdated_check_in_is_rejected_through_the_service() {
        let s = service_with_user();
        let habit = s.create_habit("ana", "Read", 3).unwrap();
        s.check_in_on("ana", habit.id, date(2025, 6, 5)).unwrap();

        let err = s.check_in_on("ana", habit.id, date(2025, 6, 2)).unwrap_err();
        assert!(matches!(err, HabitError::Backdated { .. }));

        let stored = s.database().habit_by_id(habit.id).unwrap().unwrap();
        assert_eq!(stored.completed_days.len(), 1);
    }

    #[test]
    fn sorted_habits_follow_the_pipeline() {
        let s = service_with_user();
        let a = s.create_habit("ana", "A", 9).unwrap();
        let b = s.create_habit("ana", "B", 9).unwrap();
        s.check_in("ana", b.id).unwrap();

        let by_streak = s.sorted_habits("ana", "streak", "asc").unwrap();
        assert_eq!(by_streak[0].id, b.id);

        // desc double-reverses streak back to ascending.
        let by_streak_desc = s.sorted_habits("ana", "streak", "desc").unwrap();
        assert_eq!(by_streak_desc[0].id, a.id);

        let fallback = s.sorted_habits("ana", "bogus", "asc").unwrap();
        assert_eq!(fallback[0].id, a.id);
    }
}
