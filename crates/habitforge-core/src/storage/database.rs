//! SQLite-based persistence for users, habits, and reminders.
//!
//! One connection per `Database`; the request-facing service and the
//! reminder scheduler each open their own. SQLite serializes writers, and
//! read-modify-write sequences (check-in, cascading delete) run inside an
//! explicit transaction so they apply atomically or not at all.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::account::User;
use crate::error::DatabaseError;
use crate::habit::Habit;
use crate::reminder::{format_time, Reminder};

use super::data_dir;
use super::migrations;

// === Helper Functions ===

/// Format a calendar date for database storage.
fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a calendar date from database text, falling back to the epoch
/// date for unreadable values.
fn parse_date_fallback(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
}

/// Parse a minute-precision time from database text, falling back to
/// midnight for unreadable values.
fn parse_time_fallback(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M")
        .unwrap_or_else(|_| NaiveTime::from_hms_opt(0, 0, 0).unwrap())
}

fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
    })
}

/// Build a Habit from a habits row (completed days are loaded separately).
fn row_to_habit(row: &rusqlite::Row) -> Result<Habit, rusqlite::Error> {
    let start_date: String = row.get(4)?;
    let last_check_in: Option<String> = row.get(6)?;

    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        target_days: row.get(3)?,
        start_date: parse_date_fallback(&start_date),
        current_streak: row.get(5)?,
        last_check_in: last_check_in.as_deref().map(parse_date_fallback),
        completed_days: BTreeSet::new(),
        completed: row.get(7)?,
    })
}

fn row_to_reminder(row: &rusqlite::Row) -> Result<Reminder, rusqlite::Error> {
    let time: String = row.get(2)?;
    Ok(Reminder {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        time: parse_time_fallback(&time),
        enabled: row.get(3)?,
    })
}

/// SQLite database for habit storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/habitforge/habitforge.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?
            .join("habitforge.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Run `f` inside a transaction on this connection. The transaction is
    /// rolled back when `f` returns an error.
    pub fn transaction<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(DatabaseError::from)?;
        let out = f(self)?;
        tx.commit().map_err(DatabaseError::from)?;
        Ok(out)
    }

    // === Users ===

    /// Insert a user. Usernames are unique.
    pub fn insert_user(&self, username: &str, email: Option<&str>) -> Result<User, DatabaseError> {
        self.conn.execute(
            "INSERT INTO users (username, email) VALUES (?1, ?2)",
            params![username, email],
        )?;
        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: username.to_string(),
            email: email.map(str::to_string),
        })
    }

    pub fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, email FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, email FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, email FROM users ORDER BY id")?;
        let rows = stmt.query_map([], row_to_user)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    // === Habits ===

    /// Insert a fresh habit and return it with its assigned id.
    pub fn insert_habit(&self, habit: &Habit) -> Result<Habit, DatabaseError> {
        self.conn.execute(
            "INSERT INTO habits (user_id, title, target_days, start_date, current_streak, last_check_in, completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                habit.user_id,
                habit.title,
                habit.target_days,
                format_date(habit.start_date),
                habit.current_streak,
                habit.last_check_in.map(format_date),
                habit.completed,
            ],
        )?;
        let mut saved = habit.clone();
        saved.id = self.conn.last_insert_rowid();
        Ok(saved)
    }

    pub fn habit_by_id(&self, id: i64) -> Result<Option<Habit>, DatabaseError> {
        let habit = self
            .conn
            .query_row(
                "SELECT id, user_id, title, target_days, start_date, current_streak, last_check_in, completed
                 FROM habits WHERE id = ?1",
                params![id],
                row_to_habit,
            )
            .optional()?;
        match habit {
            Some(mut h) => {
                h.completed_days = self.completed_days(h.id)?;
                Ok(Some(h))
            }
            None => Ok(None),
        }
    }

    pub fn habits_for_user(&self, user_id: i64) -> Result<Vec<Habit>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, target_days, start_date, current_streak, last_check_in, completed
             FROM habits WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_habit)?;
        let mut habits = Vec::new();
        for row in rows {
            let mut habit = row?;
            habit.completed_days = self.completed_days(habit.id)?;
            habits.push(habit);
        }
        Ok(habits)
    }

    /// Persist the mutable habit fields and any new completed days.
    ///
    /// Completed days are set-valued: re-inserting an existing date is a
    /// no-op, and days are never removed here.
    pub fn update_habit(&self, habit: &Habit) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE habits
             SET title = ?1, target_days = ?2, current_streak = ?3, last_check_in = ?4, completed = ?5
             WHERE id = ?6",
            params![
                habit.title,
                habit.target_days,
                habit.current_streak,
                habit.last_check_in.map(format_date),
                habit.completed,
                habit.id,
            ],
        )?;
        for day in &habit.completed_days {
            self.conn.execute(
                "INSERT OR IGNORE INTO habit_completed_days (habit_id, day) VALUES (?1, ?2)",
                params![habit.id, format_date(*day)],
            )?;
        }
        Ok(())
    }

    /// Delete a habit together with its reminder and check-in history.
    pub fn delete_habit(&self, id: i64) -> Result<(), DatabaseError> {
        self.transaction(|db| {
            db.conn
                .execute("DELETE FROM habit_reminders WHERE habit_id = ?1", params![id])?;
            db.conn.execute(
                "DELETE FROM habit_completed_days WHERE habit_id = ?1",
                params![id],
            )?;
            db.conn.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
            Ok::<_, DatabaseError>(())
        })
    }

    fn completed_days(&self, habit_id: i64) -> Result<BTreeSet<NaiveDate>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT day FROM habit_completed_days WHERE habit_id = ?1")?;
        let rows = stmt.query_map(params![habit_id], |row| row.get::<_, String>(0))?;
        let mut days = BTreeSet::new();
        for row in rows {
            days.insert(parse_date_fallback(&row?));
        }
        Ok(days)
    }

    // === Reminders ===

    /// Create or update the habit's reminder. Updating re-enables it.
    pub fn upsert_reminder(&self, habit_id: i64, time: NaiveTime) -> Result<Reminder, DatabaseError> {
        self.conn.execute(
            "INSERT INTO habit_reminders (habit_id, reminder_time, enabled)
             VALUES (?1, ?2, 1)
             ON CONFLICT(habit_id) DO UPDATE SET reminder_time = excluded.reminder_time, enabled = 1",
            params![habit_id, format_time(time)],
        )?;
        self.reminder_for_habit(habit_id)?
            .ok_or_else(|| DatabaseError::QueryFailed("reminder upsert did not persist".into()))
    }

    pub fn reminder_for_habit(&self, habit_id: i64) -> Result<Option<Reminder>, DatabaseError> {
        let reminder = self
            .conn
            .query_row(
                "SELECT id, habit_id, reminder_time, enabled FROM habit_reminders WHERE habit_id = ?1",
                params![habit_id],
                row_to_reminder,
            )
            .optional()?;
        Ok(reminder)
    }

    /// Delete the habit's reminder if one exists. Returns whether a row
    /// was removed.
    pub fn delete_reminder_for_habit(&self, habit_id: i64) -> Result<bool, DatabaseError> {
        let removed = self.conn.execute(
            "DELETE FROM habit_reminders WHERE habit_id = ?1",
            params![habit_id],
        )?;
        Ok(removed > 0)
    }

    /// Enabled reminders whose stored time equals the given minute.
    pub fn due_reminders(&self, minute: NaiveTime) -> Result<Vec<Reminder>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, reminder_time, enabled
             FROM habit_reminders
             WHERE enabled = 1 AND reminder_time = ?1",
        )?;
        let rows = stmt.query_map(params![format_time(minute)], row_to_reminder)?;
        let mut due = Vec::new();
        for row in rows {
            due.push(row?);
        }
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn open_at_creates_and_reopens_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habitforge.db");

        {
            let db = Database::open_at(&path).unwrap();
            db.insert_user("ana", None).unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        assert!(db.user_by_username("ana").unwrap().is_some());
    }

    #[test]
    fn user_round_trip() {
        let db = Database::open_memory().unwrap();
        let user = db.insert_user("ana", Some("ana@example.com")).unwrap();
        assert!(user.id > 0);

        let found = db.user_by_username("ana").unwrap().unwrap();
        assert_eq!(found, user);
        assert!(db.user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let db = Database::open_memory().unwrap();
        db.insert_user("ana", None).unwrap();
        assert!(db.insert_user("ana", None).is_err());
    }

    #[test]
    fn habit_round_trip_with_completed_days() {
        let db = Database::open_memory().unwrap();
        let user = db.insert_user("ana", None).unwrap();

        let mut habit = Habit::new(user.id, "Read", 5, date(2025, 6, 1));
        habit.completed_days.insert(date(2025, 6, 1));
        habit.completed_days.insert(date(2025, 6, 2));
        habit.current_streak = 2;
        habit.last_check_in = Some(date(2025, 6, 2));

        let saved = db.insert_habit(&habit).unwrap();
        db.update_habit(&saved).unwrap();

        let found = db.habit_by_id(saved.id).unwrap().unwrap();
        assert_eq!(found.title, "Read");
        assert_eq!(found.completed_days.len(), 2);
        assert_eq!(found.last_check_in, Some(date(2025, 6, 2)));
    }

    #[test]
    fn update_habit_never_removes_days() {
        let db = Database::open_memory().unwrap();
        let user = db.insert_user("ana", None).unwrap();
        let mut habit = db
            .insert_habit(&Habit::new(user.id, "Read", 5, date(2025, 6, 1)))
            .unwrap();

        habit.completed_days.insert(date(2025, 6, 1));
        db.update_habit(&habit).unwrap();

        // A later write that lost the in-memory day must not erase it.
        habit.completed_days.clear();
        db.update_habit(&habit).unwrap();

        let found = db.habit_by_id(habit.id).unwrap().unwrap();
        assert_eq!(found.completed_days.len(), 1);
    }

    #[test]
    fn delete_habit_cascades() {
        let db = Database::open_memory().unwrap();
        let user = db.insert_user("ana", None).unwrap();
        let mut habit = db
            .insert_habit(&Habit::new(user.id, "Read", 5, date(2025, 6, 1)))
            .unwrap();
        habit.completed_days.insert(date(2025, 6, 1));
        db.update_habit(&habit).unwrap();
        db.upsert_reminder(habit.id, time(8, 0)).unwrap();

        db.delete_habit(habit.id).unwrap();

        assert!(db.habit_by_id(habit.id).unwrap().is_none());
        assert!(db.reminder_for_habit(habit.id).unwrap().is_none());
        let days: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM habit_completed_days WHERE habit_id = ?1",
                params![habit.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(days, 0);
    }

    #[test]
    fn reminder_upsert_updates_time_and_reenables() {
        let db = Database::open_memory().unwrap();
        let user = db.insert_user("ana", None).unwrap();
        let habit = db
            .insert_habit(&Habit::new(user.id, "Read", 5, date(2025, 6, 1)))
            .unwrap();

        let first = db.upsert_reminder(habit.id, time(8, 0)).unwrap();
        assert!(first.enabled);

        db.conn()
            .execute("UPDATE habit_reminders SET enabled = 0", [])
            .unwrap();

        let second = db.upsert_reminder(habit.id, time(9, 30)).unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.time, time(9, 30));
        assert!(second.enabled);
    }

    #[test]
    fn due_reminders_match_exact_minute_only() {
        let db = Database::open_memory().unwrap();
        let user = db.insert_user("ana", None).unwrap();
        let habit = db
            .insert_habit(&Habit::new(user.id, "Read", 5, date(2025, 6, 1)))
            .unwrap();
        db.upsert_reminder(habit.id, time(8, 0)).unwrap();

        assert_eq!(db.due_reminders(time(8, 0)).unwrap().len(), 1);
        assert!(db.due_reminders(time(8, 1)).unwrap().is_empty());
        assert!(db.due_reminders(time(7, 59)).unwrap().is_empty());
    }

    #[test]
    fn disabled_reminders_are_never_due() {
        let db = Database::open_memory().unwrap();
        let user = db.insert_user("ana", None).unwrap();
        let habit = db
            .insert_habit(&Habit::new(user.id, "Read", 5, date(2025, 6, 1)))
            .unwrap();
        db.upsert_reminder(habit.id, time(8, 0)).unwrap();
        db.conn()
            .execute("UPDATE habit_reminders SET enabled = 0", [])
            .unwrap();

        assert!(db.due_reminders(time(8, 0)).unwrap().is_empty());
    }

    #[test]
    fn transaction_rolls_back_on_error() {
        let db = Database::open_memory().unwrap();
        let user = db.insert_user("ana", None).unwrap();

        let result: Result<(), DatabaseError> = db.transaction(|db| {
            db.insert_habit(&Habit::new(user.id, "Read", 5, date(2025, 6, 1)))?;
            Err(DatabaseError::QueryFailed("boom".into()))
        });
        assert!(result.is_err());
        assert!(db.habits_for_user(user.id).unwrap().is_empty());
    }
}
