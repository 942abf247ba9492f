//! Database schema migrations for habitforge.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current
/// schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: initial schema.
///
/// Users, habits, the set-valued completed-day collection, and the
/// one-reminder-per-habit table.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            username  TEXT NOT NULL UNIQUE,
            email     TEXT
        );

        CREATE TABLE IF NOT EXISTS habits (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id        INTEGER NOT NULL REFERENCES users(id),
            title          TEXT NOT NULL,
            target_days    INTEGER NOT NULL,
            start_date     TEXT NOT NULL,
            current_streak INTEGER NOT NULL DEFAULT 0,
            last_check_in  TEXT,
            completed      INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS habit_completed_days (
            habit_id INTEGER NOT NULL REFERENCES habits(id),
            day      TEXT NOT NULL,
            PRIMARY KEY (habit_id, day)
        );

        CREATE TABLE IF NOT EXISTS habit_reminders (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id      INTEGER NOT NULL UNIQUE REFERENCES habits(id),
            reminder_time TEXT NOT NULL,
            enabled       INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_habits_user_id ON habits(user_id);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: index for the scheduler's due-reminder lookup.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_reminders_time_enabled
             ON habit_reminders(reminder_time, enabled);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}
