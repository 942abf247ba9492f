//! Reminder management commands for CLI.

use clap::Subcommand;
use habitforge_core::reminder::format_time;
use habitforge_core::storage::Database;
use habitforge_core::HabitService;

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Set (or update) a habit's daily reminder
    Set {
        /// Owning username
        username: String,
        /// Habit ID
        habit_id: i64,
        /// Time of day, HH:MM
        time: String,
    },
    /// Show a habit's reminder
    Get {
        /// Habit ID
        habit_id: i64,
    },
    /// Remove a habit's reminder
    Clear {
        /// Owning username
        username: String,
        /// Habit ID
        habit_id: i64,
    },
}

pub fn run(action: ReminderAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = HabitService::new(Database::open()?);

    match action {
        ReminderAction::Set {
            username,
            habit_id,
            time,
        } => match service.set_reminder(&username, habit_id, &time)? {
            Some(reminder) => println!(
                "Reminder set for habit {habit_id} at {}",
                format_time(reminder.time)
            ),
            None => println!("Reminder cleared for habit {habit_id}"),
        },
        ReminderAction::Get { habit_id } => match service.reminder_for(habit_id)? {
            Some(reminder) => {
                let state = if reminder.enabled { "enabled" } else { "disabled" };
                println!("{} ({state})", format_time(reminder.time));
            }
            None => println!("no reminder"),
        },
        ReminderAction::Clear { username, habit_id } => {
            service.set_reminder(&username, habit_id, "")?;
            println!("Reminder cleared for habit {habit_id}");
        }
    }

    Ok(())
}
