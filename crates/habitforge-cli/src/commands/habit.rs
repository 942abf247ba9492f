//! Habit management commands for CLI.

use clap::Subcommand;
use habitforge_core::reminder::format_time;
use habitforge_core::storage::Database;
use habitforge_core::{Habit, HabitEdit, HabitService};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Create {
        /// Owning username
        username: String,
        /// Habit title
        title: String,
        /// Streak length that marks the habit completed
        #[arg(long, default_value = "21")]
        target_days: u32,
    },
    /// List habits for a user
    List {
        /// Owning username
        username: String,
        /// Sort key: startDate, streak, completed, or id
        #[arg(long, default_value = "startDate")]
        sort_by: String,
        /// Sort order: asc or desc
        #[arg(long, default_value = "asc")]
        order: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check in to a habit for today
    CheckIn {
        /// Owning username
        username: String,
        /// Habit ID
        habit_id: i64,
    },
    /// Edit a habit's fields
    Edit {
        /// Owning username
        username: String,
        /// Habit ID
        habit_id: i64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New target streak length
        #[arg(long)]
        target_days: Option<u32>,
        /// Set completed status
        #[arg(long)]
        completed: Option<bool>,
        /// Set the daily reminder time (HH:MM)
        #[arg(long, conflicts_with = "clear_reminder")]
        reminder: Option<String>,
        /// Remove any reminder
        #[arg(long)]
        clear_reminder: bool,
    },
    /// Delete a habit (and its reminder)
    Delete {
        /// Owning username
        username: String,
        /// Habit ID
        habit_id: i64,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = HabitService::new(Database::open()?);

    match action {
        HabitAction::Create {
            username,
            title,
            target_days,
        } => {
            let habit = service.create_habit(&username, &title, target_days)?;
            println!(
                "Habit created: {} (id {}, target {} days)",
                habit.title, habit.id, habit.target_days
            );
        }
        HabitAction::List {
            username,
            sort_by,
            order,
            json,
        } => {
            let habits = service.sorted_habits(&username, &sort_by, &order)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else {
                for habit in &habits {
                    print_habit(habit);
                }
            }
        }
        HabitAction::CheckIn { username, habit_id } => {
            let habit = service.check_in(&username, habit_id)?;
            println!(
                "Check-in accepted: {} is on a {}-day streak",
                habit.title, habit.current_streak
            );
            if habit.completed {
                println!("Target reached -- habit completed!");
            }
        }
        HabitAction::Edit {
            username,
            habit_id,
            title,
            target_days,
            completed,
            reminder,
            clear_reminder,
        } => {
            // Unset flags keep the stored value; the edit itself applies
            // every field unconditionally.
            let current = service
                .list_habits(&username)?
                .into_iter()
                .find(|h| h.id == habit_id);
            let Some(current) = current else {
                return Err(format!("habit {habit_id} not found for '{username}'").into());
            };

            let reminder_time = if clear_reminder {
                None
            } else if reminder.is_some() {
                reminder
            } else {
                service
                    .reminder_for(habit_id)?
                    .map(|r| format_time(r.time))
            };

            let edit = HabitEdit {
                title: title.unwrap_or(current.title),
                target_days: target_days.unwrap_or(current.target_days),
                completed: completed.unwrap_or(current.completed),
                reminder_time,
            };
            let habit = service.edit_habit(&username, habit_id, &edit)?;
            println!("Habit updated: {} (id {})", habit.title, habit.id);
        }
        HabitAction::Delete { username, habit_id } => {
            service.delete_habit(&username, habit_id)?;
            println!("Habit {habit_id} deleted.");
        }
    }

    Ok(())
}

fn print_habit(habit: &Habit) {
    let status = if habit.completed { "done" } else { "open" };
    let last = habit
        .last_check_in
        .map(|d| d.to_string())
        .unwrap_or_else(|| "never".into());
    println!(
        "{:>4}  {:<24} streak {:>3}/{:<3} [{}] started {}, last check-in {}",
        habit.id, habit.title, habit.current_streak, habit.target_days, status, habit.start_date, last
    );
}
