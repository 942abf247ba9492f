use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "habitforge-cli", version, about = "HabitForge CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Habit management and check-ins
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Reminder management
    Reminder {
        #[command(subcommand)]
        action: commands::reminder::ReminderAction,
    },
    /// Reminder delivery scheduler
    Scheduler {
        #[command(subcommand)]
        action: commands::scheduler::SchedulerAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::User { action } => commands::user::run(action),
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Reminder { action } => commands::reminder::run(action),
        Commands::Scheduler { action } => commands::scheduler::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
