//! User management commands for CLI.

use clap::Subcommand;
use habitforge_core::storage::Database;
use habitforge_core::HabitService;

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a new user
    Add {
        /// Unique username
        username: String,
        /// Contact address for reminder delivery
        #[arg(long)]
        email: Option<String>,
    },
    /// List registered users
    List,
}

pub fn run(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = HabitService::new(Database::open()?);

    match action {
        UserAction::Add { username, email } => {
            let user = service.register_user(&username, email.as_deref())?;
            println!("User created: {} (id {})", user.username, user.id);
            if user.email.is_none() {
                println!("note: no email set; reminders for this user will be skipped");
            }
        }
        UserAction::List => {
            for user in service.users()? {
                let email = user.email.as_deref().unwrap_or("-");
                println!("{:>4}  {:<20} {}", user.id, user.username, email);
            }
        }
    }

    Ok(())
}
