//! Reminder scheduler commands for CLI.

use std::time::Duration;

use clap::Subcommand;
use habitforge_core::storage::{Config, Database};
use habitforge_core::{ReminderScheduler, SystemClock, WebhookNotifier};
use tracing_subscriber::EnvFilter;

#[derive(Subcommand)]
pub enum SchedulerAction {
    /// Run the reminder delivery loop until interrupted
    Run,
}

pub fn run(action: SchedulerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SchedulerAction::Run => run_loop(),
    }
}

fn run_loop() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,habitforge_core=debug")),
        )
        .init();

    let config = Config::load()?;
    let notifier = WebhookNotifier::from_config(&config.notifier)?;
    let db = Database::open()?;
    let scheduler = ReminderScheduler::new(
        db,
        SystemClock,
        notifier,
        Duration::from_secs(config.notifier.send_timeout_secs),
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        tokio::select! {
            _ = scheduler.run() => {}
            _ = tokio::signal::ctrl_c() => {
                println!("scheduler stopped");
            }
        }
    });

    Ok(())
}
