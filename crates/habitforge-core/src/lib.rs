//! # HabitForge Core Library
//!
//! This library provides the core business logic for the HabitForge habit
//! tracker. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary, with any outer transport (REST,
//! desktop shell) expected to be a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Streak Engine**: Pure per-check-in state transition -- at most one
//!   accepted check-in per calendar date, contiguous-day streak counting,
//!   monotonic completion
//! - **Storage**: SQLite-based habit/user/reminder persistence and
//!   TOML-based configuration
//! - **Reminder Scheduler**: A minute-aligned recurring task that matches
//!   enabled reminders against the current minute and delivers each one
//!   independently
//! - **Notifier**: Trait seam for delivery transports (webhook mail
//!   gateway in production, recording fakes in tests)
//!
//! ## Key Components
//!
//! - [`HabitService`]: Request-facing operation surface
//! - [`habit::streak`]: The check-in state transition
//! - [`ReminderScheduler`]: Due-reminder matching and delivery loop
//! - [`Database`]: Habit, user, and reminder persistence
//! - [`Clock`]: Injectable calendar/time provider

pub mod account;
pub mod clock;
pub mod error;
pub mod habit;
pub mod notify;
pub mod reminder;
pub mod scheduler;
pub mod service;
pub mod storage;

pub use account::User;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, HabitError, NotifyError, ValidationError};
pub use habit::{Habit, HabitEdit, SortKey, SortOrder};
pub use notify::{Notifier, WebhookNotifier};
pub use reminder::Reminder;
pub use scheduler::{ReminderScheduler, TickSummary};
pub use service::HabitService;
pub use storage::{Config, Database, NotifierConfig};
