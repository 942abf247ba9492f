pub mod habit;
pub mod reminder;
pub mod scheduler;
pub mod user;
