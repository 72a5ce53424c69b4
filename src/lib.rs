//! Quick note-taking application library
//!
//! This library provides functionality for creating, storing, and managing
//! short notes with tags, reminders, and a weekly report, plus the schedulers
//! that deliver reminder and digest notifications.

mod alarm;
mod background;
mod cli;
mod digest;
mod errors;
mod helper;
mod note;
mod notify;
mod report;
mod scheduler;
mod store;
mod types;
mod config;

// Re-export key components
pub use alarm::*;
pub use background::*;
pub use config::*;
pub use cli::*;
pub use digest::*;
pub use errors::*;
pub use helper::*;
pub use note::*;
pub use notify::*;
pub use report::*;
pub use scheduler::*;
pub use store::*;
pub use types::*;
