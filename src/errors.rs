//! Error types for the quicknote application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur during note management and scheduling operations.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the quicknote application.
#[derive(Error, Debug)]
pub enum QnError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Note was not found when performing an operation.
    #[error("Note not found: {id}")]
    NoteNotFound { id: String },

    /// Note has neither a title nor any content.
    #[error("Note needs a title or some content")]
    EmptyNote,

    /// Reminder time could not be parsed or is not in the future.
    #[error("Invalid reminder time: {message}")]
    InvalidReminder { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Errors from the scheduling subsystem.
    #[error("Scheduler error: {message}")]
    SchedulerError { message: String },

    #[error("{message}")]
    EditorError { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
