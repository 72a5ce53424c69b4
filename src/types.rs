//! Core shared types for the quicknote application.
//!
//! This module contains the crate-wide Result alias and the CLI command
//! definitions consumed by the application entry point.
use std::path::PathBuf;

use clap::Subcommand;

use crate::QnError;

/// A specialized Result type for quicknote operations.
pub type Result<T> = std::result::Result<T, QnError>;

/// Available subcommands for the quicknote application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    Add {
        /// Title of the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// Content of the note
        #[clap(short, long)]
        content: Option<String>,

        /// Tags to associate with the note (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// Source URL to attach to the note
        #[clap(short, long)]
        url: Option<String>,

        /// Reminder time (RFC 3339 or "YYYY-MM-DD HH:MM" local)
        #[clap(short, long)]
        remind: Option<String>,

        /// Compose the content in your editor before saving
        #[clap(short, long)]
        edit: bool,
    },

    /// Save a snippet of text as an untitled note
    Clip {
        /// The text to save
        text: String,

        /// Source URL the text came from
        #[clap(short, long)]
        url: Option<String>,
    },

    /// List notes with optional filtering
    List {
        /// Category filter: all, pinned, active, completed, today, thisweek
        #[clap(short, long, default_value = "all")]
        filter: String,

        /// Search query matched against titles, content, and tags
        #[clap(short, long)]
        search: Option<String>,

        /// Sort order: newest, oldest, title
        #[clap(short = 'o', long, default_value = "newest")]
        sort: String,

        /// Limit the number of notes shown (0 means no limit)
        #[clap(short = 'n', long, default_value_t = 0)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// View a note by ID
    View {
        /// ID of the note to view
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Edit an existing note
    Edit {
        /// ID of the note to edit
        id: String,

        /// New title for the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the note
        #[clap(short, long)]
        content: Option<String>,

        /// Replacement tags (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// New source URL (pass an empty string to clear it)
        #[clap(short, long)]
        url: Option<String>,

        /// Open the content in your editor
        #[clap(short, long)]
        edit: bool,
    },

    /// Delete a note by ID
    Delete {
        /// ID of the note to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Toggle a note's pinned flag
    Pin {
        /// ID of the note to pin or unpin
        id: String,
    },

    /// Toggle a note's completed flag
    Done {
        /// ID of the note to complete or reopen
        id: String,
    },

    /// Set or clear a note's reminder
    Remind {
        /// ID of the note
        id: String,

        /// Reminder time (RFC 3339 or "YYYY-MM-DD HH:MM" local)
        #[clap(short, long)]
        at: Option<String>,

        /// Clear the reminder instead of setting one
        #[clap(short, long)]
        clear: bool,
    },

    /// Show the weekly report
    Report {
        /// A day in the week to report on (YYYY-MM-DD, defaults to today)
        #[clap(short, long)]
        week: Option<String>,

        /// Save a reflection for the week
        #[clap(short, long)]
        reflect: Option<String>,

        /// Export the report as text to a file
        #[clap(short, long)]
        export: Option<PathBuf>,
    },

    /// List every tag in use
    Tags,

    /// Show or set the color theme
    Theme {
        /// "dark" or "light"; omit to show the current theme
        mode: Option<String>,
    },

    /// Run the reminder and digest schedulers until interrupted
    Watch,
}
