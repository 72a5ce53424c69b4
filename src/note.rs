//! The note entity and the filter/sort vocabulary used when querying notes.
//!
//! Notes are plain data. Every mutation here touches fields and timestamps
//! only; persistence and timers live in their own modules.
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Datelike, Days, Local, Utc};
use serde::{Deserialize, Serialize};

/// Process-local counter folded into generated IDs so notes created within
/// the same millisecond stay distinct.
static NOTE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Represents a single note
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier for the note
    pub id: String,
    /// Note title (may be empty for clipped selections)
    #[serde(default)]
    pub title: String,
    /// Note content
    #[serde(default)]
    pub content: String,
    /// Tags for organization
    #[serde(default)]
    pub tags: Vec<String>,
    /// Source URL, for notes clipped from a page
    #[serde(default)]
    pub url: Option<String>,
    /// When to remind about this note, if at all
    #[serde(default)]
    pub reminder: Option<DateTime<Utc>>,
    /// When the note was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Whether the note is pinned to the top of listings
    #[serde(default)]
    pub pinned: bool,
    /// Whether the note is marked as done
    #[serde(default)]
    pub completed: bool,
}

impl Note {
    /// Creates a new note with the given title, content and tags
    pub fn new(title: String, content: String, tags: Vec<String>) -> Self {
        let now = Utc::now();
        // Millisecond timestamp plus a sequence number. IDs are never
        // reassigned, even when several notes land in the same instant.
        let id = format!(
            "{}-{}",
            now.timestamp_millis(),
            NOTE_SEQ.fetch_add(1, Ordering::Relaxed)
        );

        Note {
            id,
            title,
            content,
            tags,
            url: None,
            reminder: None,
            created_at: now,
            updated_at: now,
            pinned: false,
            completed: false,
        }
    }

    /// Flips the pinned flag, returning the new state
    pub fn toggle_pin(&mut self) -> bool {
        self.pinned = !self.pinned;
        self.updated_at = Utc::now();
        self.pinned
    }

    /// Flips the completed flag, returning the new state
    pub fn toggle_complete(&mut self) -> bool {
        self.completed = !self.completed;
        self.updated_at = Utc::now();
        self.completed
    }

    /// Sets or clears the reminder time. Scheduling the actual timer is
    /// the caller's business; the entity only records the intent.
    pub fn set_reminder(&mut self, when: Option<DateTime<Utc>>) {
        self.reminder = when;
        self.updated_at = Utc::now();
    }

    /// Merges the provided fields into this note
    pub fn apply(&mut self, update: &NoteUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(content) = &update.content {
            self.content = content.clone();
        }
        if let Some(tags) = &update.tags {
            self.tags = tags.clone();
        }
        if let Some(url) = &update.url {
            self.url = url.clone();
        }
        if let Some(reminder) = &update.reminder {
            self.reminder = *reminder;
        }
        if let Some(pinned) = update.pinned {
            self.pinned = pinned;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        self.updated_at = Utc::now();
    }

    /// Case-insensitive substring match over title, content and tags.
    /// An empty query matches every note.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.title.to_lowercase().contains(&query)
            || self.content.to_lowercase().contains(&query)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&query))
    }

    /// Whether the note belongs to the given category
    pub fn matches_filter(&self, filter: NoteFilter) -> bool {
        match filter {
            NoteFilter::All => true,
            NoteFilter::Pinned => self.pinned,
            NoteFilter::Active => !self.completed,
            NoteFilter::Completed => self.completed,
            NoteFilter::Today => {
                self.created_at.with_timezone(&Local).date_naive() == Local::now().date_naive()
            }
            NoteFilter::ThisWeek => {
                let today = Local::now().date_naive();
                // Weeks start on Sunday for this category.
                let week_start = today - Days::new(today.weekday().num_days_from_sunday() as u64);
                self.created_at.with_timezone(&Local).date_naive() >= week_start
            }
        }
    }
}

/// A partial update to a note. `None` leaves a field untouched; the nested
/// Option on `url` and `reminder` allows clearing them explicitly.
#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub url: Option<Option<String>>,
    pub reminder: Option<Option<DateTime<Utc>>>,
    pub pinned: Option<bool>,
    pub completed: Option<bool>,
}

/// Category filters for note listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteFilter {
    #[default]
    All,
    Pinned,
    Active,
    Completed,
    Today,
    ThisWeek,
}

impl NoteFilter {
    /// Parses a filter name, falling back to `All` for anything unknown
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "pinned" => NoteFilter::Pinned,
            "active" => NoteFilter::Active,
            "completed" => NoteFilter::Completed,
            "today" => NoteFilter::Today,
            "thisweek" | "this-week" | "week" => NoteFilter::ThisWeek,
            _ => NoteFilter::All,
        }
    }
}

/// Sort orders for note listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteSort {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl NoteSort {
    /// Parses a sort name, falling back to `Newest` for anything unknown
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "oldest" => NoteSort::Oldest,
            "title" => NoteSort::Title,
            _ => NoteSort::Newest,
        }
    }
}
