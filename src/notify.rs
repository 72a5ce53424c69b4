//! Notification construction and routing.
//!
//! The dispatcher turns events into [`Notification`] values and hands
//! them to a [`NotificationSink`], which owns presentation. Interaction
//! callbacks come back through the dispatcher so button behavior stays in
//! one place.
use std::sync::Arc;

use log::{debug, info, warn};

use crate::{truncate_chars, NoteStore, NoteUpdate, REMINDER_PREFIX};

/// Notification ID for the weekly digest prompt
pub const NOTIFY_DIGEST: &str = "weeklyReport";
/// Notification ID shown after a note is saved
pub const NOTIFY_SAVED: &str = "saveConfirm";
/// Notification ID shown after a text selection is clipped
pub const NOTIFY_CLIPPED: &str = "selectionSaved";

/// Maximum characters of note content shown in a reminder body
const BODY_LIMIT: usize = 100;

/// A notification ready to be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Stable ID; showing the same ID twice replaces the first
    pub id: String,
    pub title: String,
    pub message: String,
    /// Button labels, leftmost first
    pub buttons: Vec<String>,
    /// 2 for time-critical, 1 for ambient prompts, 0 otherwise
    pub priority: u8,
}

/// Where a notification interaction should take the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// The note list, optionally focused on one note
    NoteList { focus: Option<String> },
    /// The weekly report view
    Report,
}

/// Presentation side of notifications
pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: Notification);
    fn dismiss(&self, id: &str);
}

/// Notification ID for a note's reminder
pub fn reminder_notification_id(note_id: &str) -> String {
    format!("{}{}", REMINDER_PREFIX, note_id)
}

/// Builds notifications from events and routes interactions back to the
/// store. The dispatcher keeps no state of its own; everything it needs
/// is fetched at the moment a notification fires.
pub struct NotificationDispatcher {
    store: Arc<NoteStore>,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<NoteStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    /// Shows the reminder notification for a note. The note is fetched
    /// fresh; a note deleted since its timer was set is a quiet no-op.
    pub fn show_reminder(&self, note_id: &str) {
        let Some(note) = self.store.get_by_id(note_id) else {
            warn!("Reminder fired for missing note {}, ignoring", note_id);
            return;
        };

        let body = if note.content.is_empty() {
            note.title.clone()
        } else {
            note.content.clone()
        };
        let title = if note.title.is_empty() {
            "Note reminder".to_string()
        } else {
            note.title.clone()
        };

        info!("Showing reminder for note {}", note_id);
        self.sink.show(Notification {
            id: reminder_notification_id(note_id),
            title,
            message: truncate_chars(&body, BODY_LIMIT),
            buttons: vec!["View note".to_string(), "Mark as done".to_string()],
            priority: 2,
        });
    }

    /// Shows the weekly digest prompt
    pub fn show_weekly_digest(&self) {
        info!("Showing weekly digest notification");
        self.sink.show(Notification {
            id: NOTIFY_DIGEST.to_string(),
            title: "Weekly report ready".to_string(),
            message: "Take a look at what you noted this week.".to_string(),
            buttons: vec!["View report".to_string()],
            priority: 1,
        });
    }

    /// Confirmation shown right after a note is saved
    pub fn show_save_confirmation(&self) {
        self.sink.show(Notification {
            id: NOTIFY_SAVED.to_string(),
            title: "Note saved".to_string(),
            message: "Your note has been saved.".to_string(),
            buttons: vec!["View notes".to_string()],
            priority: 0,
        });
    }

    /// Confirmation shown after a clipped selection is saved
    pub fn show_selection_saved(&self) {
        self.sink.show(Notification {
            id: NOTIFY_CLIPPED.to_string(),
            title: "Selection saved".to_string(),
            message: "The selected text was saved as a note.".to_string(),
            buttons: vec!["View notes".to_string()],
            priority: 0,
        });
    }

    /// Body click: dismiss, then navigate to whatever the notification
    /// was about
    pub fn handle_click(&self, id: &str) -> Option<NavigationTarget> {
        self.sink.dismiss(id);

        match kind_of(id) {
            NotificationKind::Reminder(note_id) => Some(NavigationTarget::NoteList {
                focus: Some(note_id.to_string()),
            }),
            NotificationKind::Digest => Some(NavigationTarget::Report),
            NotificationKind::Confirmation => Some(NavigationTarget::NoteList { focus: None }),
            NotificationKind::Unknown => {
                debug!("Click on unknown notification {}", id);
                None
            }
        }
    }

    /// Button click. Indexes are zero-based in the order the buttons were
    /// supplied.
    pub fn handle_button(&self, id: &str, button: usize) -> Option<NavigationTarget> {
        self.sink.dismiss(id);

        match (kind_of(id), button) {
            (NotificationKind::Reminder(note_id), 0) => Some(NavigationTarget::NoteList {
                focus: Some(note_id.to_string()),
            }),
            (NotificationKind::Reminder(note_id), 1) => {
                // Mark as done. Failures here have nowhere useful to go,
                // so they are logged and dropped.
                let update = NoteUpdate {
                    completed: Some(true),
                    ..NoteUpdate::default()
                };
                match self.store.update(note_id, &update) {
                    Ok(Some(_)) => info!("Note {} marked done from its reminder", note_id),
                    Ok(None) => warn!("Note {} gone before it could be marked done", note_id),
                    Err(e) => warn!("Could not mark note {} done: {}", note_id, e),
                }
                None
            }
            (NotificationKind::Reminder(_), _) => None,
            (NotificationKind::Digest, _) => Some(NavigationTarget::Report),
            (NotificationKind::Confirmation, _) => Some(NavigationTarget::NoteList { focus: None }),
            (NotificationKind::Unknown, _) => None,
        }
    }
}

enum NotificationKind<'a> {
    Reminder(&'a str),
    Digest,
    Confirmation,
    Unknown,
}

fn kind_of(id: &str) -> NotificationKind<'_> {
    if let Some(note_id) = id.strip_prefix(REMINDER_PREFIX) {
        NotificationKind::Reminder(note_id)
    } else if id == NOTIFY_DIGEST {
        NotificationKind::Digest
    } else if id == NOTIFY_SAVED || id == NOTIFY_CLIPPED {
        NotificationKind::Confirmation
    } else {
        NotificationKind::Unknown
    }
}
