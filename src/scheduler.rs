//! One-shot reminder timers, one per note.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::{AlarmSchedule, AlarmService, NoteStore};

/// Prefix for reminder timer names; the note ID follows it
pub const REMINDER_PREFIX: &str = "reminder_";

/// Shortest allowed delay before a reminder fires. Near-term and past
/// targets are clamped to this instead of being rejected.
const MIN_DELAY_SECS: i64 = 6;

/// Schedules one-shot reminder timers named after note IDs.
///
/// The scheduler holds no note data; the ID embedded in the timer name is
/// the only link back to the note.
pub struct ReminderScheduler {
    alarms: Arc<AlarmService>,
}

impl ReminderScheduler {
    pub fn new(alarms: Arc<AlarmService>) -> Self {
        Self { alarms }
    }

    /// Timer name for a note
    pub fn alarm_name(note_id: &str) -> String {
        format!("{}{}", REMINDER_PREFIX, note_id)
    }

    /// Note ID carried by a reminder timer name, if it is one
    pub fn note_id(alarm_name: &str) -> Option<&str> {
        alarm_name.strip_prefix(REMINDER_PREFIX)
    }

    /// Schedules the reminder for a note, replacing any pending one. The
    /// firing time is clamped to at least six seconds from now.
    pub fn schedule(&self, note_id: &str, when: DateTime<Utc>) {
        let earliest = Utc::now() + chrono::Duration::seconds(MIN_DELAY_SECS);
        let target = when.max(earliest);

        if target > when {
            debug!("Reminder for {} clamped to the minimum delay", note_id);
        }

        info!("Scheduling reminder for note {} at {}", note_id, target);
        self.alarms
            .create(&Self::alarm_name(note_id), AlarmSchedule::once(target));
    }

    /// Cancels the pending reminder for a note. Returns false when none
    /// was pending.
    pub fn cancel(&self, note_id: &str) -> bool {
        let cleared = self.alarms.clear(&Self::alarm_name(note_id));
        if cleared {
            info!("Cancelled reminder for note {}", note_id);
        }
        cleared
    }

    /// Whether a reminder timer is pending for the note
    pub fn is_scheduled(&self, note_id: &str) -> bool {
        self.alarms.is_scheduled(&Self::alarm_name(note_id))
    }

    /// Rebuilds timers from stored note state. Only reminders still in
    /// the future are scheduled; past ones are treated as missed.
    ///
    /// # Returns
    ///
    /// How many reminders were scheduled
    pub fn restore(&self, store: &NoteStore) -> usize {
        let now = Utc::now();
        let mut restored = 0;

        for note in store.get_all() {
            if let Some(when) = note.reminder {
                if when > now {
                    self.schedule(&note.id, when);
                    restored += 1;
                } else {
                    warn!("Reminder for note {} already passed, skipping", note.id);
                }
            }
        }

        info!("Restored {} reminders from storage", restored);
        restored
    }
}
