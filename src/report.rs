//! Weekly activity report.
use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, Utc};

use crate::{display_title, Note, NoteStore};

/// Summary of one Monday-to-Sunday week of note activity
#[derive(Debug, Clone)]
pub struct WeeklyReport {
    /// Monday of the reported week
    pub week_start: NaiveDate,
    /// Sunday of the reported week
    pub week_end: NaiveDate,
    /// Notes created during the week
    pub total: usize,
    /// Of those, how many are completed
    pub completed: usize,
    /// Of those, how many are still open
    pub pending: usize,
    /// Tag usage during the week, most used first
    pub tag_counts: Vec<(String, usize)>,
    /// Currently pinned notes, in collection order
    pub pinned: Vec<Note>,
    /// Notes with a reminder still to handle, soonest first
    pub pending_reminders: Vec<Note>,
    /// The saved reflection for this week, if any
    pub reflection: Option<String>,
}

/// Monday and Sunday of the week containing the given day
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = day - Days::new(day.weekday().num_days_from_monday() as u64);
    (monday, monday + Days::new(6))
}

impl WeeklyReport {
    /// Builds the report for the week containing `day`
    pub fn for_week(store: &NoteStore, day: NaiveDate) -> Self {
        let (week_start, week_end) = week_bounds(day);
        let notes = store.get_all();

        let in_week = |created: DateTime<Utc>| {
            let date = created.with_timezone(&Local).date_naive();
            date >= week_start && date <= week_end
        };

        let week_notes: Vec<&Note> = notes.iter().filter(|n| in_week(n.created_at)).collect();
        let completed = week_notes.iter().filter(|n| n.completed).count();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for note in &week_notes {
            for tag in &note.tags {
                *counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        let mut tag_counts: Vec<(String, usize)> = counts.into_iter().collect();
        tag_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let pinned: Vec<Note> = notes.iter().filter(|n| n.pinned).cloned().collect();

        let mut pending_reminders: Vec<Note> = notes
            .iter()
            .filter(|n| n.reminder.is_some() && !n.completed)
            .cloned()
            .collect();
        pending_reminders.sort_by_key(|n| n.reminder);

        WeeklyReport {
            week_start,
            week_end,
            total: week_notes.len(),
            completed,
            pending: week_notes.len() - completed,
            tag_counts,
            pinned,
            pending_reminders,
            reflection: store.reflection(week_start),
        }
    }

    /// Renders the plain-text export of the report
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "📊 Weekly Report ({} ~ {})\n",
            self.week_start.format("%Y-%m-%d"),
            self.week_end.format("%Y-%m-%d")
        ));
        out.push_str("==============================\n\n");
        out.push_str(&format!("📝 Notes this week: {}\n", self.total));
        out.push_str(&format!("✅ Completed: {}\n", self.completed));
        out.push_str(&format!("⏳ Pending: {}\n", self.pending));

        if !self.tag_counts.is_empty() {
            out.push_str("\n🏷️ Tags:\n");
            for (tag, count) in &self.tag_counts {
                out.push_str(&format!("  - {}: {}\n", tag, count));
            }
        }

        if !self.pinned.is_empty() {
            out.push_str("\n📌 Pinned notes:\n");
            for note in &self.pinned {
                out.push_str(&format!("  - {}\n", display_title(note)));
            }
        }

        if !self.pending_reminders.is_empty() {
            out.push_str("\n⏰ Upcoming reminders:\n");
            for note in &self.pending_reminders {
                if let Some(when) = note.reminder {
                    out.push_str(&format!(
                        "  - {} ({})\n",
                        display_title(note),
                        when.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                    ));
                }
            }
        }

        if let Some(reflection) = &self.reflection {
            out.push_str("\n💭 Reflection:\n");
            out.push_str(reflection);
            out.push('\n');
        }

        out
    }
}
