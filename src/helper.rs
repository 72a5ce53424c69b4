//! Small shared helpers for parsing user input and formatting output.
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use crate::{Note, QnError, Result};

// Helper method for parsing tags
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Parses a reminder time and checks it lies in the future.
///
/// Accepted formats: RFC 3339, "YYYY-MM-DDTHH:MM" and "YYYY-MM-DD HH:MM"
/// (the latter two read as local time).
pub fn parse_reminder(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let input = input.trim();

    let parsed = DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_local(input, "%Y-%m-%dT%H:%M"))
        .or_else(|| parse_local(input, "%Y-%m-%d %H:%M"))
        .ok_or_else(|| QnError::InvalidReminder {
            message: format!("could not parse \"{}\"", input),
        })?;

    if parsed <= now {
        return Err(QnError::InvalidReminder {
            message: "reminder must be in the future".to_string(),
        });
    }

    Ok(parsed)
}

fn parse_local(input: &str, format: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(input, format).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Truncates to at most `max` characters, ellipsised when cut
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

/// Short date label for listings: time of day for today, then "Yesterday",
/// "N days ago", and a plain date beyond a week
pub fn format_relative(when: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let when_local = when.with_timezone(&Local);
    let days = (now.with_timezone(&Local).date_naive() - when_local.date_naive()).num_days();

    match days {
        i64::MIN..=0 => when_local.format("%H:%M").to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        _ => when_local.format("%Y-%m-%d").to_string(),
    }
}

/// Title for display, falling back to a content snippet for untitled notes
pub fn display_title(note: &Note) -> String {
    if !note.title.trim().is_empty() {
        return note.title.clone();
    }

    let snippet = truncate_chars(note.content.trim(), 40);
    if snippet.is_empty() {
        "(untitled)".to_string()
    } else {
        snippet
    }
}

/// A note must have a title or some content before it can be saved
pub fn validate_note_input(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() && content.trim().is_empty() {
        return Err(QnError::EmptyNote);
    }
    Ok(())
}
