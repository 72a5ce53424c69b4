//! Recurring weekly digest timers.
//!
//! Two independent weekly slots, Friday evening and Monday morning, both
//! in local time so the slots track wall-clock hours across DST shifts.
use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Datelike, Days, Local, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use log::{info, warn};

use crate::{AlarmSchedule, AlarmService};

/// Timer name for the Friday evening digest
pub const DIGEST_FRIDAY: &str = "weeklyReport_friday";
/// Timer name for the Monday morning digest
pub const DIGEST_MONDAY: &str = "weeklyReport_monday";

/// One week, the re-arm period for both digest timers
const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// The two weekly digest slots
const SLOTS: [(&str, Weekday, u32, u32); 2] = [
    (DIGEST_FRIDAY, Weekday::Fri, 18, 0),
    (DIGEST_MONDAY, Weekday::Mon, 9, 0),
];

/// Schedules the recurring weekly digest notifications
pub struct WeeklyDigestScheduler {
    alarms: Arc<AlarmService>,
}

impl WeeklyDigestScheduler {
    pub fn new(alarms: Arc<AlarmService>) -> Self {
        Self { alarms }
    }

    /// Whether the name belongs to one of the digest timers
    pub fn is_digest_alarm(name: &str) -> bool {
        name == DIGEST_FRIDAY || name == DIGEST_MONDAY
    }

    /// (Re)schedules both weekly slots from their next occurrence. Any
    /// previously pending digest timers are replaced; occurrences missed
    /// while nothing was running are skipped, not caught up.
    pub fn start(&self) {
        let now = Local::now();

        for (name, weekday, hour, minute) in SLOTS {
            match next_occurrence(now, weekday, hour, minute) {
                Some(first) => {
                    info!("Scheduling {} for {}", name, first);
                    self.alarms
                        .create(name, AlarmSchedule::repeating(first.with_timezone(&Utc), WEEK));
                }
                None => warn!("Could not compute next occurrence for {}", name),
            }
        }
    }

    /// Cancels both digest timers
    pub fn stop(&self) {
        self.alarms.clear(DIGEST_FRIDAY);
        self.alarms.clear(DIGEST_MONDAY);
        info!("Weekly digest timers stopped");
    }

    /// Whether both digest timers are pending
    pub fn is_running(&self) -> bool {
        self.alarms.is_scheduled(DIGEST_FRIDAY) && self.alarms.is_scheduled(DIGEST_MONDAY)
    }
}

/// Next instant falling on the given weekday at the given local wall-clock
/// time, strictly after `from` and at most seven days ahead.
pub fn next_occurrence(
    from: DateTime<Local>,
    weekday: Weekday,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Local>> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let days_ahead =
        (7 + weekday.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;

    let mut date = from
        .date_naive()
        .checked_add_days(Days::new(days_ahead as u64))?;
    let mut candidate = resolve_local(date.and_time(time))?;

    // Same-day targets that already passed (or are passing right now)
    // move to next week.
    if candidate <= from {
        date = date.checked_add_days(Days::new(7))?;
        candidate = resolve_local(date.and_time(time))?;
    }

    Some(candidate)
}

/// Resolves a naive local time to an instant. Ambiguous times take the
/// earlier reading; times skipped by a DST jump slide forward an hour.
fn resolve_local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    Local.from_local_datetime(&naive).earliest().or_else(|| {
        Local
            .from_local_datetime(&(naive + chrono::Duration::hours(1)))
            .earliest()
    })
}
