//! Integration tests for reminder and digest scheduling, driven on a
//! paused clock so timer firings are deterministic.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Local, TimeZone, Timelike, Utc, Weekday};
use quicknote::{
    next_occurrence, reminder_notification_id, Background, Config, Note, NoteStore, Notification,
    NotificationSink, ReminderMessage, NOTIFY_DIGEST,
};
use tempfile::tempdir;
use tokio::sync::mpsc;
use tokio::time;

struct ChannelSink(mpsc::UnboundedSender<Notification>);

impl NotificationSink for ChannelSink {
    fn show(&self, notification: Notification) {
        let _ = self.0.send(notification);
    }

    fn dismiss(&self, _id: &str) {}
}

fn wired(
    dir: &tempfile::TempDir,
    digest_enabled: bool,
) -> (
    Arc<NoteStore>,
    Background,
    mpsc::UnboundedReceiver<Notification>,
) {
    let storage_path = dir.path().join("notes.json");
    let store = Arc::new(NoteStore::new(storage_path.clone()).expect("store should open"));
    let (tx, rx) = mpsc::unbounded_channel();
    let config = Config {
        storage_path,
        digest_enabled,
        editor_command: None,
    };
    let background = Background::new(Arc::clone(&store), Arc::new(ChannelSink(tx)), config);
    (store, background, rx)
}

#[tokio::test(start_paused = true)]
async fn fired_reminder_reaches_the_sink() {
    let dir = tempdir().expect("tempdir");
    let (store, mut background, mut shown) = wired(&dir, false);

    let note = Note::new(
        "water the plants".to_string(),
        "the big one first".to_string(),
        Vec::new(),
    );
    store.add(&note).expect("add");

    background.start().expect("start");
    background
        .message_sender()
        .send(ReminderMessage::Set {
            id: note.id.clone(),
            time: Utc::now() + chrono::Duration::minutes(30),
        })
        .expect("send");

    let notification = shown.recv().await.expect("notification");
    assert_eq!(notification.id, reminder_notification_id(&note.id));
    assert_eq!(notification.title, "water the plants");
    assert_eq!(notification.message, "the big one first");
    assert_eq!(
        notification.buttons,
        vec!["View note".to_string(), "Mark as done".to_string()]
    );
    assert_eq!(notification.priority, 2);

    background.stop();
}

#[tokio::test(start_paused = true)]
async fn deleting_the_note_silences_its_reminder() {
    let dir = tempdir().expect("tempdir");
    let (store, mut background, mut shown) = wired(&dir, false);

    let note = Note::new("short lived".to_string(), String::new(), Vec::new());
    store.add(&note).expect("add");

    background.start().expect("start");
    background
        .message_sender()
        .send(ReminderMessage::Set {
            id: note.id.clone(),
            time: Utc::now() + chrono::Duration::minutes(30),
        })
        .expect("send");

    // The timer stays armed; the fire-time lookup is what goes quiet
    store.delete(&note.id).expect("delete");

    let silence = time::timeout(Duration::from_secs(3600), shown.recv()).await;
    assert!(silence.is_err());
    assert!(!background.reminders().is_scheduled(&note.id));

    background.stop();
}

#[tokio::test(start_paused = true)]
async fn rescheduling_moves_the_reminder_instead_of_doubling_it() {
    let dir = tempdir().expect("tempdir");
    let (store, mut background, mut shown) = wired(&dir, false);

    let note = Note::new("check the oven".to_string(), String::new(), Vec::new());
    store.add(&note).expect("add");

    background.start().expect("start");
    let sender = background.message_sender();
    sender
        .send(ReminderMessage::Set {
            id: note.id.clone(),
            time: Utc::now() + chrono::Duration::minutes(30),
        })
        .expect("send");
    sender
        .send(ReminderMessage::Set {
            id: note.id.clone(),
            time: Utc::now() + chrono::Duration::hours(3),
        })
        .expect("send");

    let started = time::Instant::now();
    let notification = shown.recv().await.expect("notification");
    assert_eq!(notification.id, reminder_notification_id(&note.id));

    // Firing only at the later time shows the first timer was replaced
    assert!(started.elapsed() >= Duration::from_secs(2 * 3600));

    let silence = time::timeout(Duration::from_secs(4 * 3600), shown.recv()).await;
    assert!(silence.is_err());

    background.stop();
}

#[tokio::test(start_paused = true)]
async fn restored_reminders_fire_after_restart() {
    let dir = tempdir().expect("tempdir");

    let upcoming = {
        let store = NoteStore::new(dir.path().join("notes.json")).expect("store should open");

        let mut upcoming = Note::new("renew passport".to_string(), String::new(), Vec::new());
        upcoming.reminder = Some(Utc::now() + chrono::Duration::hours(2));
        store.add(&upcoming).expect("add");

        let mut stale = Note::new("missed it".to_string(), String::new(), Vec::new());
        stale.reminder = Some(Utc::now() - chrono::Duration::hours(2));
        store.add(&stale).expect("add");

        upcoming
    };

    let (_store, mut background, mut shown) = wired(&dir, false);
    background.start().expect("start");

    let notification = shown.recv().await.expect("restored reminder");
    assert_eq!(notification.id, reminder_notification_id(&upcoming.id));

    // The reminder that was already in the past stays quiet
    let silence = time::timeout(Duration::from_secs(24 * 3600), shown.recv()).await;
    assert!(silence.is_err());

    background.stop();
}

#[tokio::test(start_paused = true)]
async fn weekly_digest_notifies_on_both_slots() {
    let dir = tempdir().expect("tempdir");
    let (_store, mut background, mut shown) = wired(&dir, true);

    background.start().expect("start");

    let first = shown.recv().await.expect("first digest");
    let second = shown.recv().await.expect("second digest");

    assert_eq!(first.id, NOTIFY_DIGEST);
    assert_eq!(second.id, NOTIFY_DIGEST);
    assert_eq!(first.buttons, vec!["View report".to_string()]);
    assert_eq!(first.priority, 1);

    background.stop();
}

#[test]
fn digest_occurrences_stay_within_the_coming_week() {
    let bases = [
        Local.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).single(),
        Local.with_ymd_and_hms(2024, 3, 17, 8, 59, 59).single(),
        Local.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).single(),
    ];

    for base in bases.into_iter().flatten() {
        for (weekday, hour, minute) in [(Weekday::Fri, 18, 0), (Weekday::Mon, 9, 0)] {
            let next = next_occurrence(base, weekday, hour, minute).expect("occurrence");

            assert!(next > base);
            assert!(next - base <= chrono::Duration::days(7));
            assert_eq!(next.weekday(), weekday);
            assert_eq!(next.hour(), hour);
            assert_eq!(next.minute(), minute);
        }
    }
}
