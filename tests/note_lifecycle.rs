//! Integration tests for the note lifecycle: creation, editing, filtering,
//! and the persisted state that survives a reload.

use chrono::{Days, NaiveDate, Utc};
use quicknote::{Note, NoteFilter, NoteSort, NoteStore, NoteUpdate};
use tempfile::tempdir;

fn store_in(dir: &tempfile::TempDir) -> NoteStore {
    NoteStore::new(dir.path().join("notes.json")).expect("store should open")
}

#[test]
fn creating_a_note_initializes_flags_and_timestamps() {
    let note = Note::new(
        "buy milk".to_string(),
        "two liters".to_string(),
        vec!["errands".to_string()],
    );

    assert!(!note.id.is_empty());
    assert_eq!(note.title, "buy milk");
    assert_eq!(note.content, "two liters");
    assert_eq!(note.tags, vec!["errands"]);
    assert!(note.url.is_none());
    assert!(note.reminder.is_none());
    assert!(!note.pinned);
    assert!(!note.completed);
    assert_eq!(note.created_at, note.updated_at);
}

#[test]
fn new_notes_land_at_the_front() {
    let dir = tempdir().expect("tempdir");
    let store = store_in(&dir);

    let first = Note::new("first".to_string(), String::new(), Vec::new());
    let second = Note::new("second".to_string(), String::new(), Vec::new());
    let third = Note::new("third".to_string(), String::new(), Vec::new());
    for note in [&first, &second, &third] {
        store.add(note).expect("add");
    }

    let ids: Vec<String> = store.get_all().into_iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[test]
fn update_merges_only_provided_fields() {
    let dir = tempdir().expect("tempdir");
    let store = store_in(&dir);

    let mut note = Note::new(
        "draft".to_string(),
        "original".to_string(),
        vec!["a".to_string()],
    );
    note.url = Some("https://example.com".to_string());
    store.add(&note).expect("add");

    let update = NoteUpdate {
        content: Some("revised".to_string()),
        ..NoteUpdate::default()
    };
    let updated = store
        .update(&note.id, &update)
        .expect("update")
        .expect("note exists");

    assert_eq!(updated.title, "draft");
    assert_eq!(updated.content, "revised");
    assert_eq!(updated.tags, vec!["a"]);
    assert_eq!(updated.url.as_deref(), Some("https://example.com"));
    assert!(updated.updated_at >= updated.created_at);

    // An explicit empty value clears the URL, absence leaves it alone
    let cleared = store
        .update(
            &note.id,
            &NoteUpdate {
                url: Some(None),
                ..NoteUpdate::default()
            },
        )
        .expect("update")
        .expect("note exists");
    assert!(cleared.url.is_none());
    assert_eq!(cleared.content, "revised");
}

#[test]
fn toggle_pin_round_trips() {
    let dir = tempdir().expect("tempdir");
    let store = store_in(&dir);

    let note = Note::new("keep handy".to_string(), String::new(), Vec::new());
    store.add(&note).expect("add");

    assert_eq!(store.toggle_pin(&note.id).expect("toggle"), Some(true));
    assert_eq!(store.toggle_pin(&note.id).expect("toggle"), Some(false));
    assert!(!store.get_by_id(&note.id).expect("note").pinned);
}

#[test]
fn pinned_notes_lead_every_listing() {
    let dir = tempdir().expect("tempdir");
    let store = store_in(&dir);

    let oldest = Note::new("oldest".to_string(), String::new(), Vec::new());
    let middle = Note::new("middle".to_string(), String::new(), Vec::new());
    let newest = Note::new("newest".to_string(), String::new(), Vec::new());
    for note in [&oldest, &middle, &newest] {
        store.add(note).expect("add");
    }
    store.toggle_pin(&oldest.id).expect("pin");

    let ids: Vec<String> = store
        .get_filtered("", NoteFilter::All, NoteSort::Newest)
        .into_iter()
        .map(|n| n.id)
        .collect();

    assert_eq!(ids, vec![oldest.id, newest.id, middle.id]);
}

#[test]
fn search_matches_tags_case_insensitively() {
    let dir = tempdir().expect("tempdir");
    let store = store_in(&dir);

    let groceries = Note::new(
        "groceries".to_string(),
        "milk and eggs".to_string(),
        vec!["errands".to_string()],
    );
    let standup = Note::new(
        "standup notes".to_string(),
        String::new(),
        vec!["work".to_string()],
    );
    store.add(&groceries).expect("add");
    store.add(&standup).expect("add");

    let hits = store.get_filtered("WORK", NoteFilter::All, NoteSort::Newest);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, standup.id);

    // Queries are trimmed before matching
    let hits = store.get_filtered("  milk  ", NoteFilter::All, NoteSort::Newest);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, groceries.id);
}

#[test]
fn completed_notes_drop_out_of_the_active_filter() {
    let dir = tempdir().expect("tempdir");
    let store = store_in(&dir);

    let open = Note::new("still open".to_string(), String::new(), Vec::new());
    let done = Note::new("wrapped up".to_string(), String::new(), Vec::new());
    store.add(&open).expect("add");
    store.add(&done).expect("add");
    store.toggle_complete(&done.id).expect("complete");

    let active = store.get_filtered("", NoteFilter::Active, NoteSort::Newest);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, open.id);

    let completed = store.get_filtered("", NoteFilter::Completed, NoteSort::Newest);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, done.id);
}

#[test]
fn reflections_are_stored_per_week() {
    let dir = tempdir().expect("tempdir");
    let store = store_in(&dir);

    let week = NaiveDate::from_ymd_opt(2024, 3, 11).expect("date");
    store
        .save_reflection(week, "shipped the report view")
        .expect("save");

    assert_eq!(
        store.reflection(week).as_deref(),
        Some("shipped the report view")
    );
    assert!(store.reflection(week + Days::new(7)).is_none());
}

#[test]
fn unknown_ids_are_quiet() {
    let dir = tempdir().expect("tempdir");
    let store = store_in(&dir);

    assert!(store
        .update("missing", &NoteUpdate::default())
        .expect("update")
        .is_none());
    assert!(!store.delete("missing").expect("delete"));
    assert!(store.toggle_pin("missing").expect("toggle").is_none());
    assert!(!store
        .set_reminder("missing", Some(Utc::now()))
        .expect("set reminder"));
    assert!(store.get_all().is_empty());
}

#[test]
fn collection_survives_reload() {
    let dir = tempdir().expect("tempdir");

    let note = Note::new(
        "persistent".to_string(),
        "survives a restart".to_string(),
        vec!["infra".to_string()],
    );
    {
        let store = store_in(&dir);
        store.add(&note).expect("add");
        store.toggle_complete(&note.id).expect("complete");
        store.set_dark_mode(true).expect("theme");
    }

    let reopened = store_in(&dir);
    let loaded = reopened.get_by_id(&note.id).expect("note persisted");
    assert_eq!(loaded.content, "survives a restart");
    assert!(loaded.completed);
    assert!(reopened.dark_mode());
}
