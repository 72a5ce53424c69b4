//! Persistence for the note collection and its companion state.
//!
//! Everything lives in one JSON document: the notes themselves, saved
//! weekly reflections, and the dark-mode preference. Each operation loads
//! the document fresh and writes the whole thing back atomically. There is
//! no cache and no locking; concurrent writers race at document
//! granularity and the last write wins.
use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, info, trace, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{Note, NoteFilter, NoteSort, NoteUpdate, QnError, Result};

/// Key under which a week's reflection is stored
fn reflection_key(week_start: NaiveDate) -> String {
    format!("reflection_{}", week_start.format("%Y-%m-%d"))
}

/// The entire persisted state of the application
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoreData {
    /// The note collection, newest first
    notes: Vec<Note>,
    /// Weekly reflections, keyed `reflection_<monday>`
    reflections: BTreeMap<String, String>,
    /// Persisted dark-mode preference
    dark_mode: bool,
}

/// Manages the storage and retrieval of notes
pub struct NoteStore {
    /// The JSON document holding the whole collection
    path: PathBuf,
}

impl NoteStore {
    /// Creates a store over the given file, creating the parent directory
    /// if needed. The file itself appears on first write.
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating storage directory: {}", parent.display());
                fs::create_dir_all(parent).map_err(|e| {
                    error!("Failed to create storage directory: {}", e);
                    QnError::DirectoryError {
                        path: parent.to_path_buf(),
                    }
                })?;
            }
        }

        Ok(Self { path })
    }

    /// The file this store reads and writes
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole document. A missing or unreadable file degrades to
    /// the empty state so read paths never fail.
    fn load(&self) -> StoreData {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!("Storage file not found, starting empty");
                return StoreData::default();
            }
            Err(e) => {
                warn!("Could not read {}: {}", self.path.display(), e);
                return StoreData::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                warn!("Could not parse {}: {}", self.path.display(), e);
                StoreData::default()
            }
        }
    }

    /// Writes the whole document atomically: serialize into a temporary
    /// file in the same directory, then move it over the target.
    fn save(&self, data: &StoreData) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            QnError::Io(e)
        })?;

        trace!("Serializing store to JSON");
        let json = serde_json::to_string_pretty(data).map_err(|e| {
            error!("Failed to serialize store: {}", e);
            QnError::Serialization(e)
        })?;

        temp_file.write_all(json.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            QnError::Io(e)
        })?;

        temp_file.flush().map_err(|e| {
            error!("Failed to flush temporary file: {}", e);
            QnError::Io(e)
        })?;

        debug!("Replacing {} atomically", self.path.display());
        temp_file.persist(&self.path).map_err(|e| {
            error!(
                "Failed to persist file {}: {}",
                self.path.display(),
                e.error
            );
            QnError::Io(e.error)
        })?;

        Ok(())
    }

    /// Returns every note, newest first
    ///
    /// # Returns
    ///
    /// The full collection; empty when the storage file is missing or
    /// unreadable
    pub fn get_all(&self) -> Vec<Note> {
        self.load().notes
    }

    /// Looks up a single note by ID
    pub fn get_by_id(&self, id: &str) -> Option<Note> {
        self.load().notes.into_iter().find(|note| note.id == id)
    }

    /// Adds a note at the front of the collection
    ///
    /// # Arguments
    ///
    /// * `note` - The note to persist
    ///
    /// # Returns
    ///
    /// Ok on success; write failures surface as errors
    pub fn add(&self, note: &Note) -> Result<()> {
        info!("Saving note: {}", note.id);

        let mut data = self.load();
        data.notes.insert(0, note.clone());
        self.save(&data)?;

        info!("Note saved successfully: {}", note.id);
        Ok(())
    }

    /// Applies a partial update to a note
    ///
    /// # Arguments
    ///
    /// * `id` - ID of the note to change
    /// * `update` - Fields to merge into it
    ///
    /// # Returns
    ///
    /// The updated note, or None when no note has the given ID (nothing
    /// is written in that case)
    pub fn update(&self, id: &str, update: &NoteUpdate) -> Result<Option<Note>> {
        let mut data = self.load();
        let Some(note) = data.notes.iter_mut().find(|note| note.id == id) else {
            debug!("Update for unknown note {} ignored", id);
            return Ok(None);
        };

        note.apply(update);
        let updated = note.clone();
        self.save(&data)?;

        debug!("Note {} updated", id);
        Ok(Some(updated))
    }

    /// Deletes a note
    ///
    /// # Returns
    ///
    /// true when a note was removed, false when the ID was unknown
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut data = self.load();
        let before = data.notes.len();
        data.notes.retain(|note| note.id != id);

        if data.notes.len() == before {
            debug!("Delete for unknown note {} ignored", id);
            return Ok(false);
        }

        self.save(&data)?;
        info!("Note deleted: {}", id);
        Ok(true)
    }

    /// Sets or clears a note's reminder time
    ///
    /// # Returns
    ///
    /// true when the note exists, false otherwise
    pub fn set_reminder(&self, id: &str, when: Option<DateTime<Utc>>) -> Result<bool> {
        let mut data = self.load();
        let Some(note) = data.notes.iter_mut().find(|note| note.id == id) else {
            debug!("Reminder change for unknown note {} ignored", id);
            return Ok(false);
        };

        note.set_reminder(when);
        self.save(&data)?;
        Ok(true)
    }

    /// Toggles a note's pinned flag, returning the new state
    pub fn toggle_pin(&self, id: &str) -> Result<Option<bool>> {
        let mut data = self.load();
        let Some(note) = data.notes.iter_mut().find(|note| note.id == id) else {
            return Ok(None);
        };

        let pinned = note.toggle_pin();
        self.save(&data)?;
        Ok(Some(pinned))
    }

    /// Toggles a note's completed flag, returning the new state
    pub fn toggle_complete(&self, id: &str) -> Result<Option<bool>> {
        let mut data = self.load();
        let Some(note) = data.notes.iter_mut().find(|note| note.id == id) else {
            return Ok(None);
        };

        let completed = note.toggle_complete();
        self.save(&data)?;
        Ok(Some(completed))
    }

    /// Returns notes matching a category filter and search query, sorted,
    /// with pinned notes hoisted to the front.
    ///
    /// The pipeline runs filter, then search, then sort. Unless the filter
    /// is already `Pinned`, pinned notes are then moved ahead of the rest
    /// while keeping the sort order within each group.
    pub fn get_filtered(&self, query: &str, filter: NoteFilter, sort: NoteSort) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .load()
            .notes
            .into_iter()
            .filter(|note| note.matches_filter(filter))
            .filter(|note| note.matches_search(query))
            .collect();

        match sort {
            NoteSort::Newest => notes.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            NoteSort::Oldest => notes.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            // Empty titles sort ahead of everything else.
            NoteSort::Title => notes.sort_by(|a, b| a.title.cmp(&b.title)),
        }

        if filter != NoteFilter::Pinned {
            // Stable partition: pinned first, both groups keep their order.
            notes.sort_by_key(|note| !note.pinned);
        }

        trace!("Filtered listing produced {} notes", notes.len());
        notes
    }

    /// Every distinct tag in use, sorted
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .load()
            .notes
            .into_iter()
            .flat_map(|note| note.tags)
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }

    /// Saves (or overwrites) the reflection for the week starting at the
    /// given Monday
    pub fn save_reflection(&self, week_start: NaiveDate, text: &str) -> Result<()> {
        let mut data = self.load();
        data.reflections
            .insert(reflection_key(week_start), text.to_string());
        self.save(&data)?;

        info!("Reflection saved for week of {}", week_start);
        Ok(())
    }

    /// Loads the reflection for the week starting at the given Monday
    pub fn reflection(&self, week_start: NaiveDate) -> Option<String> {
        self.load()
            .reflections
            .get(&reflection_key(week_start))
            .cloned()
    }

    /// Persists the dark-mode preference
    pub fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        let mut data = self.load();
        data.dark_mode = enabled;
        self.save(&data)?;
        Ok(())
    }

    /// The persisted dark-mode preference
    pub fn dark_mode(&self) -> bool {
        self.load().dark_mode
    }
}
