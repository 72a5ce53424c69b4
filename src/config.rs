use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use which::which;

use crate::{QnError, Result};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// File the note collection is stored in
    pub storage_path: PathBuf,

    /// Whether the weekly digest schedulers run in watch mode
    pub digest_enabled: bool,

    /// Default editor command
    pub editor_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_path: default_storage_path(),
            digest_enabled: true,
            editor_command: None,
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| QnError::ConfigError {
            message: format!("could not read {}: {}", path.display(), e),
        })?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        // Then try environment variable
        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -t".to_string()
        } else {
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}

/// Platform data file, with a working-directory fallback
fn default_storage_path() -> PathBuf {
    match ProjectDirs::from("dev", "quicknote", "quicknote") {
        Some(dirs) => dirs.data_dir().join("notes.json"),
        None => PathBuf::from("notes.json"),
    }
}
