//! CLI module for the quicknote application
//!
//! This module handles the command-line interface for interacting with the
//! note store, and hosts the terminal notification sink used by watch mode.
use std::{
    fs,
    fs::{read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
    sync::Arc,
};

use chrono::{Local, NaiveDate, Utc};
use log::info;

use shell_words::split;
use tempfile::Builder;

use crate::{
    display_title, format_relative, parse_reminder, parse_tags, truncate_chars,
    validate_note_input, week_bounds, Background, Commands, Config, Note, NoteFilter, NoteSort,
    NoteStore, NoteUpdate, Notification, NotificationSink, QnError, Result, WeeklyReport,
};

/// CLI Application handler - processes CLI commands and interfaces with NoteStore
pub struct App {
    /// The note store backend
    store: Arc<NoteStore>,

    /// Application configuration
    config: Config,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given store backend and config
    pub fn new(store: Arc<NoteStore>, config: Config, verbose: bool) -> Self {
        Self {
            store,
            config,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Add {
                title,
                content,
                tags,
                url,
                remind,
                edit,
            } => self.handle_add(title, content, tags, url, remind, edit)?,

            Commands::Clip { text, url } => self.handle_clip(text, url)?,

            Commands::List {
                filter,
                search,
                sort,
                limit,
                json,
            } => self.handle_list(filter, search, sort, limit, json)?,

            Commands::View { id, json } => self.handle_view(id, json)?,

            Commands::Edit {
                id,
                title,
                content,
                tags,
                url,
                edit,
            } => self.handle_edit(id, title, content, tags, url, edit)?,

            Commands::Delete { id, force } => self.handle_delete(id, force)?,

            Commands::Pin { id } => self.handle_pin(id)?,

            Commands::Done { id } => self.handle_done(id)?,

            Commands::Remind { id, at, clear } => self.handle_remind(id, at, clear)?,

            Commands::Report {
                week,
                reflect,
                export,
            } => self.handle_report(week, reflect, export)?,

            Commands::Tags => self.handle_tags()?,

            Commands::Theme { mode } => self.handle_theme(mode)?,

            Commands::Watch => self.handle_watch().await?,
        }

        Ok(())
    }

    fn handle_add(
        &self,
        title: Option<String>,
        content: Option<String>,
        tags: Option<String>,
        url: Option<String>,
        remind: Option<String>,
        open_editor: bool,
    ) -> Result<()> {
        // Validate input - check for conflicting options
        if content.is_some() && open_editor {
            return Err(QnError::ApplicationError {
                message: "Cannot specify both --content and --edit options".to_string(),
            });
        }

        let parsed_tags = parse_tags(tags);
        let title = title.unwrap_or_default();

        // Get content based on the provided options
        let note_content = match (content, open_editor) {
            (Some(c), _) => c,
            (None, true) => self.open_editor_for_content(&title)?,
            (None, false) => String::new(),
        };

        validate_note_input(&title, &note_content)?;

        // Parse the reminder before anything is persisted, so a bad time
        // string leaves the collection untouched
        let reminder = remind
            .map(|raw| parse_reminder(&raw, Utc::now()))
            .transpose()?;

        // Create and save the note
        let mut note = Note::new(title, note_content, parsed_tags);
        note.url = url.filter(|u| !u.trim().is_empty());
        note.reminder = reminder;

        self.store.add(&note)?;
        println!("Note created with ID: {}", note.id);

        if let Some(when) = note.reminder {
            println!(
                "Reminder set for {}",
                when.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
        }

        Ok(())
    }

    fn handle_clip(&self, text: String, url: Option<String>) -> Result<()> {
        validate_note_input("", &text)?;

        let mut note = Note::new(String::new(), text, Vec::new());
        note.url = url.filter(|u| !u.trim().is_empty());

        self.store.add(&note)?;
        println!("Clipped text saved as note {}", note.id);

        Ok(())
    }

    /// List notes according to the provided filters and options
    fn handle_list(
        &self,
        filter: String,
        search: Option<String>,
        sort: String,
        limit: usize,
        json: bool,
    ) -> Result<()> {
        let filter = NoteFilter::parse(&filter);
        let sort = NoteSort::parse(&sort);
        let query = search.unwrap_or_default();

        let mut notes = self.store.get_filtered(&query, filter, sort);

        // Apply limit (0 means no limit)
        if limit > 0 && notes.len() > limit {
            notes.truncate(limit);
        }

        if notes.is_empty() {
            println!("No notes found matching the criteria.");
            return Ok(());
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&notes)?);
            return Ok(());
        }

        self.display_notes_text(&notes);

        // Print count at the end
        println!(
            "\nFound {} note{}",
            notes.len(),
            if notes.len() == 1 { "" } else { "s" }
        );

        Ok(())
    }

    /// Display notes in text format
    fn display_notes_text(&self, notes: &[Note]) {
        // Use terminal width for formatting if available
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        let now = Utc::now();

        for (i, note) in notes.iter().enumerate() {
            // Add separator between notes (except before the first)
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            let mut flags = String::new();
            if note.pinned {
                flags.push_str(" 📌");
            }
            if note.completed {
                flags.push_str(" ✓");
            }

            println!(
                "{} | {}{}",
                console::style(&note.id).dim(),
                console::style(display_title(note)).bold(),
                flags
            );
            println!("Created: {}", format_relative(note.created_at, now));

            // Print tags if any
            if !note.tags.is_empty() {
                let tags = note
                    .tags
                    .iter()
                    .map(|tag| format!("#{}", tag))
                    .collect::<Vec<_>>()
                    .join(" ");

                println!("Tags: {}", console::style(tags).cyan());
            }

            if let Some(when) = note.reminder {
                println!("⏰ {}", when.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
            }

            // Print a content preview in verbose mode
            if self.verbose && !note.content.is_empty() {
                println!("\n{}", truncate_chars(&note.content, 100));
            }
        }
    }

    fn handle_view(&self, id: String, json: bool) -> Result<()> {
        let note = self
            .store
            .get_by_id(&id)
            .ok_or(QnError::NoteNotFound { id })?;

        if json {
            println!("{}", serde_json::to_string_pretty(&note)?);
            return Ok(());
        }

        println!("ID:       {}", note.id);
        println!("Title:    {}", console::style(display_title(&note)).bold());
        println!(
            "Created:  {}",
            note.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
        println!(
            "Updated:  {}",
            note.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );

        if !note.tags.is_empty() {
            let tags = note
                .tags
                .iter()
                .map(|tag| format!("#{}", tag))
                .collect::<Vec<_>>()
                .join(" ");

            println!("Tags:     {}", console::style(tags).cyan());
        }

        if let Some(url) = &note.url {
            println!("URL:      {}", url);
        }

        if let Some(when) = note.reminder {
            println!(
                "Reminder: {}",
                when.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
        }

        println!("Pinned:   {}", if note.pinned { "yes" } else { "no" });
        println!("Done:     {}", if note.completed { "yes" } else { "no" });

        if !note.content.is_empty() {
            println!("\n{}", note.content);
        }

        Ok(())
    }

    fn handle_edit(
        &self,
        id: String,
        title: Option<String>,
        content: Option<String>,
        tags: Option<String>,
        url: Option<String>,
        open_editor: bool,
    ) -> Result<()> {
        // Validate input - check for conflicting options
        if content.is_some() && open_editor {
            return Err(QnError::ApplicationError {
                message: "Cannot specify both --content and --edit options".to_string(),
            });
        }

        // Retrieve the existing note
        let existing = self
            .store
            .get_by_id(&id)
            .ok_or_else(|| QnError::NoteNotFound { id: id.clone() })?;

        // Handle content updates
        let content = match (content, open_editor) {
            (Some(c), _) => Some(c),
            (None, true) => Some(
                self.open_editor_with_content(&display_title(&existing), &existing.content)?,
            ),
            (None, false) => None,
        };

        let update = NoteUpdate {
            title,
            content,
            tags: tags.map(|t| parse_tags(Some(t))),
            url: url.map(|u| {
                if u.trim().is_empty() {
                    None
                } else {
                    Some(u)
                }
            }),
            ..NoteUpdate::default()
        };

        // The merged note must still carry a title or content
        let merged_title = update.title.as_deref().unwrap_or(&existing.title);
        let merged_content = update.content.as_deref().unwrap_or(&existing.content);
        validate_note_input(merged_title, merged_content)?;

        match self.store.update(&id, &update)? {
            Some(_) => println!("Note {} updated successfully", id),
            None => return Err(QnError::NoteNotFound { id }),
        }

        Ok(())
    }

    fn handle_delete(&self, id: String, force: bool) -> Result<()> {
        // Step 1: Fetch the note to be deleted (to verify it exists and show details in the prompt)
        let note = match self.store.get_by_id(&id) {
            Some(note) => note,
            _ => {
                return Err(QnError::NoteNotFound { id });
            }
        };

        // Step 2: Show note details and prompt for confirmation (unless force flag is set)
        if !force {
            println!("You are about to delete the following note:");
            println!("ID:     {}", note.id);
            println!("Title:  {}", display_title(&note));
            if !note.tags.is_empty() {
                println!("Tags:   {}", note.tags.join(", "));
            }
            println!(
                "Created: {}",
                note.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            );

            // Show content preview (first line or two)
            if !note.content.is_empty() {
                let preview = note.content.lines().take(2).collect::<Vec<_>>().join("\n");

                println!("\nContent preview:");
                println!(
                    "{}{}",
                    preview,
                    if note.content.lines().count() > 2 {
                        "..."
                    } else {
                        ""
                    }
                );
            }

            // Ask for confirmation
            println!("\nThis action cannot be undone!");
            print!("Are you sure you want to delete this note? [y/N]: ");
            stdout().flush().map_err(QnError::Io)?;

            // Read user input
            let mut input = String::new();
            stdin().read_line(&mut input).map_err(QnError::Io)?;

            // Check if user confirmed
            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        // Step 3: Delete the note
        self.store.delete(&id)?;

        // Step 4: Provide feedback
        println!(
            "Note '{}' ({}) has been permanently deleted.",
            display_title(&note),
            note.id
        );

        Ok(())
    }

    fn handle_pin(&self, id: String) -> Result<()> {
        match self.store.toggle_pin(&id)? {
            Some(true) => println!("Note {} pinned", id),
            Some(false) => println!("Note {} unpinned", id),
            None => return Err(QnError::NoteNotFound { id }),
        }

        Ok(())
    }

    fn handle_done(&self, id: String) -> Result<()> {
        match self.store.toggle_complete(&id)? {
            Some(true) => println!("Note {} marked as done", id),
            Some(false) => println!("Note {} reopened", id),
            None => return Err(QnError::NoteNotFound { id }),
        }

        Ok(())
    }

    fn handle_remind(&self, id: String, at: Option<String>, clear: bool) -> Result<()> {
        if clear {
            if self.store.set_reminder(&id, None)? {
                println!("Reminder cleared for note {}", id);
                return Ok(());
            }
            return Err(QnError::NoteNotFound { id });
        }

        let raw = at.ok_or(QnError::InvalidReminder {
            message: "pass --at <time> or --clear".to_string(),
        })?;
        let when = parse_reminder(&raw, Utc::now())?;

        if self.store.set_reminder(&id, Some(when))? {
            println!(
                "Reminder set for {}",
                when.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
            Ok(())
        } else {
            Err(QnError::NoteNotFound { id })
        }
    }

    fn handle_report(
        &self,
        week: Option<String>,
        reflect: Option<String>,
        export: Option<PathBuf>,
    ) -> Result<()> {
        // Any day selects its surrounding Monday-to-Sunday week
        let day = match week {
            Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
                QnError::ApplicationError {
                    message: format!("Invalid week date '{}': {}", raw, e),
                }
            })?,
            None => Local::now().date_naive(),
        };
        let (week_start, _) = week_bounds(day);

        if let Some(text) = reflect {
            let text = text.trim();
            if text.is_empty() {
                return Err(QnError::ApplicationError {
                    message: "reflection text is empty".to_string(),
                });
            }

            self.store.save_reflection(week_start, text)?;
            println!("Reflection saved for the week of {}", week_start);
        }

        let report = WeeklyReport::for_week(&self.store, day);

        match export {
            Some(path) => {
                fs::write(&path, report.to_text())?;
                println!("Report written to {}", path.display());
            }
            None => print!("{}", report.to_text()),
        }

        Ok(())
    }

    fn handle_tags(&self) -> Result<()> {
        let tags = self.store.all_tags();

        if tags.is_empty() {
            println!("No tags in use.");
            return Ok(());
        }

        for tag in tags {
            println!("{}", console::style(format!("#{}", tag)).cyan());
        }

        Ok(())
    }

    fn handle_theme(&self, mode: Option<String>) -> Result<()> {
        match mode.as_deref() {
            None => println!(
                "Current theme: {}",
                if self.store.dark_mode() { "dark" } else { "light" }
            ),
            Some("dark") => {
                self.store.set_dark_mode(true)?;
                println!("Theme set to dark");
            }
            Some("light") => {
                self.store.set_dark_mode(false)?;
                println!("Theme set to light");
            }
            Some(other) => {
                return Err(QnError::ApplicationError {
                    message: format!("Unknown theme '{}'. Use \"dark\" or \"light\"", other),
                });
            }
        }

        Ok(())
    }

    /// Run the schedulers in the foreground until interrupted
    async fn handle_watch(&self) -> Result<()> {
        let sink = Arc::new(TerminalSink);
        let mut background = Background::new(Arc::clone(&self.store), sink, self.config.clone());

        background.start()?;
        println!("Watching for reminders. Press Ctrl-C to stop.");

        tokio::signal::ctrl_c().await.map_err(QnError::Io)?;

        background.stop();
        println!("\nStopped.");

        Ok(())
    }

    fn open_editor_for_content(&self, title: &str) -> Result<String> {
        // Create a temporary file for composing
        let temp_file = Builder::new().suffix(".txt").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        // Get editor from config or environment
        let editor_cmd = self.config.get_editor_command();

        // Write template to the temp file
        self.write_editor_template(&temp_path, title)?;

        // Open editor
        info!("Opening editor to write note content. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        // Read and process the content
        let content = read_to_string(&temp_path)?;
        Ok(strip_editor_comments(content))
    }

    fn write_editor_template(&self, path: &Path, title: &str) -> Result<()> {
        let mut file = OpenOptions::new().write(true).open(path)?;

        // Write template with helpful comments
        if !title.trim().is_empty() {
            writeln!(file, "<!-- Note: {} -->", title)?;
        }
        writeln!(
            file,
            "<!-- Write your note below. Lines that start with <!-- and end with --> are ignored. -->"
        )?;
        writeln!(file)?;

        Ok(())
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        // Convert file path to string once
        let path_str = file_path.to_string_lossy();

        // Handle shell-like command parsing
        let args = split(editor_cmd).map_err(|e| QnError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        if args.is_empty() {
            return Err(QnError::EditorError {
                message: "Empty editor command".to_string(),
            });
        }

        // First word is the program name, rest are arguments
        let program = &args[0];

        // Create command
        let mut command = Command::new(program);

        // Add any arguments from the original command
        if args.len() > 1 {
            command.args(&args[1..]);
        }

        // Add the file path as the final argument
        command.arg(path_str.as_ref());

        // Execute the command
        let status = command.status()?;

        if !status.success() {
            return Err(QnError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }

    // Helper function to open the editor with existing content
    fn open_editor_with_content(&self, title: &str, existing_content: &str) -> Result<String> {
        // Create a temporary file for editing
        let temp_file = Builder::new().suffix(".txt").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        {
            let mut file = OpenOptions::new().write(true).open(&temp_path)?;

            writeln!(file, "<!-- Editing note: {} -->", title)?;
            writeln!(
                file,
                "<!-- Lines that start with <!-- and end with --> are ignored. -->"
            )?;
            writeln!(file)?;
            write!(file, "{}", existing_content)?;
        }

        // Get editor command from config, or use default
        let editor_cmd = self.config.get_editor_command();

        info!("Opening editor to update note content. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        // Read the updated content from the temp file
        let content = read_to_string(&temp_path)?;
        Ok(strip_editor_comments(content))
    }
}

/// Remove whole-line HTML comments left by the editor templates
fn strip_editor_comments(content: String) -> String {
    content
        .lines()
        .filter(|line| {
            !(line.trim_start().starts_with("<!--") && line.trim_end().ends_with("-->"))
        })
        .collect::<Vec<&str>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Prints notifications to the terminal. Watch mode has no notification
/// center, so dismissal is a no-op.
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn show(&self, notification: Notification) {
        let icon = if notification.priority >= 2 { "🔔" } else { "📣" };

        println!("\n{} {}", icon, console::style(&notification.title).bold());
        if !notification.message.is_empty() {
            println!("{}", notification.message);
        }
        if !notification.buttons.is_empty() {
            println!("[{}]", notification.buttons.join("] ["));
        }
    }

    fn dismiss(&self, _id: &str) {}
}
