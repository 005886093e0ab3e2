//! Shell configuration
//!
//! Settings for the interactive shell: which database to open, where its
//! snapshot lives and how the prompt behaves.

use crate::error::Result;
use crate::executor::database::DEFAULT_DATABASE;
use crate::executor::Database;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default history file, relative to the working directory
pub const DEFAULT_HISTORY_FILE: &str = ".keeldb_history";

/// Shell configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    /// Name of a fresh database
    pub database: String,
    /// JSON snapshot to load on start and save on exit
    pub snapshot: Option<PathBuf>,
    /// Line-editor history file
    pub history_file: Option<PathBuf>,
    /// Prompt shown before each statement
    pub prompt: String,
    /// Save the snapshot when the shell exits
    pub autosave: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            snapshot: None,
            history_file: Some(PathBuf::from(DEFAULT_HISTORY_FILE)),
            prompt: "keeldb> ".to_string(),
            autosave: true,
        }
    }
}

impl ShellConfig {
    /// Create a new shell config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database name
    pub fn database(mut self, name: impl Into<String>) -> Self {
        self.database = name.into();
        self
    }

    /// Set the snapshot path
    pub fn snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot = Some(path.into());
        self
    }

    pub fn history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    /// Snapshot path, when autosave applies to it
    pub fn autosave_path(&self) -> Option<&Path> {
        self.snapshot.as_deref().filter(|_| self.autosave)
    }

    /// Load the configured snapshot if it exists, or start an empty database
    pub fn open(&self) -> Result<Database> {
        match &self.snapshot {
            Some(path) if path.exists() => Database::load_from_disk(path),
            _ => {
                debug!(database = %self.database, "starting empty database");
                Ok(Database::new(self.database.clone()))
            }
        }
    }
}
