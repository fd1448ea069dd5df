//! Desired entries and the journal of applied changes

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One desired `key="value"` assignment in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub path: PathBuf,
    pub key: String,
    pub value: String,
    /// Written as a `# ...` line above newly appended keys
    pub comment: Option<String>,
}

impl ConfigEntry {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            value: value.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Added,
    Modified,
    Removed,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Removed => "removed",
        };
        f.write_str(label)
    }
}

/// A change that was written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// RFC 3339, local time
    pub timestamp: DateTime<Local>,
    pub path: PathBuf,
    pub action: ChangeAction,
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: String,
    /// Copy of the file taken before this change was written
    pub backup: Option<PathBuf>,
}

/// Everything an engine has written so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub total_changes: usize,
    pub changes: Vec<ChangeRecord>,
    /// Distinct files touched, sorted
    pub files_modified: Vec<PathBuf>,
    pub backup_directory: PathBuf,
}
