//! SyncEngine implementation

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use netpilot_fs::io::{read_text_if_exists, write_atomic};

use super::clock::{Clock, SystemClock};
use super::entry::{ChangeRecord, ChangeSummary, ConfigEntry};
use super::plan::{SyncPlan, build_plan};
use crate::{Error, Result};

/// Result of synchronizing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub path: PathBuf,
    /// Changes written, empty when the file already matched
    pub changes: Vec<ChangeRecord>,
    pub backup: Option<PathBuf>,
    /// Whether the file was replaced
    pub written: bool,
}

/// Engine for synchronizing `key="value"` configuration files
///
/// The engine owns its journal: every change it writes is recorded with
/// the backup taken before the write. A file that already satisfies the
/// desired entries is neither backed up nor rewritten.
pub struct SyncEngine {
    backup_dir: PathBuf,
    clock: Box<dyn Clock>,
    journal: Vec<ChangeRecord>,
}

impl SyncEngine {
    /// Create an engine that stores backups in `backup_dir`.
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            clock: Box::new(SystemClock),
            journal: Vec::new(),
        }
    }

    /// Replace the time source used for headers, backup names and the journal.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Compute what [`synchronize`](Self::synchronize) would do to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigRead`] if the file exists but cannot be read.
    pub fn plan(&self, path: &Path, entries: &[ConfigEntry]) -> Result<SyncPlan> {
        let original = read_existing(path)?;
        Ok(build_plan(path, original, entries, &self.clock.now()))
    }

    /// Bring `path` in line with `entries`.
    ///
    /// When anything differs, the current file is backed up, the new
    /// content replaces it atomically, and the changes are appended to the
    /// journal. A failed backup is logged and does not stop the write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigRead`] if the file cannot be read and
    /// [`Error::ConfigWrite`] if it cannot be replaced. In both cases the
    /// file on disk and the journal are unchanged.
    pub fn synchronize(&mut self, path: &Path, entries: &[ConfigEntry]) -> Result<SyncResult> {
        let now = self.clock.now();
        let plan = build_plan(path, read_existing(path)?, entries, &now);

        if plan.is_noop() {
            tracing::debug!(path = %path.display(), "Configuration already up to date");
            return Ok(SyncResult {
                path: path.to_path_buf(),
                changes: Vec::new(),
                backup: None,
                written: false,
            });
        }

        let backup = match netpilot_fs::create_backup(path, &self.backup_dir, &now) {
            Ok(backup) => backup,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Backup failed, continuing without one");
                None
            }
        };

        write_atomic(path, plan.updated.as_bytes()).map_err(|source| Error::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })?;

        let changes: Vec<ChangeRecord> = plan
            .changes
            .into_iter()
            .map(|change| ChangeRecord {
                timestamp: now,
                path: path.to_path_buf(),
                action: change.action,
                key: change.key,
                old_value: change.old_value,
                new_value: change.new_value,
                backup: backup.clone(),
            })
            .collect();
        self.journal.extend(changes.iter().cloned());

        tracing::info!(path = %path.display(), changes = changes.len(), "Updated configuration file");
        Ok(SyncResult {
            path: path.to_path_buf(),
            changes,
            backup,
            written: true,
        })
    }

    /// Every change written by this engine, in order.
    pub fn journal(&self) -> &[ChangeRecord] {
        &self.journal
    }

    pub fn summary(&self) -> ChangeSummary {
        let files: BTreeSet<PathBuf> = self.journal.iter().map(|c| c.path.clone()).collect();
        ChangeSummary {
            total_changes: self.journal.len(),
            changes: self.journal.clone(),
            files_modified: files.into_iter().collect(),
            backup_directory: self.backup_dir.clone(),
        }
    }
}

fn read_existing(path: &Path) -> Result<String> {
    read_text_if_exists(path)
        .map(Option::unwrap_or_default)
        .map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("backup_dir", &self.backup_dir)
            .field("journal", &self.journal.len())
            .finish()
    }
}
