//! Dry-run computation of a file rewrite

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use similar::TextDiff;

use super::entry::{ChangeAction, ConfigEntry};
use super::parse::{format_assignment, parse_assignment, parse_assignments};

/// Header line opening every block of appended keys.
pub const SECTION_HEADER: &str = "# NetPilot Configuration";

const HEADER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single key that differs from the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedChange {
    pub key: String,
    pub action: ChangeAction,
    pub old_value: Option<String>,
    pub new_value: String,
}

/// The outcome of synchronizing one file, computed without touching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub path: PathBuf,
    /// Current content; empty when the file does not exist
    pub original: String,
    /// Content after the changes are applied
    pub updated: String,
    pub changes: Vec<PlannedChange>,
}

impl SyncPlan {
    /// Whether applying the plan would leave the file as it is.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    /// Unified diff from the current to the updated content.
    pub fn diff(&self) -> String {
        let name = self.path.display().to_string();
        TextDiff::from_lines(&self.original, &self.updated)
            .unified_diff()
            .context_radius(3)
            .header(&name, &name)
            .to_string()
    }
}

/// Compute the rewrite of `original` that satisfies `entries`.
///
/// Desired keys that repeat keep their last value. Keys already present
/// with the desired value produce no change. Changed keys are replaced on
/// every line that assigns them; new keys are appended in entry order
/// below a header stamped with `now`.
pub(crate) fn build_plan(path: &Path, original: String, entries: &[ConfigEntry], now: &DateTime<Local>) -> SyncPlan {
    let existing = parse_assignments(&original);

    let mut desired: Vec<&ConfigEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match desired.iter_mut().find(|d| d.key == entry.key) {
            Some(slot) => *slot = entry,
            None => desired.push(entry),
        }
    }

    let pending: Vec<&ConfigEntry> = desired
        .into_iter()
        .filter(|entry| existing.get(&entry.key) != Some(&entry.value))
        .collect();

    let changes: Vec<PlannedChange> = pending
        .iter()
        .map(|entry| {
            let old_value = existing.get(&entry.key).cloned();
            PlannedChange {
                key: entry.key.clone(),
                action: if old_value.is_some() {
                    ChangeAction::Modified
                } else {
                    ChangeAction::Added
                },
                old_value,
                new_value: entry.value.clone(),
            }
        })
        .collect();

    if changes.is_empty() {
        return SyncPlan {
            path: path.to_path_buf(),
            updated: original.clone(),
            original,
            changes,
        };
    }

    let mut updated = String::with_capacity(original.len() + 64 * pending.len());
    for line in original.split_inclusive('\n') {
        let replacement = parse_assignment(line).and_then(|(key, _)| pending.iter().find(|e| e.key == key));
        match replacement {
            Some(entry) => {
                updated.push_str(&format_assignment(&entry.key, &entry.value));
                if line.ends_with('\n') {
                    updated.push('\n');
                }
            }
            None => updated.push_str(line),
        }
    }

    let appended: Vec<&&ConfigEntry> = pending.iter().filter(|e| !existing.contains_key(&e.key)).collect();
    if !appended.is_empty() {
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push('\n');
        updated.push_str(&format!("{} - {}\n", SECTION_HEADER, now.format(HEADER_TIME_FORMAT)));
        for entry in appended {
            if let Some(comment) = &entry.comment {
                updated.push_str(&format!("# {}\n", comment));
            }
            updated.push_str(&format_assignment(&entry.key, &entry.value));
            updated.push('\n');
        }
    }

    SyncPlan {
        path: path.to_path_buf(),
        original,
        updated,
        changes,
    }
}
