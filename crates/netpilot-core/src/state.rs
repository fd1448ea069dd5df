//! Module load bookkeeping for one run

use std::collections::BTreeSet;

use serde::Serialize;

/// Modules loaded and modules that failed during this run.
///
/// A module is never in both sets at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadState {
    loaded: BTreeSet<String>,
    failed: BTreeSet<String>,
}

impl LoadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self, module: &str) -> bool {
        self.loaded.contains(module)
    }

    pub fn has_failed(&self, module: &str) -> bool {
        self.failed.contains(module)
    }

    pub fn mark_loaded(&mut self, module: &str) {
        self.failed.remove(module);
        self.loaded.insert(module.to_string());
    }

    pub fn mark_failed(&mut self, module: &str) {
        self.loaded.remove(module);
        self.failed.insert(module.to_string());
    }

    /// Forget earlier failures of `modules` so the next pass attempts them again.
    pub fn clear_failed<I, S>(&mut self, modules: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for module in modules {
            self.failed.remove(module.as_ref());
        }
    }

    pub fn loaded(&self) -> &BTreeSet<String> {
        &self.loaded
    }

    pub fn failed(&self) -> &BTreeSet<String> {
        &self.failed
    }
}
