//! Immutable rule database
//!
//! The database is the ordered rule table plus the module blacklist. It is
//! validated once on construction and never mutated afterwards.

use std::collections::BTreeSet;

use crate::builtins::{builtin_blacklist, builtin_rules};
use crate::coverage::CoverageSummary;
use crate::descriptor::HardwareDescriptor;
use crate::rule::DriverRule;
use crate::validation::validate_rules;
use crate::{Result, matcher};

/// Ordered driver rules and a blacklist of modules that must never be picked.
#[derive(Debug, Clone)]
pub struct RuleDatabase {
    rules: Vec<DriverRule>,
    blacklist: BTreeSet<String>,
}

impl RuleDatabase {
    /// Build a database from `rules` (kept in the given order) and `blacklist`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRule` for the first rule that fails the
    /// self-check.
    pub fn new<I, S>(rules: Vec<DriverRule>, blacklist: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        validate_rules(&rules)?;
        Ok(Self {
            rules,
            blacklist: blacklist.into_iter().map(Into::into).collect(),
        })
    }

    /// The built-in table shipped with NetPilot.
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_rules(), builtin_blacklist())
    }

    /// All rules in declaration order.
    pub fn rules(&self) -> &[DriverRule] {
        &self.rules
    }

    pub fn blacklist(&self) -> &BTreeSet<String> {
        &self.blacklist
    }

    pub fn is_blacklisted(&self, module: &str) -> bool {
        self.blacklist.contains(module)
    }

    /// Prerequisite modules of `rule`, in load order.
    pub fn dependencies<'a>(&self, rule: &'a DriverRule) -> &'a [String] {
        &rule.dependencies
    }

    /// Select the best rule for `descriptor`. See [`matcher::match_device`].
    pub fn match_device(&self, descriptor: &HardwareDescriptor) -> Option<&DriverRule> {
        matcher::match_device(self, descriptor)
    }

    /// Every distinct generic firmware package named by the table, sorted.
    pub fn firmware_packages(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter_map(|r| r.firmware.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rules grouped by hardware category.
    pub fn coverage(&self) -> CoverageSummary {
        CoverageSummary::from_rules(&self.rules)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
