//! Device matching
//!
//! Selection is a filter followed by a minimum: every rule that passes all
//! of its declared predicates is a candidate, and the candidate with the
//! lowest `(priority, declaration index)` wins. Declaration index is part
//! of the key so equal priorities always resolve to the first-declared
//! rule.

use crate::database::RuleDatabase;
use crate::descriptor::HardwareDescriptor;
use crate::rule::DriverRule;

/// Select the single best rule for `descriptor`.
///
/// Returns `None` for unsupported hardware. That is an expected outcome and
/// is only logged at debug level.
pub fn match_device<'a>(
    db: &'a RuleDatabase,
    descriptor: &HardwareDescriptor,
) -> Option<&'a DriverRule> {
    let best = eligible(db, descriptor)
        .min_by_key(|(index, rule)| (rule.priority, *index))
        .map(|(_, rule)| rule);

    match best {
        Some(rule) => tracing::debug!(
            device = %descriptor.id_pair(),
            module = %rule.module,
            priority = rule.priority,
            "Matched driver rule"
        ),
        None => tracing::debug!(device = %descriptor.id_pair(), bus = %descriptor.bus, "No driver rule"),
    }

    best
}

/// Every rule that would accept `descriptor`, best first.
pub fn candidates<'a>(db: &'a RuleDatabase, descriptor: &HardwareDescriptor) -> Vec<&'a DriverRule> {
    let mut found: Vec<(usize, &DriverRule)> = eligible(db, descriptor).collect();
    found.sort_by_key(|(index, rule)| (rule.priority, *index));
    found.into_iter().map(|(_, rule)| rule).collect()
}

fn eligible<'a, 'd>(
    db: &'a RuleDatabase,
    descriptor: &'d HardwareDescriptor,
) -> impl Iterator<Item = (usize, &'a DriverRule)> {
    db.rules()
        .iter()
        .enumerate()
        .filter(move |(_, rule)| !db.is_blacklisted(&rule.module))
        .filter(move |(_, rule)| rule.matches(descriptor))
}
