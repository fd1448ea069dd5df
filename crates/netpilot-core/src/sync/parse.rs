//! Line-level handling of `key="value"` files

use std::collections::HashMap;

/// Split an assignment line into its key and unquoted value.
///
/// Blank lines, `#` comments and lines without `=` are not assignments.
pub fn parse_assignment(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim().trim_matches('"')))
}

/// Every assignment in `content`. A key assigned twice keeps its last value.
pub fn parse_assignments(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter_map(parse_assignment)
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Render `key="value"` without a line terminator.
pub fn format_assignment(key: &str, value: &str) -> String {
    format!("{}=\"{}\"", key, value)
}
