// TabSync title resolver
// Pure, total function from a location string to a human-readable tab label.

use crate::types::location::{Location, BLANK_TAB_LOCATION};

/// Label used for blank tabs and for any input that fails to parse.
pub const BLANK_TAB_TITLE: &str = "New Tab";

/// Label for the application root.
const ROOT_TITLE: &str = "Dashboard";

/// Known last-path-segment labels.
const SEGMENT_LABELS: &[(&str, &str)] = &[
    ("business-plan", "Business Plan"),
    ("analytics", "Analytics"),
    ("reports", "Reports"),
    ("settings", "Settings"),
    ("visualizations", "Data Visualizations"),
    ("specification", "Specification"),
    ("markdown-demo", "Markdown Demo"),
];

/// Resolves a location into a display label.
///
/// The root path maps to a fixed home label, the blank-tab sentinel maps to
/// [`BLANK_TAB_TITLE`], known last segments map through [`SEGMENT_LABELS`],
/// and anything else returns its last path segment verbatim. Never fails:
/// empty or unparsable input falls back to [`BLANK_TAB_TITLE`].
pub fn resolve(location: &str) -> String {
    let loc = match Location::parse(location) {
        Ok(loc) => loc,
        Err(_) => return BLANK_TAB_TITLE.to_string(),
    };

    if loc.path.starts_with(BLANK_TAB_LOCATION) {
        return BLANK_TAB_TITLE.to_string();
    }
    if loc.path == "/" {
        return ROOT_TITLE.to_string();
    }

    match loc.path.split('/').filter(|s| !s.is_empty()).next_back() {
        Some(last) => SEGMENT_LABELS
            .iter()
            .find(|(segment, _)| *segment == last)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| last.to_string()),
        None => BLANK_TAB_TITLE.to_string(),
    }
}
