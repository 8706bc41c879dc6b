//! Location parsing for the synchronization engine.
//!
//! A [`Location`] is the path/search/hash decomposition of a location string.
//! Absolute URLs are accepted with the scheme and authority stripped, since
//! the engine only reasons about in-app paths.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::EngineError;

/// Application root that the default bootstrap tab points at.
pub const APP_ROOT: &str = "/";

/// Sentinel location for a freshly created blank tab.
pub const BLANK_TAB_LOCATION: &str = "/newtab";

/// A parsed location: path, query string, and fragment.
///
/// `search` and `hash` retain their `?` / `#` delimiters and are empty
/// strings when absent, mirroring how the ambient surface reports them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    pub search: String,
    pub hash: String,
}

impl Location {
    /// Parses a location string into its components.
    ///
    /// Accepts app-relative forms (`/reports?x=1#top`) and absolute URLs
    /// (`https://host/reports?x=1`), stripping scheme and authority from the
    /// latter. Empty input, embedded whitespace, and relative paths are
    /// rejected with `EngineError::MalformedLocation`.
    pub fn parse(input: &str) -> Result<Self, EngineError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EngineError::MalformedLocation("empty location".to_string()));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(EngineError::MalformedLocation(format!(
                "whitespace in location: {}",
                trimmed
            )));
        }

        // Strip scheme + authority from absolute URLs.
        let rest = match trimmed.find("://") {
            Some(idx) => {
                let after = &trimmed[idx + 3..];
                if after.is_empty() {
                    return Err(EngineError::MalformedLocation(format!(
                        "missing authority: {}",
                        trimmed
                    )));
                }
                match after.find(['/', '?', '#']) {
                    Some(pos) => &after[pos..],
                    None => "/",
                }
            }
            None => trimmed,
        };

        if !rest.starts_with(['/', '?', '#']) {
            return Err(EngineError::MalformedLocation(format!(
                "relative location: {}",
                trimmed
            )));
        }

        let (rest, hash) = match rest.find('#') {
            Some(idx) => (&rest[..idx], rest[idx..].to_string()),
            None => (rest, String::new()),
        };
        let (path, search) = match rest.find('?') {
            Some(idx) => (&rest[..idx], rest[idx..].to_string()),
            None => (rest, String::new()),
        };
        let path = if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        };

        Ok(Self { path, search, hash })
    }

    /// The path without query or hash. Used to classify whether an ambient
    /// change stayed within the active tab's page or crossed to another one.
    pub fn directory(&self) -> &str {
        &self.path
    }

    /// Reassembles the normalized location string.
    pub fn full(&self) -> String {
        format!("{}{}{}", self.path, self.search, self.hash)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.path, self.search, self.hash)
    }
}
