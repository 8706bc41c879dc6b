use serde::{Deserialize, Serialize};

/// Which kind of rendering surface backs a tab.
///
/// `Owned` tabs have an independent surface at the environment level; their
/// location changes only through explicit navigation calls on that surface.
/// `Shared` tabs render through the single process-wide surface, so their
/// location is read from that surface's live state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceOwnership {
    Owned,
    Shared,
}

/// A browser-style tab tracked by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    pub location: String,
    pub title: String,
    pub active: bool,
    pub ownership: SurfaceOwnership,
}
