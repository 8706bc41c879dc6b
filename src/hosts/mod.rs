//! Host adapters for TabSync.
//!
//! A [`HostAdapter`] performs the actual effects of create/close/switch/
//! navigate against the underlying environment. Two implementations exist:
//! [`MultiViewHost`] for environments that give every tab its own rendering
//! surface, and [`EmulatedHost`] for environments that emulate tabs over the
//! one process-wide surface. The facade is adapter-agnostic; the variant is
//! resolved once at construction, never re-checked per call.
//!
//! Registry changes are applied optimistically and reverted if the
//! environment rejects the corresponding command.
//!
//! [`MultiViewHost`]: multi_view::MultiViewHost
//! [`EmulatedHost`]: emulated::EmulatedHost

use uuid::Uuid;

use crate::managers::tab_registry::TabRegistry;
use crate::services::title_resolver;
use crate::types::errors::EngineError;
use crate::types::location::Location;
use crate::types::tab::{SurfaceOwnership, Tab};

pub mod emulated;
pub mod multi_view;

/// Which host environment an adapter drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    MultiView,
    Emulated,
}

/// Effect layer between the facade and the host environment.
///
/// All methods mutate the registry through its invariant-checked swap; an
/// `InvariantViolation` escaping from here is a programming error and must
/// be surfaced, not swallowed.
pub trait HostAdapter {
    fn kind(&self) -> HostKind;

    /// Allocates a new active tab, deactivating the previous active tab.
    /// `location` defaults to the blank-tab sentinel.
    fn create(
        &self,
        registry: &mut TabRegistry,
        location: Option<&str>,
    ) -> Result<Tab, EngineError>;

    /// Closes a tab. Unknown ids are a silent no-op. Closing the active tab
    /// activates the tab at the same index (or the last remaining one);
    /// closing the last tab creates a fresh default tab in the same mutation.
    fn close(&self, registry: &mut TabRegistry, tab_id: &str) -> Result<(), EngineError>;

    /// Activates the given tab. Fails with `NotFound` for unknown ids;
    /// switching to the already-active tab is a no-op.
    fn switch_to(&self, registry: &mut TabRegistry, tab_id: &str) -> Result<(), EngineError>;

    /// Updates a tab's location (re-deriving its title). Fails with
    /// `NotFound` for unknown ids.
    fn navigate(
        &self,
        registry: &mut TabRegistry,
        tab_id: &str,
        location: &Location,
    ) -> Result<(), EngineError>;
}

/// Builds a fresh active tab at `location`.
pub(crate) fn new_tab(location: &Location, ownership: SurfaceOwnership) -> Tab {
    let full = location.full();
    Tab {
        id: Uuid::new_v4().to_string(),
        title: title_resolver::resolve(&full),
        location: full,
        active: true,
        ownership,
    }
}

/// Clones the sequence with `active` set only on `tab_id`.
pub(crate) fn activate_only(tabs: &[Tab], tab_id: &str) -> Vec<Tab> {
    tabs.iter()
        .cloned()
        .map(|mut tab| {
            tab.active = tab.id == tab_id;
            tab
        })
        .collect()
}

/// Captures the registry state so an optimistic change can be reverted.
pub(crate) fn checkpoint(registry: &TabRegistry) -> (Vec<Tab>, String) {
    (registry.list().to_vec(), registry.active_id().to_string())
}

/// Outcome of planning a close: the next sequence and active id, plus
/// whether the shared surface must be re-pointed.
pub(crate) struct ClosePlan {
    pub tabs: Vec<Tab>,
    pub active_id: String,
    pub closed_was_active: bool,
    pub created_default: Option<Tab>,
}

/// Computes the registry transition for closing `tab_id`.
///
/// Returns `None` when the id is unknown. When the close would empty the
/// registry, the plan contains a fresh default tab at `default_location`.
pub(crate) fn plan_close(
    registry: &TabRegistry,
    tab_id: &str,
    default_location: &Location,
    ownership: SurfaceOwnership,
) -> Option<ClosePlan> {
    let idx = registry.position(tab_id)?;
    let closed_was_active = registry.active_id() == tab_id;

    let remaining: Vec<Tab> = registry
        .list()
        .iter()
        .filter(|t| t.id != tab_id)
        .cloned()
        .collect();

    if remaining.is_empty() {
        let fresh = new_tab(default_location, ownership);
        return Some(ClosePlan {
            active_id: fresh.id.clone(),
            tabs: vec![fresh.clone()],
            closed_was_active: true,
            created_default: Some(fresh),
        });
    }

    let active_id = if closed_was_active {
        remaining[idx.min(remaining.len() - 1)].id.clone()
    } else {
        registry.active_id().to_string()
    };
    let tabs = activate_only(&remaining, &active_id);

    Some(ClosePlan {
        tabs,
        active_id,
        closed_was_active,
        created_default: None,
    })
}
