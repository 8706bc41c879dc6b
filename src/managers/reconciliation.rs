//! Reconciliation loop for TabSync.
//!
//! Observes the ambient location of the shared content surface and decides
//! when a change should be recorded onto the active tab. Two hazards are
//! guarded against: a registry-driven router command being re-observed as an
//! organic navigation, and a mid-switch transient being recorded as the new
//! tab's location. The first is absorbed by a bounded suppression window,
//! the second by a two-tick confirmation of cross-directory changes.
//!
//! All state lives on the loop instance — the suppression deadline, the
//! last-recorded path/search/hash, and the pending confirmation — so
//! multiple engines (e.g. under test) never interfere. Both the periodic
//! sampler and event-driven notifications funnel into [`observe`], sharing
//! that state; this is safe because all producers run on the embedding
//! application's single event thread.
//!
//! [`observe`]: ReconciliationLoop::observe

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::managers::tab_registry::TabRegistry;
use crate::surface::{AmbientSurface, Clock};
use crate::types::location::Location;
use crate::types::tab::SurfaceOwnership;

/// How long self-caused ambient changes are ignored after an internally
/// triggered router command. Long enough to absorb the asynchronous
/// round-trip of a client-side route transition.
pub const SUPPRESSION_WINDOW: Duration = Duration::from_millis(1500);

/// How often the embedding application should call the engine's tick.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the feedback-loop guards and drives ambient-change detection.
pub struct ReconciliationLoop {
    ambient: Arc<dyn AmbientSurface>,
    clock: Arc<dyn Clock>,
    suppress_until: Option<Instant>,
    last_path: String,
    last_search: String,
    last_hash: String,
    pending: Option<Location>,
    running: bool,
}

impl ReconciliationLoop {
    /// Creates a loop whose last-recorded location starts at `initial`,
    /// normally the bootstrap active tab's location.
    pub fn new(
        ambient: Arc<dyn AmbientSurface>,
        clock: Arc<dyn Clock>,
        initial: &Location,
    ) -> Self {
        Self {
            ambient,
            clock,
            suppress_until: None,
            last_path: initial.path.clone(),
            last_search: initial.search.clone(),
            last_hash: initial.hash.clone(),
            pending: None,
            running: true,
        }
    }

    /// Opens the suppression window. Called before any internally triggered
    /// router command; expires on its own after [`SUPPRESSION_WINDOW`].
    pub fn begin_suppression(&mut self) {
        self.suppress_until = Some(self.clock.now() + SUPPRESSION_WINDOW);
    }

    pub fn is_suppressed(&self) -> bool {
        match self.suppress_until {
            Some(deadline) => self.clock.now() < deadline,
            None => false,
        }
    }

    /// Records `location` as the last ambient state the loop has accounted
    /// for, clearing any pending confirmation. Called after a commit and
    /// after facade operations that re-point the shared surface.
    pub fn record_ambient(&mut self, location: &Location) {
        self.last_path = location.path.clone();
        self.last_search = location.search.clone();
        self.last_hash = location.hash.clone();
        self.pending = None;
    }

    /// Raw ambient location string, for facade-level snapshots of the
    /// outgoing tab before a create or switch.
    pub fn ambient_location(&self) -> String {
        self.ambient.current_location()
    }

    /// Samples the ambient location and classifies any change.
    ///
    /// Returns the location to commit onto the active tab, or `None` when
    /// nothing should happen: the loop is suppressed or disposed, the
    /// ambient location is malformed or unchanged, the active tab owns its
    /// surface, or a cross-directory change is still awaiting its second
    /// confirming tick.
    pub fn observe(&mut self, registry: &TabRegistry) -> Option<Location> {
        if !self.running {
            return None;
        }
        if self.is_suppressed() {
            // A switch is in flight; transitional states are not evidence.
            self.pending = None;
            return None;
        }

        // Malformed ambient locations are ignored and the loop continues.
        let ambient = Location::parse(&self.ambient.current_location()).ok()?;

        if ambient.path == self.last_path
            && ambient.search == self.last_search
            && ambient.hash == self.last_hash
        {
            self.pending = None;
            return None;
        }

        let active = registry.active_tab()?;
        if active.ownership == SurfaceOwnership::Owned {
            // The ambient surface is not this tab's surface; the event
            // belongs to an environment-level view. A half-confirmed change
            // from an earlier shared tab is stale evidence by now.
            self.pending = None;
            return None;
        }

        match Location::parse(&active.location) {
            Ok(stored) if stored == ambient => {
                // Tab already reflects the ambient state; just resync.
                self.record_ambient(&ambient);
                None
            }
            Ok(stored) if stored.directory() == ambient.directory() => {
                // Query/hash movement within the same page is a genuine
                // same-tab navigation.
                Some(ambient)
            }
            _ => {
                // Cross-directory change: either mid-switch noise or a real
                // navigation. Only accept it once it persists across a
                // second sampling tick.
                if self.pending.as_ref() == Some(&ambient) {
                    self.pending = None;
                    Some(ambient)
                } else {
                    self.pending = Some(ambient);
                    None
                }
            }
        }
    }

    /// Tears down the sampler. Subsequent observations are inert.
    pub fn shutdown(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The last path/search/hash the loop has accounted for.
    pub fn last_recorded(&self) -> (String, String, String) {
        (
            self.last_path.clone(),
            self.last_search.clone(),
            self.last_hash.clone(),
        )
    }
}
