//! Emulated host adapter.
//!
//! All tabs share the one real rendering surface; its current location is
//! the ambient "current page" of the hosting process. Switching tabs means
//! commanding the surface's router to the target tab's stored location, and
//! the outgoing tab's location is snapshotted from the ambient state first
//! so switching back later restores exactly where the user left it.

use std::sync::Arc;

use crate::managers::tab_registry::TabRegistry;
use crate::services::title_resolver;
use crate::surface::Router;
use crate::types::errors::EngineError;
use crate::types::location::{Location, APP_ROOT, BLANK_TAB_LOCATION};
use crate::types::tab::{SurfaceOwnership, Tab};

use super::{activate_only, checkpoint, new_tab, plan_close, HostAdapter, HostKind};

/// Host adapter for environments that emulate tabs over a shared surface.
pub struct EmulatedHost {
    router: Arc<dyn Router>,
}

impl EmulatedHost {
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self { router }
    }

    /// Pushes the router to `location` unless it is already there.
    fn repoint(&self, location: &str) -> Result<(), String> {
        let already_there = Location::parse(&self.router.current_location())
            .map(|current| current.full() == location)
            .unwrap_or(false);
        if already_there {
            return Ok(());
        }
        self.router.push(location)
    }

    /// Folds the live ambient location into the currently active tab, so the
    /// sequence about to be swapped in remembers where the user actually is.
    fn snapshot_outgoing(&self, registry: &TabRegistry, tabs: &mut [Tab]) {
        let Ok(ambient) = Location::parse(&self.router.current_location()) else {
            return;
        };
        let full = ambient.full();
        if let Some(outgoing) = tabs.iter_mut().find(|t| t.id == registry.active_id()) {
            if outgoing.ownership == SurfaceOwnership::Shared && outgoing.location != full {
                outgoing.title = title_resolver::resolve(&full);
                outgoing.location = full;
            }
        }
    }
}

impl HostAdapter for EmulatedHost {
    fn kind(&self) -> HostKind {
        HostKind::Emulated
    }

    fn create(
        &self,
        registry: &mut TabRegistry,
        location: Option<&str>,
    ) -> Result<Tab, EngineError> {
        let loc = Location::parse(location.unwrap_or(BLANK_TAB_LOCATION))?;
        let tab = new_tab(&loc, SurfaceOwnership::Shared);

        let (prev_tabs, prev_active) = checkpoint(registry);
        let mut tabs = activate_only(registry.list(), &tab.id);
        tabs.push(tab.clone());
        registry.replace(tabs, &tab.id)?;

        if let Err(e) = self.repoint(&tab.location) {
            registry.replace(prev_tabs, &prev_active)?;
            return Err(EngineError::HostCommandFailure(e));
        }
        Ok(tab)
    }

    fn close(&self, registry: &mut TabRegistry, tab_id: &str) -> Result<(), EngineError> {
        let default_location = Location::parse(APP_ROOT)?;
        let Some(plan) = plan_close(registry, tab_id, &default_location, SurfaceOwnership::Shared)
        else {
            return Ok(());
        };

        let (prev_tabs, prev_active) = checkpoint(registry);
        let repoint_to = plan.closed_was_active.then(|| {
            plan.tabs
                .iter()
                .find(|t| t.id == plan.active_id)
                .map(|t| t.location.clone())
                .unwrap_or_else(|| APP_ROOT.to_string())
        });
        registry.replace(plan.tabs, &plan.active_id)?;

        if let Some(location) = repoint_to {
            if let Err(e) = self.repoint(&location) {
                registry.replace(prev_tabs, &prev_active)?;
                return Err(EngineError::HostCommandFailure(e));
            }
        }
        Ok(())
    }

    fn switch_to(&self, registry: &mut TabRegistry, tab_id: &str) -> Result<(), EngineError> {
        let Some(target) = registry.get(tab_id) else {
            return Err(EngineError::NotFound(tab_id.to_string()));
        };
        if registry.active_id() == tab_id {
            return Ok(());
        }
        // The target's stored location, read before the outgoing snapshot
        // can touch the sequence.
        let target_location = target.location.clone();

        let (prev_tabs, prev_active) = checkpoint(registry);
        let mut tabs = registry.list().to_vec();
        self.snapshot_outgoing(registry, &mut tabs);
        let tabs = activate_only(&tabs, tab_id);
        registry.replace(tabs, tab_id)?;

        if let Err(e) = self.repoint(&target_location) {
            registry.replace(prev_tabs, &prev_active)?;
            return Err(EngineError::HostCommandFailure(e));
        }
        Ok(())
    }

    fn navigate(
        &self,
        registry: &mut TabRegistry,
        tab_id: &str,
        location: &Location,
    ) -> Result<(), EngineError> {
        if registry.get(tab_id).is_none() {
            return Err(EngineError::NotFound(tab_id.to_string()));
        }

        let (prev_tabs, prev_active) = checkpoint(registry);
        let full = location.full();
        let tabs: Vec<Tab> = registry
            .list()
            .iter()
            .cloned()
            .map(|mut tab| {
                if tab.id == tab_id {
                    tab.title = title_resolver::resolve(&full);
                    tab.location = full.clone();
                }
                tab
            })
            .collect();
        registry.replace(tabs, &prev_active)?;

        // Only the active tab's navigation moves the shared surface. When
        // the reconciliation loop commits an observed change the router is
        // already there, so the repoint guard makes this a no-op.
        if registry.active_id() == tab_id {
            if let Err(e) = self.repoint(&full) {
                registry.replace(prev_tabs, &prev_active)?;
                return Err(EngineError::HostCommandFailure(e));
            }
        }
        Ok(())
    }
}
