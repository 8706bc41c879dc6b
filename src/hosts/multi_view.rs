//! Multi-view host adapter.
//!
//! Every tab genuinely owns an independent rendering surface at the
//! environment level. Switch and navigate delegate to the environment's
//! bring-to-front and load primitives; the environment reports location
//! changes back asynchronously, which the engine consumes as external
//! events (`TabSyncEngine::notify_view_navigation`).

use std::sync::Arc;

use crate::managers::tab_registry::TabRegistry;
use crate::services::title_resolver;
use crate::surface::ViewEnvironment;
use crate::types::errors::EngineError;
use crate::types::location::{Location, APP_ROOT, BLANK_TAB_LOCATION};
use crate::types::tab::{SurfaceOwnership, Tab};

use super::{activate_only, checkpoint, new_tab, plan_close, HostAdapter, HostKind};

/// Host adapter for environments with one real surface per tab.
pub struct MultiViewHost {
    env: Arc<dyn ViewEnvironment>,
}

impl MultiViewHost {
    pub fn new(env: Arc<dyn ViewEnvironment>) -> Self {
        Self { env }
    }
}

impl HostAdapter for MultiViewHost {
    fn kind(&self) -> HostKind {
        HostKind::MultiView
    }

    fn create(
        &self,
        registry: &mut TabRegistry,
        location: Option<&str>,
    ) -> Result<Tab, EngineError> {
        let loc = Location::parse(location.unwrap_or(BLANK_TAB_LOCATION))?;
        let tab = new_tab(&loc, SurfaceOwnership::Owned);

        let (prev_tabs, prev_active) = checkpoint(registry);
        let mut tabs = activate_only(registry.list(), &tab.id);
        tabs.push(tab.clone());
        registry.replace(tabs, &tab.id)?;

        if let Err(e) = self.env.open_view(&tab.id, &tab.location) {
            registry.replace(prev_tabs, &prev_active)?;
            return Err(EngineError::HostCommandFailure(e));
        }
        Ok(tab)
    }

    fn close(&self, registry: &mut TabRegistry, tab_id: &str) -> Result<(), EngineError> {
        let default_location = Location::parse(APP_ROOT)?;
        let Some(plan) = plan_close(registry, tab_id, &default_location, SurfaceOwnership::Owned)
        else {
            return Ok(());
        };

        let (prev_tabs, prev_active) = checkpoint(registry);
        registry.replace(plan.tabs, &plan.active_id)?;

        let effects = (|| -> Result<(), String> {
            self.env.close_view(tab_id)?;
            if let Some(fresh) = &plan.created_default {
                self.env.open_view(&fresh.id, &fresh.location)?;
            } else if plan.closed_was_active {
                self.env.focus_view(&plan.active_id)?;
            }
            Ok(())
        })();

        if let Err(e) = effects {
            registry.replace(prev_tabs, &prev_active)?;
            return Err(EngineError::HostCommandFailure(e));
        }
        Ok(())
    }

    fn switch_to(&self, registry: &mut TabRegistry, tab_id: &str) -> Result<(), EngineError> {
        if registry.get(tab_id).is_none() {
            return Err(EngineError::NotFound(tab_id.to_string()));
        }
        if registry.active_id() == tab_id {
            return Ok(());
        }

        let (prev_tabs, prev_active) = checkpoint(registry);
        let tabs = activate_only(registry.list(), tab_id);
        registry.replace(tabs, tab_id)?;

        if let Err(e) = self.env.focus_view(tab_id) {
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

        if let Err(e) = self.env.load_location(tab_id, &full) {
            registry.replace(prev_tabs, &prev_active)?;
            return Err(EngineError::HostCommandFailure(e));
        }
        Ok(())
    }
}
