//! Engine facade for TabSync.
//!
//! [`TabSyncEngine`] exposes the four public tab operations to UI
//! collaborators and orchestrates the registry, the host adapter, and the
//! reconciliation loop. The host adapter is chosen by the embedding
//! application at construction; environment detection is an input, not a
//! decision made here.
//!
//! All mutations are expected to run on the embedding application's single
//! event thread; atomicity comes from each operation being one synchronous
//! call, not from locking.

use std::sync::Arc;

use crate::hosts::{activate_only, new_tab, HostAdapter, HostKind};
use crate::managers::reconciliation::ReconciliationLoop;
use crate::managers::tab_registry::TabRegistry;
use crate::services::snapshot_store::SnapshotStore;
use crate::services::title_resolver;
use crate::surface::{AmbientSurface, Clock};
use crate::types::errors::EngineError;
use crate::types::location::{Location, APP_ROOT};
use crate::types::tab::{SurfaceOwnership, Tab};

type Listener = Box<dyn FnMut(&[Tab], &str)>;

/// The tab & navigation synchronization engine.
pub struct TabSyncEngine {
    registry: TabRegistry,
    adapter: Box<dyn HostAdapter>,
    recon: ReconciliationLoop,
    store: Option<SnapshotStore>,
    listeners: Vec<Listener>,
}

impl TabSyncEngine {
    /// Bootstraps an engine.
    ///
    /// Reads the persisted snapshot exactly once. A missing, unreadable, or
    /// invalid snapshot falls back to a single default tab at the
    /// application root, owned per the adapter's host kind. Snapshots with
    /// stray active flags are normalized: the first active tab wins, or the
    /// first tab when none is flagged.
    pub fn new(
        adapter: Box<dyn HostAdapter>,
        ambient: Arc<dyn AmbientSurface>,
        clock: Arc<dyn Clock>,
        store: Option<SnapshotStore>,
    ) -> Result<Self, EngineError> {
        let snapshot = match store.as_ref() {
            Some(s) => s.load().unwrap_or(None),
            None => None,
        };
        let registry = Self::bootstrap_registry(snapshot, adapter.kind())?;

        let initial = registry
            .active_tab()
            .and_then(|tab| Location::parse(&tab.location).ok())
            .unwrap_or(Location::parse(APP_ROOT)?);
        let recon = ReconciliationLoop::new(ambient, clock, &initial);

        let engine = Self {
            registry,
            adapter,
            recon,
            store,
            listeners: Vec::new(),
        };
        engine.persist()?;
        Ok(engine)
    }

    fn bootstrap_registry(
        snapshot: Option<Vec<Tab>>,
        kind: HostKind,
    ) -> Result<TabRegistry, EngineError> {
        let default_ownership = match kind {
            HostKind::MultiView => SurfaceOwnership::Owned,
            HostKind::Emulated => SurfaceOwnership::Shared,
        };

        if let Some(tabs) = snapshot {
            if !tabs.is_empty() {
                let active_id = tabs
                    .iter()
                    .find(|t| t.active)
                    .map(|t| t.id.clone())
                    .unwrap_or_else(|| tabs[0].id.clone());
                let normalized = activate_only(&tabs, &active_id);
                if let Ok(registry) = TabRegistry::from_snapshot(normalized, &active_id) {
                    return Ok(registry);
                }
            }
        }

        let root = Location::parse(APP_ROOT)?;
        Ok(TabRegistry::bootstrap(new_tab(&root, default_ownership)))
    }

    /// The ordered tab sequence.
    pub fn tabs(&self) -> &[Tab] {
        self.registry.list()
    }

    pub fn active_id(&self) -> &str {
        self.registry.active_id()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.registry.active_tab()
    }

    /// Registers a listener delivered the full ordered sequence + active id
    /// on every commit.
    pub fn on_tabs_changed(&mut self, listener: impl FnMut(&[Tab], &str) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Creates a new active tab, optionally at `location`.
    ///
    /// The outgoing active tab's current ambient location is snapshotted
    /// into the registry first, so switching back later restores exactly
    /// where the user left it.
    pub fn create_tab(&mut self, location: Option<&str>) -> Result<Tab, EngineError> {
        self.snapshot_outgoing_ambient()?;
        self.recon.begin_suppression();
        let tab = self.adapter.create(&mut self.registry, location)?;
        self.sync_recorded();
        self.persist()?;
        self.notify();
        Ok(tab)
    }

    /// Closes a tab. Unknown ids are a silent no-op.
    pub fn close_tab(&mut self, tab_id: &str) -> Result<(), EngineError> {
        let Some(closing) = self.registry.get(tab_id) else {
            return Ok(());
        };
        let moves_surface = self.registry.active_id() == tab_id
            && closing.ownership == SurfaceOwnership::Shared;
        if moves_surface {
            self.recon.begin_suppression();
        }

        self.adapter.close(&mut self.registry, tab_id)?;
        self.sync_recorded();
        self.persist()?;
        self.notify();
        Ok(())
    }

    /// Activates a tab. Unknown ids fail with `NotFound`. Switching to the
    /// already-active tab is a no-op with no host effects.
    pub fn switch_tab(&mut self, tab_id: &str) -> Result<(), EngineError> {
        if self.registry.get(tab_id).is_none() {
            return Err(EngineError::NotFound(tab_id.to_string()));
        }
        if self.registry.active_id() == tab_id {
            return Ok(());
        }

        self.recon.begin_suppression();
        self.adapter.switch_to(&mut self.registry, tab_id)?;
        self.sync_recorded();
        self.persist()?;
        self.notify();
        Ok(())
    }

    /// Updates a tab's location. Unknown ids are a silent no-op; a location
    /// that fails to parse surfaces `MalformedLocation` and changes nothing.
    pub fn navigate_tab(&mut self, tab_id: &str, location: &str) -> Result<(), EngineError> {
        let loc = Location::parse(location)?;
        let Some(target) = self.registry.get(tab_id) else {
            return Ok(());
        };
        let moves_surface = self.registry.active_id() == tab_id
            && target.ownership == SurfaceOwnership::Shared;
        if moves_surface {
            self.recon.begin_suppression();
        }

        self.adapter.navigate(&mut self.registry, tab_id, &loc)?;
        self.sync_recorded();
        self.persist()?;
        self.notify();
        Ok(())
    }

    /// One reconciliation step: samples the ambient location and, when a
    /// genuine change is confirmed, commits it onto the active tab.
    ///
    /// The embedding application drives this from its periodic sampler (see
    /// `SAMPLE_INTERVAL`) and from native location-change notifications;
    /// both paths share the same suppression and last-recorded state.
    pub fn tick(&mut self) -> Result<(), EngineError> {
        let Some(commit) = self.recon.observe(&self.registry) else {
            return Ok(());
        };
        let active_id = self.registry.active_id().to_string();
        self.adapter.navigate(&mut self.registry, &active_id, &commit)?;
        self.recon.record_ambient(&commit);
        self.persist()?;
        self.notify();
        Ok(())
    }

    /// Consumes an environment report that an owned-surface view settled on
    /// a new location. Unknown tabs and malformed locations are ignored
    /// (the view may already be closed).
    pub fn notify_view_navigation(
        &mut self,
        tab_id: &str,
        location: &str,
    ) -> Result<(), EngineError> {
        let Ok(loc) = Location::parse(location) else {
            return Ok(());
        };
        if self.registry.get(tab_id).is_none() {
            return Ok(());
        }

        let full = loc.full();
        let active_id = self.registry.active_id().to_string();
        let tabs: Vec<Tab> = self
            .registry
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
        self.registry.replace(tabs, &active_id)?;
        self.persist()?;
        self.notify();
        Ok(())
    }

    /// Tears down the reconciliation sampler. Operations remain usable but
    /// ambient observation stops.
    pub fn dispose(&mut self) {
        self.recon.shutdown();
    }

    pub fn is_disposed(&self) -> bool {
        !self.recon.is_running()
    }

    /// Suppression state, exposed for embedders that gate their own UI
    /// while a switch is settling.
    pub fn is_reconciling(&self) -> bool {
        self.recon.is_suppressed()
    }

    /// Folds the live ambient location into the active shared-surface tab.
    fn snapshot_outgoing_ambient(&mut self) -> Result<(), EngineError> {
        let Some(active) = self.registry.active_tab() else {
            return Ok(());
        };
        if active.ownership != SurfaceOwnership::Shared {
            return Ok(());
        }
        let Ok(ambient) = Location::parse(&self.recon.ambient_location()) else {
            return Ok(());
        };
        let full = ambient.full();
        if full == active.location {
            return Ok(());
        }

        let active_id = self.registry.active_id().to_string();
        let tabs: Vec<Tab> = self
            .registry
            .list()
            .iter()
            .cloned()
            .map(|mut tab| {
                if tab.id == active_id {
                    tab.title = title_resolver::resolve(&full);
                    tab.location = full.clone();
                }
                tab
            })
            .collect();
        self.registry.replace(tabs, &active_id)
    }

    /// After a mutation, aligns the loop's last-recorded location with the
    /// active shared tab so the settled router state is not re-observed as
    /// an organic change.
    fn sync_recorded(&mut self) {
        let Some(active) = self.registry.active_tab() else {
            return;
        };
        if active.ownership != SurfaceOwnership::Shared {
            return;
        }
        if let Ok(loc) = Location::parse(&active.location) {
            self.recon.record_ambient(&loc);
        }
    }

    fn persist(&self) -> Result<(), EngineError> {
        if let Some(store) = &self.store {
            store.save(self.registry.list())?;
        }
        Ok(())
    }

    fn notify(&mut self) {
        let tabs = self.registry.list();
        let active_id = self.registry.active_id();
        for listener in self.listeners.iter_mut() {
            listener(tabs, active_id);
        }
    }
}
