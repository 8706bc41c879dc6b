//! Tab registry for TabSync.
//!
//! The sole mutable data model: an ordered sequence of [`Tab`] records plus
//! the single active-tab id. The registry is never empty and always has
//! exactly one active tab; [`TabRegistry::replace`] is the only mutation
//! point and rejects any sequence that would break either invariant.

use std::collections::HashSet;

use crate::types::errors::EngineError;
use crate::types::tab::Tab;

/// Ordered tab collection with an invariant-checked atomic swap.
pub struct TabRegistry {
    tabs: Vec<Tab>,
    active_id: String,
}

impl TabRegistry {
    /// Creates a registry holding a single tab, which is forced active.
    pub fn bootstrap(mut tab: Tab) -> Self {
        tab.active = true;
        let active_id = tab.id.clone();
        Self {
            tabs: vec![tab],
            active_id,
        }
    }

    /// Creates a registry from a rehydrated snapshot.
    ///
    /// The sequence must already satisfy the invariants; use the engine's
    /// bootstrap normalization to repair a snapshot first.
    pub fn from_snapshot(tabs: Vec<Tab>, active_id: &str) -> Result<Self, EngineError> {
        Self::validate(&tabs, active_id)?;
        Ok(Self {
            tabs,
            active_id: active_id.to_string(),
        })
    }

    /// The ordered tab sequence.
    pub fn list(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn get(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    /// Index of the tab in the ordered sequence.
    pub fn position(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// The active tab. The invariants guarantee it exists.
    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == self.active_id)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Atomically swaps in a new sequence and active id.
    ///
    /// Fails with `EngineError::InvariantViolation` if the sequence is
    /// empty, contains duplicate ids, or does not have exactly one tab with
    /// `active = true` matching `active_id`. No side effects beyond the
    /// swap; callers handle persistence and host effects.
    pub fn replace(&mut self, tabs: Vec<Tab>, active_id: &str) -> Result<(), EngineError> {
        Self::validate(&tabs, active_id)?;
        self.tabs = tabs;
        self.active_id = active_id.to_string();
        Ok(())
    }

    fn validate(tabs: &[Tab], active_id: &str) -> Result<(), EngineError> {
        if tabs.is_empty() {
            return Err(EngineError::InvariantViolation(
                "registry cannot become empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for tab in tabs {
            if !seen.insert(tab.id.as_str()) {
                return Err(EngineError::InvariantViolation(format!(
                    "duplicate tab id: {}",
                    tab.id
                )));
            }
        }

        let active: Vec<&str> = tabs
            .iter()
            .filter(|t| t.active)
            .map(|t| t.id.as_str())
            .collect();
        match active.as_slice() {
            [single] if *single == active_id => Ok(()),
            [single] => Err(EngineError::InvariantViolation(format!(
                "active flag on {} but active id is {}",
                single, active_id
            ))),
            [] => Err(EngineError::InvariantViolation(
                "no tab has the active flag".to_string(),
            )),
            _ => Err(EngineError::InvariantViolation(format!(
                "{} tabs have the active flag",
                active.len()
            ))),
        }
    }
}
