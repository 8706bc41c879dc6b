//! In-memory surface implementations.
//!
//! These back the console demo and the test suite: a router whose location
//! can be set directly to simulate organic or transitional navigation, a
//! view environment that records commands, and a manually advanced clock.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::{AmbientSurface, Clock, Router, ViewEnvironment};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// === MemoryRouter ===

struct RouterState {
    location: String,
    pushes: Vec<String>,
    fail_next_push: bool,
}

/// Shared-surface router holding its location in memory.
///
/// A `push` applies immediately; tests simulate the transitional states of a
/// real asynchronous route change with [`MemoryRouter::set_location`].
pub struct MemoryRouter {
    state: Mutex<RouterState>,
}

impl MemoryRouter {
    pub fn new(initial: &str) -> Self {
        Self {
            state: Mutex::new(RouterState {
                location: initial.to_string(),
                pushes: Vec::new(),
                fail_next_push: false,
            }),
        }
    }

    /// Moves the ambient location without going through `push`, as a user
    /// navigation or an in-flight route transition would.
    pub fn set_location(&self, location: &str) {
        locked(&self.state).location = location.to_string();
    }

    /// Every location pushed through the router, oldest first.
    pub fn pushes(&self) -> Vec<String> {
        locked(&self.state).pushes.clone()
    }

    /// Makes the next `push` fail, simulating a rejected route transition.
    pub fn fail_next_push(&self) {
        locked(&self.state).fail_next_push = true;
    }
}

impl AmbientSurface for MemoryRouter {
    fn current_location(&self) -> String {
        locked(&self.state).location.clone()
    }
}

impl Router for MemoryRouter {
    fn push(&self, location: &str) -> Result<(), String> {
        let mut state = locked(&self.state);
        if state.fail_next_push {
            state.fail_next_push = false;
            return Err(format!("router rejected push to {}", location));
        }
        state.pushes.push(location.to_string());
        state.location = location.to_string();
        Ok(())
    }
}

// === MemoryEnvironment ===

struct EnvState {
    views: BTreeMap<String, String>,
    focused: Option<String>,
    commands: Vec<String>,
    fail_next: Option<String>,
}

/// Multi-view environment that records every command it receives.
pub struct MemoryEnvironment {
    state: Mutex<EnvState>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EnvState {
                views: BTreeMap::new(),
                focused: None,
                commands: Vec::new(),
                fail_next: None,
            }),
        }
    }

    /// Makes the next command of the given kind (`open`, `close`, `focus`,
    /// `load`) fail.
    pub fn fail_next(&self, command: &str) {
        locked(&self.state).fail_next = Some(command.to_string());
    }

    /// Every command issued against the environment, oldest first.
    pub fn commands(&self) -> Vec<String> {
        locked(&self.state).commands.clone()
    }

    /// Location currently loaded in the given tab's view, if it exists.
    pub fn view_location(&self, tab_id: &str) -> Option<String> {
        locked(&self.state).views.get(tab_id).cloned()
    }

    /// Tab id of the frontmost view, if any.
    pub fn focused(&self) -> Option<String> {
        locked(&self.state).focused.clone()
    }

    fn command(&self, kind: &str, detail: String) -> Result<MutexGuard<'_, EnvState>, String> {
        let mut state = locked(&self.state);
        if state.fail_next.as_deref() == Some(kind) {
            state.fail_next = None;
            return Err(format!("environment rejected {}: {}", kind, detail));
        }
        state.commands.push(format!("{} {}", kind, detail));
        Ok(state)
    }
}

impl Default for MemoryEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewEnvironment for MemoryEnvironment {
    fn open_view(&self, tab_id: &str, location: &str) -> Result<(), String> {
        let mut state = self.command("open", format!("{} {}", tab_id, location))?;
        state.views.insert(tab_id.to_string(), location.to_string());
        state.focused = Some(tab_id.to_string());
        Ok(())
    }

    fn close_view(&self, tab_id: &str) -> Result<(), String> {
        let mut state = self.command("close", tab_id.to_string())?;
        state.views.remove(tab_id);
        if state.focused.as_deref() == Some(tab_id) {
            state.focused = None;
        }
        Ok(())
    }

    fn focus_view(&self, tab_id: &str) -> Result<(), String> {
        let mut state = self.command("focus", tab_id.to_string())?;
        if !state.views.contains_key(tab_id) {
            return Err(format!("no view for tab {}", tab_id));
        }
        state.focused = Some(tab_id.to_string());
        Ok(())
    }

    fn load_location(&self, tab_id: &str, location: &str) -> Result<(), String> {
        let mut state = self.command("load", format!("{} {}", tab_id, location))?;
        match state.views.get_mut(tab_id) {
            Some(entry) => {
                *entry = location.to_string();
                Ok(())
            }
            None => Err(format!("no view for tab {}", tab_id)),
        }
    }
}

// === ManualClock ===

/// Clock advanced explicitly by tests.
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *locked(&self.offset) += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *locked(&self.offset)
    }
}
