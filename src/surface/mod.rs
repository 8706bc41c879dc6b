//! Host-environment seams for the synchronization engine.
//!
//! The engine never talks to a real router, webview, or timer directly; it is
//! constructed with implementations of these traits chosen by the embedding
//! application. [`memory`] provides in-memory implementations used by the
//! console demo and the test suite.

use std::time::Instant;

pub mod memory;

/// Read side of the single shared content surface: the "ambient location"
/// the process currently renders, independent of any tab bookkeeping.
pub trait AmbientSurface {
    fn current_location(&self) -> String;
}

/// The shared content surface's own navigation primitive.
///
/// `push` commands a client-side route transition; the resulting location
/// change is observed back through [`AmbientSurface`], possibly after an
/// asynchronous delay.
pub trait Router: AmbientSurface {
    fn push(&self, location: &str) -> Result<(), String>;
}

/// Environment that owns one independent rendering surface per tab.
///
/// Command failures are reported as strings and surfaced by the host adapter
/// as `EngineError::HostCommandFailure`.
pub trait ViewEnvironment {
    fn open_view(&self, tab_id: &str, location: &str) -> Result<(), String>;
    fn close_view(&self, tab_id: &str) -> Result<(), String>;
    fn focus_view(&self, tab_id: &str) -> Result<(), String>;
    fn load_location(&self, tab_id: &str, location: &str) -> Result<(), String>;
}

/// Time source for the reconciliation loop's suppression window.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock implementation used outside of tests.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
