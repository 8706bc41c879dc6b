use std::fmt;

// === EngineError ===

/// Errors surfaced by the synchronization engine.
#[derive(Debug)]
pub enum EngineError {
    /// An operation referenced a tab id no longer in the registry.
    /// Recovered locally as a no-op everywhere except `switch_tab`.
    NotFound(String),
    /// The registry would become empty or hold more than one active tab.
    /// Fatal: indicates the mutation path has a logic bug.
    InvariantViolation(String),
    /// An ambient or requested location failed to parse. Recovered locally;
    /// the previous state is retained.
    MalformedLocation(String),
    /// The host environment rejected a create/close/switch/navigate command.
    /// The optimistic registry change has been reverted.
    HostCommandFailure(String),
    /// The persistence store failed to read or write a snapshot.
    Store(StoreError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotFound(id) => write!(f, "Tab not found: {}", id),
            EngineError::InvariantViolation(msg) => {
                write!(f, "Registry invariant violated: {}", msg)
            }
            EngineError::MalformedLocation(msg) => write!(f, "Malformed location: {}", msg),
            EngineError::HostCommandFailure(msg) => write!(f, "Host command failed: {}", msg),
            EngineError::Store(err) => write!(f, "Snapshot store error: {}", err),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Store(err)
    }
}

// === StoreError ===

/// Errors related to snapshot persistence.
#[derive(Debug)]
pub enum StoreError {
    /// Failed to serialize or deserialize the tab sequence.
    Serialization(String),
    /// Database operation failed.
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Serialization(msg) => {
                write!(f, "Snapshot serialization error: {}", msg)
            }
            StoreError::Database(msg) => write!(f, "Snapshot database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
