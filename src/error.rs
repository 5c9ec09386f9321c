//=========================================================================
// Behavior Errors
//=========================================================================
//
// Crate-wide error type.
//
// Construction-time integrity failures (duplicate state, duplicate
// entity) are returned to the caller. Runtime conditions inside a frame
// are logged by the subsystem that hit them and never abort the frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== BehaviorError =======================================================

#[derive(Debug, Error)]
pub enum BehaviorError {
    /// A transition named a state that was never registered.
    #[error("{machine}: unknown state {state}")]
    UnknownState { machine: String, state: String },

    /// `add_state` was called twice with the same key.
    #[error("{machine}: state {state} is already registered")]
    DuplicateState { machine: String, state: String },

    #[error("{machine}: state machine has been destroyed")]
    MachineDestroyed { machine: String },

    /// Two entities pushed to the same manager share an id.
    #[error("entity {id} ({name}) is already managed")]
    DuplicateEntity { id: u64, name: String },

    /// A level object whose name matches no archetype.
    #[error("no archetype for map object {0:?}")]
    UnknownObject(String),

    /// A handler tried to borrow a controller that is already mid-update.
    #[error("handler for {topic} found its controller busy")]
    HandlerBusy { topic: String },

    #[error("malformed topic {0:?}")]
    InvalidTopic(String),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// A tunable parsed fine but holds a value the engine cannot run with.
    #[error("invalid config value {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: &'static str },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BehaviorError>;

//=========================================================================
// Unit Tests
//=========================================================================
