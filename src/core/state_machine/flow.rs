//=========================================================================
// Flow
//=========================================================================
//
// Transition slot handed to state hooks.
//
// Hooks record the transition they want here during enter/update. The
// state machine takes it after the hook returns. Only the last request
// of a single hook invocation survives.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::StateKey;

//=== Flow ================================================================

/// Read-only view of the machine's position plus a pending-transition slot.
#[derive(Debug)]
pub struct Flow<S: StateKey> {
    current: Option<S>,
    previous: Option<S>,
    next: Option<S>,
    pending: Option<S>,
}

impl<S: StateKey> Flow<S> {
    pub(crate) fn new(current: Option<S>, previous: Option<S>, next: Option<S>) -> Self {
        Self {
            current,
            previous,
            next,
            pending: None,
        }
    }

    /// Requests a transition once the running hook returns.
    pub fn set_state(&mut self, key: S) {
        if let Some(replaced) = self.pending.replace(key) {
            trace!(target: "fsm", "Pending transition {:?} superseded by {:?}", replaced, key);
        }
    }

    /// State whose hook is running. During `on_exit` this is the outgoing state.
    pub fn current(&self) -> Option<S> {
        self.current
    }

    /// State active before the current one.
    pub fn previous(&self) -> Option<S> {
        self.previous
    }

    /// Incoming state while an `on_exit` hook runs; `None` otherwise.
    pub fn next(&self) -> Option<S> {
        self.next
    }

    pub fn is_in(&self, key: S) -> bool {
        self.current == Some(key)
    }

    pub fn pending(&self) -> Option<S> {
        self.pending
    }

    pub(crate) fn take_pending(&mut self) -> Option<S> {
        self.pending.take()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
