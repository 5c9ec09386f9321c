//=========================================================================
// State Machine
//=========================================================================
//
// Generic finite-state executor bound to an owning entity.
//
// Architecture:
//   StateMachine<O, S>
//     ├─ states: HashMap<S, StateHooks<O, S>>
//     └─ current / previous: Option<S>
//
// Flow:
//   set_state() → on_exit(old) → switch → on_enter(new) → [chained]
//   update()    → on_update(current) → [pending transition applied once]
//
// Hooks are plain function pointers receiving the owner and a `Flow`.
// A hook never touches the machine itself; it records the transition it
// wants in the `Flow` and the machine applies it after the hook returns.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt::Debug;
use std::hash::Hash;

//=== Module Declarations =================================================

mod flow;
mod machine;

//=== Public API ==========================================================

pub use flow::Flow;
pub use machine::{StateMachine, MAX_CHAINED_TRANSITIONS};

//=== State Key Trait =====================================================

/// Marker trait for state identifiers.
///
/// Typically implemented by one enum per archetype.
pub trait StateKey: Clone + Copy + Eq + Hash + Debug + 'static {}

//=== Hooks ===============================================================

pub type EnterHook<O, S> = fn(&mut O, &mut Flow<S>);
pub type UpdateHook<O, S> = fn(&mut O, &mut Flow<S>, f32);
pub type ExitHook<O, S> = fn(&mut O, &mut Flow<S>);

/// Optional lifecycle callbacks for one state.
///
/// ```rust
/// # use hoppa_engine::prelude::*;
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum Walk { Left }
/// # impl StateKey for Walk {}
/// struct Walker { vx: f32 }
///
/// let hooks = StateHooks::<Walker, Walk>::new()
///     .on_enter(|walker, _| walker.vx = -1.0)
///     .on_update(|walker, _, dt| walker.vx -= dt * 0.001);
/// ```
pub struct StateHooks<O, S: StateKey> {
    pub(crate) enter: Option<EnterHook<O, S>>,
    pub(crate) update: Option<UpdateHook<O, S>>,
    pub(crate) exit: Option<ExitHook<O, S>>,
}

impl<O, S: StateKey> StateHooks<O, S> {
    pub fn new() -> Self {
        Self {
            enter: None,
            update: None,
            exit: None,
        }
    }

    pub fn on_enter(mut self, hook: EnterHook<O, S>) -> Self {
        self.enter = Some(hook);
        self
    }

    pub fn on_update(mut self, hook: UpdateHook<O, S>) -> Self {
        self.update = Some(hook);
        self
    }

    pub fn on_exit(mut self, hook: ExitHook<O, S>) -> Self {
        self.exit = Some(hook);
        self
    }
}

impl<O, S: StateKey> Default for StateHooks<O, S> {
    fn default() -> Self {
        Self::new()
    }
}
