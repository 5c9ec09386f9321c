//=========================================================================
// State Machine Executor
//=========================================================================
//
// Registration, transitions and per-frame update for one entity.
//
// Invariants:
//   - at most one state is current
//   - on_exit / on_enter run exactly once per transition
//   - on_update runs at most once per update() call
//   - a transition requested from on_update is applied once, after the
//     hook, and never re-enters on_update in the same call
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use super::{Flow, StateHooks, StateKey};
use crate::error::{BehaviorError, Result};

//=== Constants ===========================================================

/// Upper bound on transitions chained from `on_enter` hooks in one call.
pub const MAX_CHAINED_TRANSITIONS: usize = 8;

//=== StateMachine ========================================================

/// Finite-state executor over an owner `O`.
///
/// The machine does not own `O`; callers pass it into `set_state` and
/// `update`. This keeps owner data and the machine borrowable at once.
pub struct StateMachine<O, S: StateKey> {
    label: String,
    states: HashMap<S, StateHooks<O, S>>,
    current: Option<S>,
    previous: Option<S>,
    destroyed: bool,
}

impl<O, S: StateKey> StateMachine<O, S> {
    //--- Construction -----------------------------------------------------

    /// Creates an empty machine. `label` tags log lines and errors.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            states: HashMap::new(),
            current: None,
            previous: None,
            destroyed: false,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a state.
    ///
    /// Registering the same key twice is an error and leaves the first
    /// registration in place.
    pub fn add_state(&mut self, key: S, hooks: StateHooks<O, S>) -> Result<&mut Self> {
        if self.states.contains_key(&key) {
            return Err(BehaviorError::DuplicateState {
                machine: self.label.clone(),
                state: format!("{:?}", key),
            });
        }

        self.states.insert(key, hooks);
        Ok(self)
    }

    //--- Transitions ------------------------------------------------------

    /// Switches to `key`, running exit and enter hooks.
    ///
    /// Re-entering the current state is a no-op. An unregistered key is an
    /// error and the current state stays as it was.
    pub fn set_state(&mut self, owner: &mut O, key: S) -> Result<()> {
        if self.destroyed {
            debug!(target: "fsm", "{}: set_state({:?}) after destroy ignored", self.label, key);
            return Ok(());
        }

        self.apply(owner, key)
    }

    //--- Update Loop ------------------------------------------------------

    /// Runs the current state's update hook.
    pub fn update(&mut self, owner: &mut O, dt_ms: f32) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }

        let Some(current) = self.current else {
            return Ok(());
        };

        let Some(hook) = self.states.get(&current).and_then(|hooks| hooks.update) else {
            return Ok(());
        };

        let mut flow = Flow::new(Some(current), self.previous, None);
        hook(owner, &mut flow, dt_ms);

        match flow.take_pending() {
            Some(next) => self.apply(owner, next),
            None => Ok(()),
        }
    }

    //--- Query API --------------------------------------------------------

    pub fn current(&self) -> Option<S> {
        self.current
    }

    pub fn previous(&self) -> Option<S> {
        self.previous
    }

    pub fn is_in(&self, key: S) -> bool {
        self.current == Some(key)
    }

    pub fn has_state(&self, key: S) -> bool {
        self.states.contains_key(&key)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    //--- Teardown ---------------------------------------------------------

    /// Releases the state table. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }

        trace!(target: "fsm", "{}: destroyed in {:?}", self.label, self.current);
        self.destroyed = true;
        self.states.clear();
    }

    //--- Internal Helpers -------------------------------------------------

    fn apply(&mut self, owner: &mut O, mut key: S) -> Result<()> {
        for _ in 0..MAX_CHAINED_TRANSITIONS {
            if self.current == Some(key) {
                return Ok(());
            }

            let Some(incoming) = self.states.get(&key) else {
                return Err(BehaviorError::UnknownState {
                    machine: self.label.clone(),
                    state: format!("{:?}", key),
                });
            };
            let enter = incoming.enter;

            // Outgoing state
            if let Some(outgoing) = self.current {
                if let Some(exit) = self.states.get(&outgoing).and_then(|hooks| hooks.exit) {
                    let mut flow = Flow::new(Some(outgoing), self.previous, Some(key));
                    exit(owner, &mut flow);
                    if let Some(ignored) = flow.take_pending() {
                        warn!(
                            target: "fsm",
                            "{}: transition to {:?} requested from on_exit of {:?} ignored",
                            self.label, ignored, outgoing
                        );
                    }
                }
            }

            // Switch
            self.previous = self.current;
            self.current = Some(key);
            debug!(target: "fsm", "{}: {:?} -> {:?}", self.label, self.previous, key);

            // Incoming state
            let Some(enter) = enter else {
                return Ok(());
            };
            let mut flow = Flow::new(Some(key), self.previous, None);
            enter(owner, &mut flow);

            match flow.take_pending() {
                Some(next) => key = next,
                None => return Ok(()),
            }
        }

        warn!(
            target: "fsm",
            "{}: more than {} chained transitions, stopped in {:?}",
            self.label, MAX_CHAINED_TRANSITIONS, self.current
        );
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
    enum Phase {
        Idle,
        Left,
        Right,
        Dead,
        Spin,
    }

    impl StateKey for Phase {}

    #[derive(Default)]
    struct Log {
        calls: Vec<String>,
        ticks: u32,
    }

    fn push(log: &mut Log, entry: &str) {
        log.calls.push(entry.to_string());
    }

    fn machine() -> StateMachine<Log, Phase> {
        let mut fsm: StateMachine<Log, Phase> = StateMachine::new("test");
        fsm.add_state(
            Phase::Idle,
            StateHooks::<Log, Phase>::new()
                .on_enter(|log, _| push(log, "idle:enter"))
                .on_exit(|log, _| push(log, "idle:exit")),
        )
        .unwrap()
        .add_state(
            Phase::Left,
            StateHooks::<Log, Phase>::new()
                .on_enter(|log, _| push(log, "left:enter"))
                .on_update(|log, flow, _| {
                    log.ticks += 1;
                    push(log, "left:update");
                    if log.ticks >= 2 {
                        flow.set_state(Phase::Right);
                    }
                })
                .on_exit(|log, flow| {
                    let next = format!("left:exit->{:?}", flow.next());
                    log.calls.push(next);
                }),
        )
        .unwrap()
        .add_state(
            Phase::Right,
            StateHooks::<Log, Phase>::new()
                .on_enter(|log, _| push(log, "right:enter"))
                .on_update(|log, _, _| push(log, "right:update")),
        )
        .unwrap()
        .add_state(Phase::Dead, StateHooks::<Log, Phase>::new())
        .unwrap();
        fsm
    }

    //--- Registration -----------------------------------------------------

    #[test]
    fn duplicate_state_is_rejected() {
        let mut fsm = machine();
        let err = fsm.add_state(Phase::Idle, StateHooks::<Log, Phase>::new()).err();

        assert!(matches!(err, Some(BehaviorError::DuplicateState { .. })));
        assert_eq!(fsm.state_count(), 4);
    }

    //--- Transitions ------------------------------------------------------

    #[test]
    fn exit_runs_before_enter() {
        let mut fsm = machine();
        let mut log = Log::default();

        fsm.set_state(&mut log, Phase::Idle).unwrap();
        fsm.set_state(&mut log, Phase::Left).unwrap();

        assert_eq!(log.calls, vec!["idle:enter", "idle:exit", "left:enter"]);
        assert_eq!(fsm.current(), Some(Phase::Left));
        assert_eq!(fsm.previous(), Some(Phase::Idle));
    }

    #[test]
    fn same_state_is_noop() {
        let mut fsm = machine();
        let mut log = Log::default();

        fsm.set_state(&mut log, Phase::Idle).unwrap();
        fsm.set_state(&mut log, Phase::Idle).unwrap();

        assert_eq!(log.calls, vec!["idle:enter"]);
    }

    #[test]
    fn unknown_state_is_error_and_keeps_current() {
        let mut fsm = machine();
        let mut log = Log::default();
        fsm.set_state(&mut log, Phase::Idle).unwrap();

        let err = fsm.set_state(&mut log, Phase::Spin).unwrap_err();

        assert!(matches!(err, BehaviorError::UnknownState { .. }));
        assert_eq!(fsm.current(), Some(Phase::Idle));
        assert_eq!(log.calls, vec!["idle:enter"]);
    }

    #[test]
    fn enter_can_chain_transition() {
        let mut fsm: StateMachine<Log, Phase> = StateMachine::new("chain");
        fsm.add_state(
            Phase::Idle,
            StateHooks::<Log, Phase>::new().on_enter(|_, flow| flow.set_state(Phase::Left)),
        )
        .unwrap()
        .add_state(Phase::Left, StateHooks::<Log, Phase>::new().on_enter(|log, _| push(log, "left")))
        .unwrap();

        let mut log = Log::default();
        fsm.set_state(&mut log, Phase::Idle).unwrap();

        assert_eq!(fsm.current(), Some(Phase::Left));
        assert_eq!(fsm.previous(), Some(Phase::Idle));
        assert_eq!(log.calls, vec!["left"]);
    }

    #[test]
    fn chained_cycle_is_bounded() {
        let mut fsm: StateMachine<Log, Phase> = StateMachine::new("cycle");
        fsm.add_state(
            Phase::Left,
            StateHooks::<Log, Phase>::new().on_enter(|log, flow| {
                log.ticks += 1;
                flow.set_state(Phase::Right);
            }),
        )
        .unwrap()
        .add_state(
            Phase::Right,
            StateHooks::<Log, Phase>::new().on_enter(|log, flow| {
                log.ticks += 1;
                flow.set_state(Phase::Left);
            }),
        )
        .unwrap();

        let mut log = Log::default();
        fsm.set_state(&mut log, Phase::Left).unwrap();

        assert_eq!(log.ticks as usize, MAX_CHAINED_TRANSITIONS);
    }

    //--- Update -----------------------------------------------------------

    #[test]
    fn update_transition_applies_once() {
        let mut fsm = machine();
        let mut log = Log::default();
        fsm.set_state(&mut log, Phase::Left).unwrap();
        log.calls.clear();

        fsm.update(&mut log, 16.0).unwrap();
        fsm.update(&mut log, 16.0).unwrap();

        assert_eq!(
            log.calls,
            vec![
                "left:update",
                "left:update",
                "left:exit->Some(Right)",
                "right:enter"
            ]
        );

        fsm.update(&mut log, 16.0).unwrap();
        assert_eq!(log.calls.last().map(String::as_str), Some("right:update"));
    }

    #[test]
    fn update_without_state_is_noop() {
        let mut fsm = machine();
        let mut log = Log::default();
        fsm.update(&mut log, 16.0).unwrap();
        assert!(log.calls.is_empty());
    }

    //--- Teardown ---------------------------------------------------------

    #[test]
    fn destroy_is_idempotent_and_silences_machine() {
        let mut fsm = machine();
        let mut log = Log::default();
        fsm.set_state(&mut log, Phase::Right).unwrap();

        fsm.destroy();
        fsm.destroy();
        log.calls.clear();

        fsm.update(&mut log, 16.0).unwrap();
        fsm.set_state(&mut log, Phase::Idle).unwrap();

        assert!(fsm.is_destroyed());
        assert!(log.calls.is_empty());
        assert_eq!(fsm.state_count(), 0);
    }
}
