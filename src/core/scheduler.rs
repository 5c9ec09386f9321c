//=========================================================================
// Scheduler
//=========================================================================
//
// One-shot delayed events on the game clock.
//
// Controllers schedule a timer event addressed to themselves; the
// manager advances the clock each frame and emits whatever came due.
// Nothing blocks. A timer that fires after its entity was torn down is
// dropped by that entity's garbage guard.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::event_bus::Event;
use crate::world::EntityId;

//=== Scheduled ===========================================================

#[derive(Debug)]
struct Scheduled {
    due_ms: f64,
    seq: u64,
    event: Event,
}

#[derive(Debug, Default)]
struct Timeline {
    now_ms: f64,
    seq: u64,
    pending: Vec<Scheduled>,
}

//=== Scheduler ===========================================================

/// Cloneable handle to a shared timeline.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    timeline: Rc<RefCell<Timeline>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `event` to be returned by `advance` once `delay_ms` has elapsed.
    pub fn after(&self, delay_ms: f32, event: Event) {
        let mut timeline = self.timeline.borrow_mut();
        let due_ms = timeline.now_ms + f64::from(delay_ms.max(0.0));
        let seq = timeline.seq;
        timeline.seq += 1;

        trace!(target: "scheduler", "{} due at {:.1}ms", event.topic, due_ms);
        timeline.pending.push(Scheduled { due_ms, seq, event });
    }

    /// Advances the clock and returns due events, earliest first.
    /// Ties keep scheduling order.
    pub fn advance(&self, dt_ms: f32) -> Vec<Event> {
        let mut timeline = self.timeline.borrow_mut();
        timeline.now_ms += f64::from(dt_ms.max(0.0));
        let now = timeline.now_ms;

        let (mut due, pending): (Vec<Scheduled>, Vec<Scheduled>) =
            timeline.pending.drain(..).partition(|entry| entry.due_ms <= now);
        timeline.pending = pending;

        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|entry| entry.event).collect()
    }

    /// Drops every pending timer addressed to `source`.
    pub fn cancel_for(&self, source: EntityId) -> usize {
        let mut timeline = self.timeline.borrow_mut();
        let before = timeline.pending.len();
        timeline.pending.retain(|entry| entry.event.source != source);
        before - timeline.pending.len()
    }

    pub fn pending_count(&self) -> usize {
        self.timeline.borrow().pending.len()
    }

    pub fn now_ms(&self) -> f64 {
        self.timeline.borrow().now_ms
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
