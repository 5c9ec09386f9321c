//=========================================================================
// Subscriptions
//=========================================================================
//
// Per-controller record of what it registered on the bus, so `destroy`
// can release everything in one call.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::bus::{EventBus, Handler};
use super::topic::{Signal, Topic};
use crate::world::EntityId;

//=== Subscriptions =======================================================

pub struct Subscriptions {
    subscriber: EntityId,
    entries: Vec<(Topic, Handler)>,
}

impl Subscriptions {
    pub fn new(subscriber: EntityId) -> Self {
        Self {
            subscriber,
            entries: Vec::new(),
        }
    }

    pub fn subscriber(&self) -> EntityId {
        self.subscriber
    }

    /// Subscribes and remembers the pair.
    pub fn on(&mut self, bus: &EventBus, topic: Topic, handler: Handler) {
        let handler = bus.on(topic.clone(), handler, self.subscriber);
        self.entries.push((topic, handler));
    }

    /// Drops every remembered subscription for one signal kind.
    pub fn off(&mut self, bus: &EventBus, signal: Signal) -> usize {
        let subscriber = self.subscriber;
        let before = self.entries.len();

        self.entries.retain(|(topic, handler)| {
            if topic.signal() != signal {
                return true;
            }
            bus.off(topic, handler, subscriber);
            false
        });

        before - self.entries.len()
    }

    /// Drops everything. Calling it again is a no-op.
    pub fn release(&mut self, bus: &EventBus) {
        if self.entries.is_empty() {
            return;
        }

        trace!(target: "bus", "Releasing {} subscriptions of {}", self.entries.len(), self.subscriber);
        for (topic, handler) in self.entries.drain(..) {
            bus.off(&topic, &handler, self.subscriber);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_subscribed(&self, signal: Signal) -> bool {
        self.entries.iter().any(|(topic, _)| topic.signal() == signal)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
