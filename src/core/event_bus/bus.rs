//=========================================================================
// Event Bus
//=========================================================================
//
// Synchronous publish/subscribe keyed by topic.
//
// Architecture:
//   Controllers → on(topic, handler, subscriber) → HashMap<Topic, Vec<Entry>>
//                                                        ↓
//   Physics/Manager → emit(event) → snapshot → handler(event) × N
//
// Dispatch iterates a snapshot of the subscriber list, so handlers may
// subscribe or unsubscribe (themselves included) mid-dispatch. A handler
// that errors or panics is logged and skipped; the rest still run.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use log::{error, trace, warn};

//=== Internal Dependencies ===============================================

use super::topic::{Event, Topic};
use crate::error::Result;
use crate::world::EntityId;

//=== Handler =============================================================

/// Shared event callback. Identity is the `Rc` allocation.
pub type Handler = Rc<dyn Fn(&Event) -> Result<()>>;

#[derive(Clone)]
struct Entry {
    handler: Handler,
    subscriber: EntityId,
}

impl Entry {
    fn matches(&self, handler: &Handler, subscriber: EntityId) -> bool {
        self.subscriber == subscriber && same_handler(&self.handler, handler)
    }
}

fn same_handler(a: &Handler, b: &Handler) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

//=== EventBus ============================================================

/// Cloneable handle to one shared subscriber table.
///
/// Each stage constructs its own bus and hands clones to its controllers.
#[derive(Clone, Default)]
pub struct EventBus {
    topics: Rc<RefCell<HashMap<Topic, Vec<Entry>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Subscription -----------------------------------------------------

    /// Registers `handler` for `topic`. A repeated (handler, subscriber)
    /// pair is ignored.
    pub fn on(&self, topic: Topic, handler: Handler, subscriber: EntityId) -> Handler {
        let mut topics = self.topics.borrow_mut();
        let entries = topics.entry(topic).or_default();

        if entries.iter().any(|entry| entry.matches(&handler, subscriber)) {
            warn!(target: "bus", "Duplicate subscription by {} ignored", subscriber);
        } else {
            entries.push(Entry {
                handler: Rc::clone(&handler),
                subscriber,
            });
        }
        handler
    }

    /// Removes an exact (topic, handler, subscriber) match.
    ///
    /// Returns false when nothing matched.
    pub fn off(&self, topic: &Topic, handler: &Handler, subscriber: EntityId) -> bool {
        let mut topics = self.topics.borrow_mut();
        let Some(entries) = topics.get_mut(topic) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|entry| !entry.matches(handler, subscriber));
        let removed = entries.len() != before;

        if entries.is_empty() {
            topics.remove(topic);
        }
        removed
    }

    //--- Dispatch ---------------------------------------------------------

    /// Delivers `event` to every handler subscribed to its topic, in
    /// subscription order. Returns how many handlers completed without
    /// error.
    pub fn emit(&self, event: &Event) -> usize {
        let snapshot: Vec<Entry> = match self.topics.borrow().get(&event.topic) {
            Some(entries) => entries.clone(),
            None => {
                trace!(target: "bus", "{} has no subscribers", event.topic);
                return 0;
            }
        };

        let mut delivered = 0;
        for entry in snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| (entry.handler)(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => {
                    warn!(target: "bus", "Handler of {} for {} failed: {}", entry.subscriber, event.topic, err);
                }
                Err(_) => {
                    error!(target: "bus", "Handler of {} for {} panicked", entry.subscriber, event.topic);
                }
            }
        }
        delivered
    }

    //--- Query API --------------------------------------------------------

    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.topics.borrow().get(topic).map_or(0, Vec::len)
    }

    pub fn topic_count(&self) -> usize {
        self.topics.borrow().len()
    }

    /// Drops every subscription.
    pub fn clear(&self) {
        self.topics.borrow_mut().clear();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
