//=========================================================================
// Collision Collector
//=========================================================================
//
// Drains collision pairs from the physics channel with bounded polling.
//
// Architecture:
//   Receiver<CollisionPair> → collect_frame() → classify() → events → Feed
//
// Bounded draining keeps one noisy frame from starving the update.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::classify::{classify, CollisionPair, Tolerances};
use crate::core::event_bus::Event;

//=== Constants ===========================================================

pub const MAX_PAIRS_PER_FRAME: usize = 256;

pub type CollisionSender = Sender<CollisionPair>;

//=== Feed ================================================================

/// State of the physics feed after a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Continue,
    /// Every sender is gone; no more pairs will arrive.
    Disconnected,
}

//=== CollisionCollector ==================================================

pub struct CollisionCollector {
    receiver: Receiver<CollisionPair>,
    tolerances: Tolerances,
    events: Vec<Event>,
}

impl CollisionCollector {
    pub fn new(receiver: Receiver<CollisionPair>, tolerances: Tolerances) -> Self {
        Self {
            receiver,
            tolerances,
            events: Vec::with_capacity(16),
        }
    }

    /// Classifies pending pairs (bounded to prevent starvation).
    pub fn collect_frame(&mut self) -> Feed {
        self.events.clear();
        let mut drained = 0;

        while drained < MAX_PAIRS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(pair) => {
                    self.events.extend(classify(&pair, &self.tolerances));
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => return Feed::Disconnected,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= MAX_PAIRS_PER_FRAME {
            warn!(target: "collision", "Collision backlog: drained {} pairs this frame", drained);
        }

        Feed::Continue
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Takes the classified events, leaving an empty buffer.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
