//=========================================================================
// Stage Queues
//=========================================================================
//
// Outboxes that controllers write during a frame:
// - SpawnQueue: entities created mid-frame (projectiles), adopted by
//   the manager at the end of its update
// - SoundCues: named audio cues for the host's audio layer
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::entity::Entity;

//=== SpawnQueue ==========================================================

#[derive(Clone, Default)]
pub struct SpawnQueue {
    queue: Rc<RefCell<Vec<Entity>>>,
}

impl SpawnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entity: Entity) {
        self.queue.borrow_mut().push(entity);
    }

    pub fn drain(&self) -> Vec<Entity> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

//=== SoundCues ===========================================================

#[derive(Debug, Clone, Default)]
pub struct SoundCues {
    cues: Rc<RefCell<Vec<String>>>,
}

impl SoundCues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play(&self, cue: impl Into<String>) {
        self.cues.borrow_mut().push(cue.into());
    }

    /// Takes every cue recorded since the last drain.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.cues.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.cues.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.borrow().is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sound_cues_drain_in_order() {
        let cues = SoundCues::new();
        let writer = cues.clone();
        writer.play("explosion1");
        writer.play("explosion3");

        assert_eq!(cues.drain(), vec!["explosion1", "explosion3"]);
        assert!(cues.is_empty());
    }

    #[test]
    fn empty_spawn_queue_drains_nothing() {
        let queue = SpawnQueue::new();
        assert!(queue.drain().is_empty());
        assert_eq!(queue.len(), 0);
    }
}
