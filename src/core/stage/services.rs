//=========================================================================
// Stage
//=========================================================================
//
// Shared services injected into every controller of one level.
//
// Contains:
// - bus: collision / animation / timer signaling
// - scheduler: one-shot delayed events
// - clock: logic frame counter
// - map: the level's tile map
// - player: weak reference to the host's player record
// - spawns, sounds: per-frame outboxes
// - config: tunables
// - RNG source: per-entity seeded generators
//
// Cloning a stage clones handles, not state.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//=== Internal Dependencies ===============================================

use super::queues::{SoundCues, SpawnQueue};
use crate::config::BehaviorConfig;
use crate::core::event_bus::EventBus;
use crate::core::frame::FrameClock;
use crate::core::scheduler::Scheduler;
use crate::world::{BodyLabel, EntityId, Player, PlayerRef, Sprite, SpriteRef, TileMapRef};

//=== Stage ===============================================================

#[derive(Clone)]
pub struct Stage {
    pub(super) bus: EventBus,
    pub(super) scheduler: Scheduler,
    pub(super) clock: FrameClock,
    pub(super) map: TileMapRef,
    pub(super) player: Weak<RefCell<Player>>,
    pub(super) spawns: SpawnQueue,
    pub(super) sounds: SoundCues,
    pub(super) config: Rc<BehaviorConfig>,
    pub(super) next_id: Rc<Cell<u64>>,
    pub(super) seeds: Rc<RefCell<StdRng>>,
}

impl Stage {
    //--- Services ---------------------------------------------------------

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn map(&self) -> &TileMapRef {
        &self.map
    }

    pub fn spawns(&self) -> &SpawnQueue {
        &self.spawns
    }

    pub fn sounds(&self) -> &SoundCues {
        &self.sounds
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    /// Name of the tile layer terrain probes and explosions work on.
    pub fn ground_layer(&self) -> &str {
        &self.config.terrain.ground_layer
    }

    //--- Player -----------------------------------------------------------

    pub fn player(&self) -> Weak<RefCell<Player>> {
        Weak::clone(&self.player)
    }

    /// Points the stage at the host's player. Controllers built afterwards
    /// track it.
    pub fn set_player(&mut self, player: &PlayerRef) {
        self.player = Rc::downgrade(player);
    }

    //--- Allocation -------------------------------------------------------

    pub fn next_id(&self) -> EntityId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        EntityId(id)
    }

    /// Creates a sprite with a fresh id.
    pub fn sprite(&self, name: &str, label: BodyLabel, position: (f32, f32), size: (f32, f32)) -> SpriteRef {
        Sprite::new(self.next_id(), name, label, position.0, position.1, size.0, size.1).into_ref()
    }

    /// Derives an independent generator from the stage seed.
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seeds.borrow_mut().gen())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use crate::core::stage::StageBuilder;
    use crate::world::{BodyLabel, EntityId, Player};
    use rand::Rng;

    #[test]
    fn ids_are_unique_across_clones() {
        let stage = StageBuilder::new().build();
        let other = stage.clone();

        let a = stage.next_id();
        let b = other.next_id();
        assert_ne!(a, b);
    }

    #[test]
    fn sprite_gets_fresh_id_and_name() {
        let stage = StageBuilder::new().build();
        let sprite = stage.sprite("bat-1", BodyLabel::Creature, (10.0, 20.0), (64.0, 32.0));
        let sprite = sprite.borrow();

        assert_eq!(sprite.name(), "bat-1");
        assert_eq!(sprite.position(), (10.0, 20.0));
    }

    #[test]
    fn same_seed_same_rolls() {
        let a = StageBuilder::new().with_seed(99).build();
        let b = StageBuilder::new().with_seed(99).build();

        let x: u32 = a.rng().gen();
        let y: u32 = b.rng().gen();
        assert_eq!(x, y);
    }

    #[test]
    fn player_is_weak() {
        let mut stage = StageBuilder::new().build();
        let player = Player::new(EntityId(0), 0.0, 0.0, 32.0, 64.0).into_ref();
        stage.set_player(&player);

        assert!(stage.player().upgrade().is_some());
        drop(player);
        assert!(stage.player().upgrade().is_none());
    }
}
