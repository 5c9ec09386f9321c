//=========================================================================
// Stage Builder
//=========================================================================
//
//     StageBuilder ──build()──> Stage ──> Manager::new(stage)
//         │
//         ├─ with_map()
//         ├─ with_player()
//         ├─ with_seed()
//         ├─ with_config()
//         └─ with_collision_capacity()
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

//=== Internal Dependencies ===============================================

use super::queues::{SoundCues, SpawnQueue};
use super::services::Stage;
use crate::config::BehaviorConfig;
use crate::core::event_bus::EventBus;
use crate::core::frame::FrameClock;
use crate::core::scheduler::Scheduler;
use crate::world::{PlayerRef, TileMap, TileMapRef};

//=== Constants ===========================================================

/// Ids below this are left to the host (player, terrain bodies).
const FIRST_ENTITY_ID: u64 = 1000;

//=== StageBuilder ========================================================

/// Builder for a [`Stage`].
///
/// # Default Values
///
/// - **Map**: empty 0x0 map with 64px tiles
/// - **Seed**: 0
/// - **Config**: [`BehaviorConfig::default`]
///
/// ```rust
/// use hoppa_engine::prelude::*;
///
/// let map = TileMap::from_rows(GROUND_LAYER, 64, &["....", "####"]);
/// let stage = StageBuilder::new()
///     .with_map(map)
///     .with_seed(7)
///     .with_collision_capacity(64)
///     .build();
///
/// assert_eq!(stage.config().collision.channel_capacity, 64);
/// ```
pub struct StageBuilder {
    map: Option<TileMapRef>,
    player: Option<PlayerRef>,
    seed: u64,
    config: BehaviorConfig,
}

impl StageBuilder {
    pub fn new() -> Self {
        Self {
            map: None,
            player: None,
            seed: 0,
            config: BehaviorConfig::default(),
        }
    }

    pub fn with_map(self, map: TileMap) -> Self {
        self.with_shared_map(map.into_ref())
    }

    /// Uses a map the host keeps a handle to.
    pub fn with_shared_map(mut self, map: TileMapRef) -> Self {
        self.map = Some(map);
        self
    }

    pub fn with_player(mut self, player: &PlayerRef) -> Self {
        self.player = Some(Rc::clone(player));
        self
    }

    /// Seeds every per-entity generator derived from the stage.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_config(mut self, config: BehaviorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the bound of the physics → manager collision channel.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_collision_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Collision channel capacity must be positive");
        self.config.collision.channel_capacity = capacity;
        self
    }

    pub fn build(self) -> Stage {
        info!(
            "Building stage (seed: {}, collision channel: {})",
            self.seed, self.config.collision.channel_capacity
        );

        let map = self
            .map
            .unwrap_or_else(|| TileMap::new(0, 0, 64, 64).into_ref());
        let player = self.player.as_ref().map_or_else(Weak::new, Rc::downgrade);

        Stage {
            bus: EventBus::new(),
            scheduler: Scheduler::new(),
            clock: FrameClock::new(),
            map,
            player,
            spawns: SpawnQueue::new(),
            sounds: SoundCues::new(),
            config: Rc::new(self.config),
            next_id: Rc::new(Cell::new(FIRST_ENTITY_ID)),
            seeds: Rc::new(RefCell::new(StdRng::seed_from_u64(self.seed))),
        }
    }
}

impl Default for StageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{EntityId, Player, GROUND_LAYER};

    #[test]
    fn defaults_build_an_empty_stage() {
        let stage = StageBuilder::new().build();
        assert_eq!(stage.map().borrow().width(), 0);
        assert!(stage.player().upgrade().is_none());
        assert_eq!(stage.ground_layer(), GROUND_LAYER);
    }

    #[test]
    fn builder_wires_map_and_player() {
        let player = Player::new(EntityId(1), 5.0, 5.0, 32.0, 64.0).into_ref();
        let stage = StageBuilder::new()
            .with_map(TileMap::from_rows(GROUND_LAYER, 64, &["##"]))
            .with_player(&player)
            .build();

        assert_eq!(stage.map().borrow().tile_count(GROUND_LAYER), 2);
        assert!(stage.player().upgrade().is_some());
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn zero_capacity_panics() {
        StageBuilder::new().with_collision_capacity(0);
    }

    #[test]
    fn first_ids_leave_room_for_host() {
        let stage = StageBuilder::new().build();
        assert_eq!(stage.next_id(), EntityId(FIRST_ENTITY_ID));
    }
}
