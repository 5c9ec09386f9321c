//=========================================================================
// Manager
//=========================================================================
//
// Owns every entity of one level and drives them once per logic frame.
//
// Frame order:
//   1. tick the frame clock
//   2. update controllers, drop the ones whose sprite is gone
//   3. prune creatures with keep_object() == false
//   4. update, then lookahead, each remaining creature
//   5. adopt entities queued on the stage (projectiles)
//   6. advance the scheduler and emit due timers
//   7. drain collision pairs from the physics channel and emit them
//
// Entities are kept in three collections by contract. Static objects are
// never updated; they only receive events and are destroyed with the
// level.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

use crossbeam_channel::bounded;
use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::collision::{CollisionCollector, CollisionSender, Feed, Tolerances};
use crate::core::entity::{Controller, Creature, Entity, StaticObject};
use crate::core::event_bus::Event;
use crate::core::stage::Stage;
use crate::error::{BehaviorError, Result};
use crate::world::{EntityId, SpriteRef};

//=== Manager =============================================================

pub struct Manager {
    stage: Stage,
    controllers: Vec<Box<dyn Controller>>,
    creatures: Vec<Box<dyn Creature>>,
    objects: Vec<Box<dyn StaticObject>>,
    ids: HashSet<EntityId>,
    sender: CollisionSender,
    collector: CollisionCollector,
    feed: Feed,
    last_time_ms: f64,
    destroyed: bool,
}

impl Manager {
    //--- Construction -----------------------------------------------------

    pub fn new(stage: Stage) -> Self {
        let collision = &stage.config().collision;
        // A zero-capacity channel would rendezvous with a logic thread that
        // only drains once per frame.
        let (sender, receiver) = bounded(collision.channel_capacity.max(1));
        let collector = CollisionCollector::new(receiver, Tolerances::from(collision));

        Self {
            stage,
            controllers: Vec::new(),
            creatures: Vec::new(),
            objects: Vec::new(),
            ids: HashSet::new(),
            sender,
            collector,
            feed: Feed::Continue,
            last_time_ms: 0.0,
            destroyed: false,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Sender for the host's physics contact callback.
    pub fn collision_sender(&self) -> CollisionSender {
        self.sender.clone()
    }

    //--- Registration -----------------------------------------------------

    /// Adds an entity to the collection matching its contract.
    pub fn push(&mut self, entity: Entity) -> Result<()> {
        let id = entity.id();
        if !self.ids.insert(id) {
            return Err(BehaviorError::DuplicateEntity {
                id: id.raw(),
                name: entity.name().to_string(),
            });
        }

        trace!(target: "manager", "Managing {} {} ({})", entity.kind(), entity.name(), id);
        match entity {
            Entity::Controller(controller) => self.controllers.push(controller),
            Entity::Creature(creature) => self.creatures.push(creature),
            Entity::Static(object) => self.objects.push(object),
        }
        Ok(())
    }

    //--- Update Loop ------------------------------------------------------

    /// Runs one logic frame. `time_ms` is the host clock, `dt_ms` the
    /// time since the previous frame.
    pub fn update(&mut self, time_ms: f64, dt_ms: f32) {
        if self.destroyed {
            return;
        }
        self.last_time_ms = time_ms;
        let frame = self.stage.clock().tick();
        trace!(target: "manager", "Frame {} at {:.1}ms (dt {:.2})", frame, time_ms, dt_ms);

        self.update_controllers(dt_ms);
        self.prune_creatures();
        self.update_creatures(dt_ms);
        self.adopt_spawns();
        self.emit_timers(dt_ms);
        self.emit_collisions();
    }

    fn update_controllers(&mut self, dt_ms: f32) {
        for controller in &mut self.controllers {
            controller.update(dt_ms);
        }

        let ids = &mut self.ids;
        self.controllers.retain(|controller| {
            let alive = controller.sprite().is_some();
            if !alive {
                trace!(target: "manager", "Dropping spent controller {}", controller.name());
                ids.remove(&controller.id());
            }
            alive
        });
    }

    fn prune_creatures(&mut self) {
        let ids = &mut self.ids;
        self.creatures.retain(|creature| {
            let keep = creature.keep_object();
            if !keep {
                debug!(target: "manager", "Pruned creature {}", creature.name());
                ids.remove(&creature.id());
            }
            keep
        });
    }

    fn update_creatures(&mut self, dt_ms: f32) {
        let map = self.stage.map().clone();
        for creature in &mut self.creatures {
            creature.update(dt_ms);
            match map.try_borrow() {
                Ok(map) => {
                    creature.lookahead(&map);
                }
                Err(_) => warn!(target: "manager", "Tile map busy, lookahead skipped for {}", creature.name()),
            }
        }
    }

    fn adopt_spawns(&mut self) {
        for entity in self.stage.spawns().drain() {
            let name = entity.name().to_string();
            if let Err(err) = self.push(entity) {
                warn!(target: "manager", "Spawned {} rejected: {}", name, err);
            }
        }
    }

    fn emit_timers(&mut self, dt_ms: f32) {
        for event in self.stage.scheduler().advance(dt_ms) {
            self.stage.bus().emit(&event);
        }
    }

    fn emit_collisions(&mut self) {
        if self.feed == Feed::Disconnected {
            return;
        }

        self.feed = self.collector.collect_frame();
        for event in self.collector.take_events() {
            self.stage.bus().emit(&event);
        }
        if self.feed == Feed::Disconnected {
            warn!(target: "manager", "Collision feed disconnected");
        }
    }

    //--- Host Hooks -------------------------------------------------------

    /// Reports that the sprite of entity `id` finished `clip`. Returns
    /// how many handlers ran.
    pub fn notify_animation_complete(&mut self, id: EntityId, clip: &str) -> usize {
        let Some(name) = self.name_of(id) else {
            trace!(target: "manager", "Animation {} finished on unmanaged {}", clip, id);
            return 0;
        };
        self.stage.bus().emit(&Event::animation_complete(&name, id, clip))
    }

    fn name_of(&self, id: EntityId) -> Option<String> {
        self.controllers
            .iter()
            .map(|c| (c.id(), c.name()))
            .chain(self.creatures.iter().map(|c| (c.id(), c.name())))
            .chain(self.objects.iter().map(|o| (o.id(), o.name())))
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, name)| name.to_string())
    }

    //--- Teardown ---------------------------------------------------------

    /// Destroys every entity. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        info!(
            target: "manager",
            "Destroying {} controllers, {} creatures, {} objects",
            self.controllers.len(),
            self.creatures.len(),
            self.objects.len()
        );
        for controller in &mut self.controllers {
            controller.destroy();
        }
        for creature in &mut self.creatures {
            creature.destroy();
        }
        for object in &mut self.objects {
            object.destroy();
        }

        self.controllers.clear();
        self.creatures.clear();
        self.objects.clear();
        self.ids.clear();

        for entity in self.stage.spawns().drain() {
            match entity {
                Entity::Controller(mut controller) => controller.destroy(),
                Entity::Creature(mut creature) => creature.destroy(),
                Entity::Static(mut object) => object.destroy(),
            }
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    //--- Query API --------------------------------------------------------

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    pub fn creature_count(&self) -> usize {
        self.creatures.len()
    }

    pub fn static_count(&self) -> usize {
        self.objects.len()
    }

    pub fn last_time_ms(&self) -> f64 {
        self.last_time_ms
    }

    /// Live sprites of every managed entity, for the host to render.
    pub fn sprites(&self) -> Vec<SpriteRef> {
        self.controllers
            .iter()
            .filter_map(|c| c.sprite())
            .chain(self.creatures.iter().filter_map(|c| c.sprite()))
            .chain(self.objects.iter().filter_map(|o| o.sprite()))
            .collect()
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.destroy();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collision::{BodyInfo, CollisionPair};
    use crate::creatures::{fixtures, Launch, MapObject, Projectile};
    use crate::world::BodyLabel;

    fn spawn(manager: &mut Manager, name: &str, x: f32, y: f32) -> EntityId {
        let entity = manager.stage().spawn(&MapObject::new(name, x, y)).unwrap();
        let id = entity.id();
        manager.push(entity).unwrap();
        id
    }

    fn stomp(manager: &Manager, id: EntityId, name: &str, at: (f32, f32)) {
        let pair = CollisionPair::new(
            BodyInfo::new(id, name, BodyLabel::Creature, at),
            BodyInfo::new(fixtures::PLAYER_ID, "player", BodyLabel::Player, (at.0, at.1 - 48.0)).with_velocity(0.0, 2.0),
        );
        manager.collision_sender().send(pair).unwrap();
    }

    //--- Registration -----------------------------------------------------

    #[test]
    fn entities_are_sorted_by_contract() {
        let mut manager = Manager::new(fixtures::open_stage());
        spawn(&mut manager, "bat", 0.0, 0.0);
        spawn(&mut manager, "water", 0.0, 0.0);
        spawn(&mut manager, "changeskin", 0.0, 0.0);

        assert_eq!(manager.creature_count(), 1);
        assert_eq!(manager.controller_count(), 1);
        assert_eq!(manager.static_count(), 1);
        assert_eq!(manager.sprites().len(), 3);
    }

    #[test]
    fn idle_manager_accepts_a_contact_without_blocking() {
        let mut config = crate::config::BehaviorConfig::default();
        config.collision.channel_capacity = 0;
        let stage = crate::core::stage::StageBuilder::new().with_config(config).build();
        let manager = Manager::new(stage);

        let at = (64.0, 64.0);
        let pair = CollisionPair::new(
            BodyInfo::new(EntityId(5), "bat-5", BodyLabel::Creature, at),
            BodyInfo::new(fixtures::PLAYER_ID, "player", BodyLabel::Player, at),
        );
        assert!(manager.collision_sender().try_send(pair).is_ok());
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut manager = Manager::new(fixtures::open_stage());
        let stage = manager.stage().clone();
        let sprite = stage.sprite("flower-x", BodyLabel::Creature, (0.0, 0.0), (64.0, 64.0));

        let first = crate::creatures::Actor::new(&stage, crate::creatures::Flower::new(&stage, sprite.clone())).unwrap();
        let second = crate::creatures::Actor::new(&stage, crate::creatures::Flower::new(&stage, sprite)).unwrap();
        manager.push(Entity::creature(first)).unwrap();

        let err = manager.push(Entity::creature(second)).unwrap_err();
        assert!(matches!(err, BehaviorError::DuplicateEntity { .. }));
        assert_eq!(manager.creature_count(), 1);
    }

    //--- Frame ------------------------------------------------------------

    #[test]
    fn update_ticks_the_frame_clock() {
        let mut manager = Manager::new(fixtures::open_stage());
        manager.update(16.0, 16.0);
        manager.update(32.0, 16.0);

        assert_eq!(manager.stage().clock().frame(), 2);
        assert_eq!(manager.last_time_ms(), 32.0);
    }

    #[test]
    fn stomped_creature_is_pruned_after_its_clip() {
        let mut manager = Manager::new(fixtures::open_stage());
        let id = spawn(&mut manager, "flower", 288.0, 128.0);
        let name = manager.name_of(id).unwrap();

        stomp(&manager, id, &name, (320.0, 160.0));
        manager.update(16.0, 16.0);
        assert_eq!(manager.creature_count(), 1);

        assert_eq!(manager.notify_animation_complete(id, "dead"), 1);
        manager.update(32.0, 16.0);
        assert_eq!(manager.creature_count(), 0);
        assert!(manager.sprites().is_empty());
    }

    #[test]
    fn dragon_fireball_is_adopted_in_the_same_frame() {
        let (stage, _player) = fixtures::stage_with_player(&fixtures::FLOOR_ROWS, 200.0, 160.0);
        let mut manager = Manager::new(stage);
        spawn(&mut manager, "dragon", 368.0, 128.0);

        manager.update(16.0, 16.0);
        assert_eq!(manager.controller_count(), 1);
        assert!(manager.stage().spawns().is_empty());
    }

    #[test]
    fn spent_projectile_is_dropped() {
        let mut manager = Manager::new(fixtures::open_stage());
        let launch = Launch {
            kind: "fireball",
            position: (320.0, 96.0),
            velocity: (-11.0, 0.0),
            ttl_ms: 100.0,
            scale: 1.0,
        };
        Projectile::launch(manager.stage(), launch).unwrap();

        manager.update(16.0, 16.0);
        assert_eq!(manager.controller_count(), 1);

        manager.update(116.0, 100.0);
        manager.update(132.0, 16.0);
        assert_eq!(manager.controller_count(), 0);
    }

    #[test]
    fn timers_are_emitted() {
        let mut manager = Manager::new(fixtures::open_stage());
        let id = spawn(&mut manager, "bomb", 288.0, 128.0);
        let name = manager.name_of(id).unwrap();

        stomp(&manager, id, &name, (320.0, 160.0));
        manager.update(16.0, 16.0);
        manager.notify_animation_complete(id, "count");

        manager.update(32.0, 250.0);
        manager.update(48.0, 16.0);
        assert_eq!(manager.creature_count(), 0);
    }

    //--- Teardown ---------------------------------------------------------

    #[test]
    fn destroy_is_idempotent() {
        let mut manager = Manager::new(fixtures::open_stage());
        spawn(&mut manager, "crab", 0.0, 0.0);
        spawn(&mut manager, "tnt", 64.0, 0.0);
        let sprites = manager.sprites();

        manager.destroy();
        manager.destroy();
        assert!(manager.is_destroyed());
        assert_eq!(manager.creature_count() + manager.controller_count(), 0);
        assert!(sprites.iter().all(|sprite| !sprite.borrow().is_active()));

        manager.update(16.0, 16.0);
        assert_eq!(manager.stage().clock().frame(), 0);
    }

    #[test]
    fn destroy_drops_pending_timers() {
        let mut manager = Manager::new(fixtures::open_stage());
        let id = spawn(&mut manager, "bomb", 288.0, 128.0);
        let name = manager.name_of(id).unwrap();

        stomp(&manager, id, &name, (320.0, 160.0));
        manager.update(16.0, 16.0);
        manager.notify_animation_complete(id, "count");
        assert_eq!(manager.stage().scheduler().pending_count(), 1);

        manager.destroy();
        assert_eq!(manager.stage().scheduler().pending_count(), 0);
    }

    #[test]
    fn unknown_sprite_animation_is_ignored() {
        let mut manager = Manager::new(fixtures::open_stage());
        assert_eq!(manager.notify_animation_complete(EntityId(42), "dead"), 0);
    }
}
