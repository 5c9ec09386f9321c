//=========================================================================
// Entity Contracts
//=========================================================================
//
// Capability traits every managed object implements, and the tagged
// union the manager stores.
//
//   Controller   update + destroy + sprite
//   Creature     Controller + lookahead + keep_object
//   StaticObject destroy + sprite
//
// The variant is chosen at construction, so an object missing part of a
// contract cannot be built into an `Entity` at all.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::world::{EntityId, SpriteRef, TileMap};

//=== Controller ==========================================================

pub trait Controller {
    fn id(&self) -> EntityId;

    /// Instance name; the topic namespace on the event bus.
    fn name(&self) -> &str;

    /// Advances timers and the state machine. `dt_ms` is milliseconds.
    fn update(&mut self, dt_ms: f32);

    /// Unsubscribes everything and releases the sprite. Idempotent.
    fn destroy(&mut self);

    /// `None` once the sprite has been released.
    fn sprite(&self) -> Option<SpriteRef>;
}

//=== Creature ============================================================

pub trait Creature: Controller {
    /// Terrain self-correction, run once per frame after `update`.
    /// Returns true when it forced a transition.
    fn lookahead(&mut self, map: &TileMap) -> bool;

    /// False once the creature has been torn down. Never returns to true.
    fn keep_object(&self) -> bool;
}

//=== StaticObject ========================================================

pub trait StaticObject {
    fn id(&self) -> EntityId;

    fn name(&self) -> &str;

    fn destroy(&mut self);

    fn sprite(&self) -> Option<SpriteRef>;
}

//=== Entity ==============================================================

pub enum Entity {
    Controller(Box<dyn Controller>),
    Creature(Box<dyn Creature>),
    Static(Box<dyn StaticObject>),
}

impl Entity {
    pub fn controller(controller: impl Controller + 'static) -> Self {
        Entity::Controller(Box::new(controller))
    }

    pub fn creature(creature: impl Creature + 'static) -> Self {
        Entity::Creature(Box::new(creature))
    }

    pub fn static_object(object: impl StaticObject + 'static) -> Self {
        Entity::Static(Box::new(object))
    }

    pub fn id(&self) -> EntityId {
        match self {
            Entity::Controller(c) => c.id(),
            Entity::Creature(c) => c.id(),
            Entity::Static(s) => s.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Controller(c) => c.name(),
            Entity::Creature(c) => c.name(),
            Entity::Static(s) => s.name(),
        }
    }

    pub fn sprite(&self) -> Option<SpriteRef> {
        match self {
            Entity::Controller(c) => c.sprite(),
            Entity::Creature(c) => c.sprite(),
            Entity::Static(s) => s.sprite(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Controller(_) => "controller",
            Entity::Creature(_) => "creature",
            Entity::Static(_) => "static",
        }
    }
}
