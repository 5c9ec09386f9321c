//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use hoppa_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Configuration and errors
pub use crate::config::{load_config, BehaviorConfig};
pub use crate::error::{BehaviorError, Result};

// State machine
pub use crate::core::state_machine::{Flow, StateHooks, StateKey, StateMachine};

// Event signaling
pub use crate::core::event_bus::{Event, EventBus, Signal, TimerTag, Topic};

// Level services and entity management
pub use crate::core::collision::{BodyInfo, CollisionPair, CollisionSender};
pub use crate::core::{
    Controller, Creature, Entity, FrameClock, FrameStepper, Manager, Scheduler, Stage, StageBuilder, StaticObject,
    StepPlan,
};

// Creatures
pub use crate::creatures::{Actor, Behavior, Brain, CreatureBehavior, MapObject};

// World surfaces
pub use crate::world::{BodyLabel, EntityId, Player, PlayerRef, Rect, Sprite, SpriteRef, TileMap, GROUND_LAYER};
