//=========================================================================
// Creatures
//=========================================================================
//
// Per-archetype behavior built on one generic actor.
//
//   Actor<B> ── Brain<B> { body: B, fsm, subscriptions }
//       │
//       ├─ Controller  update → B::tick → state machine
//       └─ Creature    lookahead / keep_object (CreatureBehavior only)
//
// Shared pieces:
//   terrain    single-tile probes (ledge, wall, ceiling/floor)
//   proximity  player distance, angle, line of sight
//   patrol     timed left/right legs
//   explosion  tile clearing with sound cues
//   factory    level object → Entity
//
//=========================================================================

//=== Module Declarations =================================================

pub mod actor;
pub mod explosion;
pub mod factory;
pub mod patrol;
pub mod proximity;
pub mod terrain;

pub mod bat;
pub mod bomb;
pub mod crab;
pub mod crow;
pub mod dragon;
pub mod firewalker;
pub mod flower;
pub mod fly;
pub mod plant;
pub mod projectile;
pub mod skin_switch;
pub mod tnt;
pub mod water;
pub mod zeppelin;

#[cfg(test)]
pub(crate) mod fixtures;

//=== Public API ==========================================================

pub use actor::{Actor, Behavior, Brain, CreatureBehavior, Lifecycle};
pub use explosion::Explosion;
pub use factory::MapObject;
pub use proximity::PlayerTracker;

pub use bat::{Bat, BatController, BatState};
pub use bomb::{Bomb, BombController, BombState};
pub use crab::{Crab, CrabController, CrabIcon, CrabState};
pub use crow::{Crow, CrowController, CrowState};
pub use dragon::{Dragon, DragonController, DragonState};
pub use firewalker::{FireWalker, FireWalkerController, FireWalkerState};
pub use flower::{Flower, FlowerController, FlowerState};
pub use fly::{Fly, FlyController, FlyState};
pub use plant::{Plant, PlantController, PlantState};
pub use projectile::{Launch, Projectile, ProjectileController, ProjectileState};
pub use skin_switch::SkinSwitch;
pub use tnt::{Tnt, TntController, TntState};
pub use water::{Water, WaterController, WaterState};
pub use zeppelin::{Zeppelin, ZeppelinController, ZeppelinState};
