//=========================================================================
// World Surfaces
//=========================================================================
//
// Narrow views of the host's physics, display and tile map.
//
//   Sprite   ← velocity, flip, static, category, animation
//   TileMap  ← tile lookup and removal by layer
//   Player   ← pose, damage, launch
//
// The host owns the real physics and rendering. These records are what
// the behavior engine reads and writes between physics steps.
//
//=========================================================================

//=== Module Declarations =================================================

mod body;
mod player;
mod sprite;
mod tilemap;

//=== Public API ==========================================================

pub use body::{BodyLabel, EntityId, Rect};
pub use player::{Damage, Player, PlayerRef};
pub use sprite::{Sprite, SpriteRef};
pub use tilemap::{Tile, TileMap, TileMapRef, GROUND_LAYER};
