//=========================================================================
// Collision Routing
//=========================================================================
//
// Host physics → CollisionSender → CollisionCollector → classify()
//             → Event { "<name>-blocked" | "-stomped" | "-touched" } → bus
//
//=========================================================================

//=== Module Declarations =================================================

mod classify;
mod collector;

//=== Public API ==========================================================

pub use classify::{classify, BodyInfo, CollisionPair, Tolerances};
pub use collector::{CollisionCollector, CollisionSender, Feed, MAX_PAIRS_PER_FRAME};
