//=========================================================================
// Event Signaling
//=========================================================================
//
// Collision and interaction signaling between the physics layer, the
// manager and entity controllers.
//
// Pattern: controller subscribes to its own topics → physics/manager
// emits → every current subscriber runs synchronously.
//
//=========================================================================

//=== Module Declarations =================================================

mod bus;
mod subscriptions;
mod topic;

//=== Public API ==========================================================

pub use bus::{EventBus, Handler};
pub use subscriptions::Subscriptions;
pub use topic::{Event, Payload, Signal, TimerTag, Topic};
