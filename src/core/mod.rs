//=========================================================================
// Core Systems
//
// Engine-side machinery shared by every entity of a level.
//
// Responsibilities:
// - Drive per-entity logic through generic state machines
// - Route collision, animation and timer signals over the event bus
// - Hold the shared per-level services (Stage) and the entity collections
//   (Manager)
//
// Frame flow:
//   host physics ─► CollisionSender ─┐
//   host animation ─► Manager::notify_animation_complete
//                                    ▼
//   Manager::update ─► controllers / creatures ─► Scheduler ─► EventBus
//
// Notes:
// Everything here runs on the host's logic thread. Shared handles are
// `Rc<RefCell<_>>`; the only cross-thread seam is the collision channel.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod collision;
pub mod entity;
pub mod event_bus;
pub mod frame;
pub mod manager;
pub mod scheduler;
pub mod stage;
pub mod state_machine;

//=== Public API ==========================================================

pub use entity::{Controller, Creature, Entity, StaticObject};
pub use frame::{FrameClock, FrameStepper, StepPlan};
pub use manager::Manager;
pub use scheduler::Scheduler;
pub use stage::{Stage, StageBuilder};
