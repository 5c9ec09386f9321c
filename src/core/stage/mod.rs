//=========================================================================
// Stage Services
//=========================================================================
//
// Separates the shared per-level services (Stage) from how they are
// assembled (StageBuilder).
//
//=========================================================================

//=== Module Declarations =================================================

mod builder;
mod queues;
mod services;

//=== Public API ==========================================================

pub use builder::StageBuilder;
pub use queues::{SoundCues, SpawnQueue};
pub use services::Stage;
