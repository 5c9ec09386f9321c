//=========================================================================
// Hoppa Engine: Library Root
//
// Per-entity behavior engine for a 2D side-scrolling platformer.
//
// Responsibilities:
// - State machines, event signaling and timers for level entities
// - One controller per creature archetype, built from level objects
// - A manager that updates, prunes and tears down a level's entities
//
// The host owns physics, rendering and audio. It feeds contacts and
// animation completions in, and reads sprite state and sound cues out.
//
// Typical usage:
// ```no_run
// use hoppa_engine::prelude::*;
//
// let stage = StageBuilder::new()
//     .with_map(TileMap::from_rows(GROUND_LAYER, 64, &["....", "####"]))
//     .build();
// let mut manager = Manager::new(stage.clone());
// let bat = stage.spawn(&MapObject::new("bat", 64.0, 0.0)).unwrap();
// manager.push(bat).unwrap();
// manager.update(16.0, 16.0);
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the machinery (state machine, bus, scheduler, manager).
// `creatures` holds the archetypes built on it. `world` is the narrow
// view of the host's sprites, tile map and player.
//
pub mod config;
pub mod core;
pub mod creatures;
pub mod error;
pub mod prelude;
pub mod world;

//--- Public Exports ------------------------------------------------------

pub use config::{load_config, BehaviorConfig};
pub use error::{BehaviorError, Result};
