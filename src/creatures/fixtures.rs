//=========================================================================
// Test Fixtures
//=========================================================================
//
// Stage, sprite and signal helpers shared by the archetype tests.
//
//=========================================================================

use crate::core::entity::Controller;
use crate::core::event_bus::{Event, Signal};
use crate::core::stage::{Stage, StageBuilder};
use crate::world::{BodyLabel, EntityId, Player, PlayerRef, SpriteRef, TileMap, GROUND_LAYER};

pub const PLAYER_ID: EntityId = EntityId(1);

/// Ten columns of open air over a solid floor row.
pub const FLOOR_ROWS: [&str; 4] = [
    "..........",
    "..........",
    "..........",
    "##########",
];

pub fn open_stage() -> Stage {
    StageBuilder::new()
        .with_map(TileMap::from_rows(GROUND_LAYER, 64, &FLOOR_ROWS))
        .with_seed(11)
        .build()
}

pub fn stage_with(rows: &[&str]) -> Stage {
    StageBuilder::new()
        .with_map(TileMap::from_rows(GROUND_LAYER, 64, rows))
        .with_seed(11)
        .build()
}

/// Stage tracking a player at `(x, y)`. Keep the returned handle alive.
pub fn stage_with_player(rows: &[&str], x: f32, y: f32) -> (Stage, PlayerRef) {
    let player = Player::new(PLAYER_ID, x, y, 32.0, 64.0).into_ref();
    let stage = StageBuilder::new()
        .with_map(TileMap::from_rows(GROUND_LAYER, 64, rows))
        .with_player(&player)
        .with_seed(11)
        .build();
    (stage, player)
}

/// A 64x64 creature body centred on `(x, y)`.
pub fn sprite(stage: &Stage, name: &str, x: f32, y: f32) -> SpriteRef {
    stage.sprite(name, BodyLabel::Creature, (x, y), (64.0, 64.0))
}

/// Delivers a player contact signal to `target`.
pub fn hit(stage: &Stage, target: &impl Controller, signal: Signal) -> usize {
    let event = Event::contact(target.name(), signal, target.id(), PLAYER_ID, BodyLabel::Player);
    stage.bus().emit(&event)
}

/// Reports that `target` finished playing `clip`.
pub fn finish(stage: &Stage, target: &impl Controller, clip: &str) -> usize {
    let event = Event::animation_complete(target.name(), target.id(), clip);
    stage.bus().emit(&event)
}

/// Runs due timers.
pub fn advance(stage: &Stage, dt_ms: f32) {
    for event in stage.scheduler().advance(dt_ms) {
        stage.bus().emit(&event);
    }
}

pub fn clip(target: &impl Controller) -> Option<String> {
    let sprite = target.sprite()?;
    let sprite = sprite.borrow();
    sprite.animation().map(str::to_string)
}

pub fn move_to(target: &impl Controller, x: f32, y: f32) {
    if let Some(sprite) = target.sprite() {
        sprite.borrow_mut().set_position(x, y);
    }
}
