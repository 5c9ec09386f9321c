//=========================================================================
// FireWalker
//=========================================================================
//
// Ground patrol that charges when the player stands in its path.
//
// The charge adds a fraction of the base speed for one cooldown window.
// The walk clip switches between `fast` and `idle` whenever the effective
// speed changes.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::actor::{Actor, Behavior, Brain, CreatureBehavior, Lifecycle};
use super::patrol::Patrol;
use super::proximity::{distance, PlayerTracker};
use super::terrain::has_tile_ahead;
use crate::config::FireWalkerConfig;
use crate::core::event_bus::{Event, Signal};
use crate::core::stage::Stage;
use crate::core::state_machine::{Flow, StateHooks, StateKey, StateMachine};
use crate::error::Result;
use crate::world::{SpriteRef, TileMap};

//=== States ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FireWalkerState {
    Idle,
    MoveLeft,
    MoveRight,
    Dead,
}

impl StateKey for FireWalkerState {}

pub type FireWalkerController = Actor<FireWalker>;

//=== Charge ==============================================================

#[derive(Debug, Clone)]
struct Charge {
    base_speed: f32,
    boost: f32,
    bonus: f32,
    cooldown_ms: f32,
    cooldown_total_ms: f32,
    boosted: bool,
    sight: f32,
    line_tolerance: f32,
    tile_width: f32,
}

impl Charge {
    fn new(config: &FireWalkerConfig, base_speed: f32, tile_width: f32) -> Self {
        Self {
            base_speed,
            boost: config.boost,
            bonus: 0.0,
            cooldown_ms: 0.0,
            cooldown_total_ms: config.boost_cooldown_ms,
            boosted: false,
            sight: config.sight_tiles * tile_width,
            line_tolerance: config.line_tolerance,
            tile_width,
        }
    }

    /// Whether the player stands ahead in the walker's lane.
    fn sees(&self, me: (f32, f32), facing_right: bool, player: (f32, f32)) -> bool {
        let my_column = (me.0 / self.tile_width).floor();
        let player_column = (player.0 / self.tile_width).floor();
        let in_line = if facing_right {
            my_column < player_column
        } else {
            my_column > player_column
        };

        in_line
            && (player.1 - me.1).abs() < self.line_tolerance
            && distance(me, player) < self.sight
    }
}

//=== FireWalker ==========================================================

pub struct FireWalker {
    life: Lifecycle,
    patrol: Patrol,
    charge: Charge,
    player: PlayerTracker,
    ground: String,
    shown_speed: Option<f32>,
}

impl FireWalker {
    pub fn new(stage: &Stage, sprite: SpriteRef) -> Self {
        let config = &stage.config().firewalker;
        let mut rng = stage.rng();
        let speed = config.speed.sample(&mut rng);
        let turn_after_ms = config.turn_after_ms.sample(&mut rng);
        let tile_width = stage.map().borrow().tile_width() as f32;

        Self {
            life: Lifecycle::new(sprite),
            patrol: Patrol::new(speed, turn_after_ms),
            charge: Charge::new(config, speed, tile_width),
            player: PlayerTracker::new(stage.player()),
            ground: stage.ground_layer().to_string(),
            shown_speed: None,
        }
    }

    /// Current walking speed including any charge bonus.
    pub fn speed(&self) -> f32 {
        self.patrol.speed
    }

    pub fn base_speed(&self) -> f32 {
        self.charge.base_speed
    }

    pub fn is_charging(&self) -> bool {
        self.charge.boosted
    }

    fn update_charge(&mut self, dt_ms: f32) {
        let me = self.life.position();
        let player = self.player.position();

        if let (Some(me), Some(player)) = (me, player) {
            let charge = &mut self.charge;
            if !charge.boosted && charge.cooldown_ms <= 0.0 && charge.sees(me, self.life.facing_right(), player) {
                if charge.bonus == 0.0 {
                    charge.bonus = self.patrol.speed * charge.boost;
                    self.patrol.speed += charge.bonus;
                    trace!(target: "creature", "{} charges at {:.2}", self.life.name(), self.patrol.speed);
                }
                charge.boosted = true;
                charge.cooldown_ms = charge.cooldown_total_ms;
            }
        }

        self.charge.cooldown_ms = (self.charge.cooldown_ms - dt_ms).max(0.0);
        if self.charge.cooldown_ms <= 0.0 {
            self.charge.boosted = false;
            if self.charge.bonus != 0.0 {
                self.patrol.speed = self.charge.base_speed;
                self.charge.bonus = 0.0;
            }
        }
    }

    fn refresh_clip(&mut self) {
        if self.shown_speed == Some(self.patrol.speed) {
            return;
        }
        let clip = if self.patrol.speed > self.charge.base_speed { "fast" } else { "idle" };
        self.life.play(clip);
        self.shown_speed = Some(self.patrol.speed);
    }

    //--- Hooks ------------------------------------------------------------

    fn idle_enter(&mut self, flow: &mut Flow<FireWalkerState>) {
        self.life.play("idle");
        flow.set_state(if self.life.facing_right() {
            FireWalkerState::MoveRight
        } else {
            FireWalkerState::MoveLeft
        });
    }

    fn move_enter(&mut self, _flow: &mut Flow<FireWalkerState>) {
        self.patrol.reset();
    }

    fn move_left_update(&mut self, flow: &mut Flow<FireWalkerState>, dt_ms: f32) {
        if self.patrol.step(&self.life, false, dt_ms) {
            flow.set_state(FireWalkerState::MoveRight);
        }
    }

    fn move_right_update(&mut self, flow: &mut Flow<FireWalkerState>, dt_ms: f32) {
        if self.patrol.step(&self.life, true, dt_ms) {
            flow.set_state(FireWalkerState::MoveLeft);
        }
    }
}

impl Behavior for FireWalker {
    type State = FireWalkerState;

    const KIND: &'static str = "firewalker";
    const INITIAL: FireWalkerState = FireWalkerState::Idle;
    const SIGNALS: &'static [Signal] = &[Signal::Stomped, Signal::Blocked, Signal::AnimationComplete];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, FireWalkerState>) -> Result<()> {
        fsm.add_state(FireWalkerState::Idle, StateHooks::new().on_enter(Self::idle_enter))?
            .add_state(
                FireWalkerState::MoveLeft,
                StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_left_update),
            )?
            .add_state(
                FireWalkerState::MoveRight,
                StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_right_update),
            )?
            .add_state(FireWalkerState::Dead, StateHooks::new())?;
        Ok(())
    }

    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()> {
        match event.signal() {
            Signal::Stomped => brain.collapse(FireWalkerState::Dead, "dead"),
            Signal::AnimationComplete if brain.is_in(FireWalkerState::Dead) => {
                brain.release();
            }
            Signal::Blocked if !brain.is_in(FireWalkerState::Dead) => {
                brain.body.patrol.reset();
                let next = if brain.body.life.facing_right() {
                    FireWalkerState::MoveLeft
                } else {
                    FireWalkerState::MoveRight
                };
                brain.go(next);
            }
            _ => {}
        }
        Ok(())
    }

    fn tick(brain: &mut Brain<Self>, dt_ms: f32) {
        brain.drive(dt_ms);
        if brain.is_in(FireWalkerState::Dead) {
            return;
        }
        brain.body.update_charge(dt_ms);
        brain.body.refresh_clip();
    }
}

impl CreatureBehavior for FireWalker {
    fn lookahead(brain: &mut Brain<Self>, map: &TileMap) -> bool {
        if brain.is_in(FireWalkerState::Dead) {
            return false;
        }

        let body = &brain.body;
        let ledge = body.life.read_sprite(|sprite| {
            !has_tile_ahead(map, &body.ground, sprite, true, 0.0) && sprite.velocity().1 == 0.0
        });
        if ledge != Some(true) {
            return false;
        }

        let next = if brain.body.life.facing_right() {
            FireWalkerState::MoveLeft
        } else {
            FireWalkerState::MoveRight
        };
        brain.go(next);
        true
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{Controller, Creature};
    use crate::creatures::fixtures;

    // Floor under columns 1..=8 only.
    const LEDGES: [&str; 3] = [
        "..........",
        "..........",
        ".########.",
    ];

    fn spawn(stage: &Stage, x: f32) -> FireWalkerController {
        let sprite = fixtures::sprite(stage, "fire-1", x, 96.0);
        Actor::new(stage, FireWalker::new(stage, sprite)).unwrap()
    }

    //--- Charge -----------------------------------------------------------

    #[test]
    fn charges_at_player_in_lane() {
        let (stage, _player) = fixtures::stage_with_player(&LEDGES, 200.0, 96.0);
        let mut walker = spawn(&stage, 400.0);
        let base = walker.inspect(FireWalker::base_speed).unwrap();

        walker.update(16.0);
        assert!(walker.inspect(FireWalker::is_charging).unwrap());
        let speed = walker.inspect(FireWalker::speed).unwrap();
        assert!((speed - base * 1.8).abs() < 1e-4);
        assert_eq!(fixtures::clip(&walker), Some("fast".to_string()));
    }

    #[test]
    fn charge_wears_off_after_cooldown() {
        let (stage, player) = fixtures::stage_with_player(&LEDGES, 200.0, 96.0);
        let mut walker = spawn(&stage, 400.0);
        let base = walker.inspect(FireWalker::base_speed).unwrap();

        walker.update(16.0);
        player.borrow_mut().set_position(200.0, -400.0);
        walker.update(1000.0);

        assert!(!walker.inspect(FireWalker::is_charging).unwrap());
        assert_eq!(walker.inspect(FireWalker::speed).unwrap(), base);
        assert_eq!(fixtures::clip(&walker), Some("idle".to_string()));
    }

    #[test]
    fn player_behind_is_ignored() {
        let (stage, _player) = fixtures::stage_with_player(&LEDGES, 500.0, 96.0);
        let mut walker = spawn(&stage, 400.0);

        walker.update(16.0);
        assert!(!walker.inspect(FireWalker::is_charging).unwrap());
    }

    #[test]
    fn player_on_another_level_is_ignored() {
        let (stage, _player) = fixtures::stage_with_player(&LEDGES, 200.0, 20.0);
        let mut walker = spawn(&stage, 400.0);

        walker.update(16.0);
        assert!(!walker.inspect(FireWalker::is_charging).unwrap());
    }

    //--- Terrain ----------------------------------------------------------

    #[test]
    fn turns_back_at_ledge() {
        let stage = fixtures::stage_with(&LEDGES);
        let mut walker = spawn(&stage, 96.0);
        assert_eq!(walker.state(), Some(FireWalkerState::MoveLeft));

        let map = stage.map().borrow();
        assert!(walker.lookahead(&map));
        assert_eq!(walker.state(), Some(FireWalkerState::MoveRight));
    }

    #[test]
    fn keeps_walking_over_floor() {
        let stage = fixtures::stage_with(&LEDGES);
        let mut walker = spawn(&stage, 320.0);

        let map = stage.map().borrow();
        assert!(!walker.lookahead(&map));
        assert_eq!(walker.state(), Some(FireWalkerState::MoveLeft));
    }

    #[test]
    fn stomp_kills_and_clip_releases() {
        let stage = fixtures::stage_with(&LEDGES);
        let walker = spawn(&stage, 320.0);

        fixtures::hit(&stage, &walker, Signal::Stomped);
        assert_eq!(walker.state(), Some(FireWalkerState::Dead));
        fixtures::finish(&stage, &walker, "dead");
        assert!(!walker.keep_object());
    }
}
