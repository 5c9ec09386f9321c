//=========================================================================
// Dragon
//=========================================================================
//
// Ground patrol that breathes fireballs at a player it is facing.
//
// Casting is rate limited in rendered frames, not milliseconds: after each
// fireball the next cast waits a random 30-200 frames on the stage clock.
// The `fire` clip interrupts the patrol; its completion returns to Idle.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;
use rand::rngs::StdRng;

//=== Internal Dependencies ===============================================

use super::actor::{Actor, Behavior, Brain, CreatureBehavior, Lifecycle};
use super::patrol::Patrol;
use super::projectile::{Launch, Projectile};
use super::proximity::{direction_x, distance, PlayerTracker};
use super::terrain::{has_tile_ahead, has_tile_in_front};
use crate::config::DragonConfig;
use crate::core::event_bus::{Event, Signal};
use crate::core::frame::FrameClock;
use crate::core::stage::Stage;
use crate::core::state_machine::{Flow, StateHooks, StateKey, StateMachine};
use crate::error::Result;
use crate::world::{SpriteRef, TileMap};

//=== States ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragonState {
    Idle,
    MoveLeft,
    MoveRight,
    Dead,
}

impl StateKey for DragonState {}

pub type DragonController = Actor<Dragon>;

/// Offset of the fireball spawn point from the dragon's centre.
const MUZZLE: (f32, f32) = (-12.0, -15.0);

//=== Dragon ==============================================================

pub struct Dragon {
    life: Lifecycle,
    patrol: Patrol,
    config: DragonConfig,
    stage: Stage,
    clock: FrameClock,
    player: PlayerTracker,
    ground: String,
    rng: StdRng,
    sight: f32,
    cast_at: u64,
}

impl Dragon {
    pub fn new(stage: &Stage, sprite: SpriteRef) -> Self {
        let config = stage.config().dragon.clone();
        let mut rng = stage.rng();
        let turn_after_ms = config.turn_after_ms.sample(&mut rng);
        let sight = config.sight_tiles * stage.map().borrow().tile_width() as f32;

        Self {
            life: Lifecycle::new(sprite),
            patrol: Patrol::new(config.speed, turn_after_ms),
            config,
            stage: stage.clone(),
            clock: stage.clock().clone(),
            player: PlayerTracker::new(stage.player()),
            ground: stage.ground_layer().to_string(),
            rng,
            sight,
            cast_at: 0,
        }
    }

    /// Frame from which the next fireball may be cast.
    pub fn cast_at(&self) -> u64 {
        self.cast_at
    }

    /// Casts at the player when in range, facing them and off cooldown.
    /// Returns true when a fireball was launched.
    fn try_cast(&mut self) -> bool {
        let (Some(me), Some(player)) = (self.life.position(), self.player.position()) else {
            return false;
        };
        if distance(me, player) >= self.sight {
            return false;
        }

        let frame = self.clock.frame();
        if self.cast_at > frame {
            return false;
        }

        let dir = direction_x(me, player);
        if (dir > 0.0) != self.life.facing_right() {
            return false;
        }

        let launch = Launch {
            kind: "fireball",
            position: (me.0 + MUZZLE.0, me.1 + MUZZLE.1),
            velocity: (dir * self.config.fireball_speed, 0.0),
            ttl_ms: self.config.fireball_ttl_ms.sample(&mut self.rng),
            scale: 1.0,
        };
        if let Err(err) = Projectile::launch(&self.stage, launch) {
            log::error!(target: "creature", "{}: fireball failed: {}", self.life.name(), err);
            return false;
        }

        self.cast_at = frame + self.config.cooldown_frames.sample(&mut self.rng);
        self.life.play("fire");
        debug!(target: "creature", "{} casts, next at frame {}", self.life.name(), self.cast_at);
        true
    }

    //--- Hooks ------------------------------------------------------------

    fn idle_enter(&mut self, flow: &mut Flow<DragonState>) {
        self.life.play("idle");
        flow.set_state(if self.life.facing_right() {
            DragonState::MoveRight
        } else {
            DragonState::MoveLeft
        });
    }

    fn move_enter(&mut self, _flow: &mut Flow<DragonState>) {
        self.patrol.reset();
    }

    fn move_update(&mut self, flow: &mut Flow<DragonState>, dt_ms: f32, facing_right: bool) {
        if self.patrol.step(&self.life, facing_right, dt_ms) {
            self.patrol.turn_after_ms = self.config.turn_after_ms.sample(&mut self.rng);
            flow.set_state(if facing_right {
                DragonState::MoveLeft
            } else {
                DragonState::MoveRight
            });
        }
    }

    fn move_left_update(&mut self, flow: &mut Flow<DragonState>, dt_ms: f32) {
        self.move_update(flow, dt_ms, false);
    }

    fn move_right_update(&mut self, flow: &mut Flow<DragonState>, dt_ms: f32) {
        self.move_update(flow, dt_ms, true);
    }
}

impl Behavior for Dragon {
    type State = DragonState;

    const KIND: &'static str = "dragon";
    const INITIAL: DragonState = DragonState::Idle;
    const SIGNALS: &'static [Signal] = &[Signal::Stomped, Signal::Blocked, Signal::AnimationComplete];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, DragonState>) -> Result<()> {
        fsm.add_state(DragonState::Idle, StateHooks::new().on_enter(Self::idle_enter))?
            .add_state(
                DragonState::MoveLeft,
                StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_left_update),
            )?
            .add_state(
                DragonState::MoveRight,
                StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_right_update),
            )?
            .add_state(DragonState::Dead, StateHooks::new())?;
        Ok(())
    }

    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()> {
        match event.signal() {
            Signal::Stomped => brain.collapse(DragonState::Dead, "dead"),
            Signal::AnimationComplete if brain.is_in(DragonState::Dead) => {
                brain.release();
            }
            Signal::AnimationComplete if event.clip() == Some("fire") => {
                brain.go(DragonState::Idle);
            }
            Signal::Blocked if !brain.is_in(DragonState::Dead) => {
                brain.body.patrol.reset();
                let next = if brain.body.life.facing_right() {
                    DragonState::MoveLeft
                } else {
                    DragonState::MoveRight
                };
                brain.go(next);
            }
            _ => {}
        }
        Ok(())
    }

    fn tick(brain: &mut Brain<Self>, dt_ms: f32) {
        brain.drive(dt_ms);
        if !brain.is_in(DragonState::Dead) {
            brain.body.try_cast();
        }
    }
}

impl CreatureBehavior for Dragon {
    fn lookahead(brain: &mut Brain<Self>, map: &TileMap) -> bool {
        if brain.is_in(DragonState::Dead) {
            return false;
        }

        let body = &brain.body;
        let turn = body.life.read_sprite(|sprite| {
            !has_tile_ahead(map, &body.ground, sprite, true, 0.0) || has_tile_in_front(map, &body.ground, sprite, 0.0)
        });
        if turn != Some(true) {
            return false;
        }

        let next = if brain.body.life.facing_right() {
            DragonState::MoveLeft
        } else {
            DragonState::MoveRight
        };
        brain.go(next);
        true
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
