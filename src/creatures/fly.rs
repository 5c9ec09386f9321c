//=========================================================================
// Fly
//=========================================================================
//
// Hovering pest that dives at the player and bombs them on the way home.
//
// State Graph:
//   Rise <──leg over / blocked / terrain──> Sink
//     │                                      │
//     └──── player within 6 tiles (coin flip) ┘──> MoveToPlayer
//                                                    │ contact
//                                                    v
//   Sink <──── home within 32 px ──── ReturnToOrigin (drops droppings)
//
// Rise climbs slowly; Sink falls at four times wing power. A dive needs a
// clear line of sight through the ground layer, otherwise the fly keeps
// bobbing. Droppings are rate limited in rendered frames.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error};
use rand::rngs::StdRng;
use rand::Rng;

//=== Internal Dependencies ===============================================

use super::actor::{Actor, Behavior, Brain, CreatureBehavior, Lifecycle};
use super::projectile::{Launch, Projectile};
use super::proximity::{attack_angle, distance, line_of_sight, PlayerTracker};
use super::terrain::has_tile_vertical;
use crate::config::{FlyConfig, Span};
use crate::core::event_bus::{Event, Signal, TimerTag};
use crate::core::frame::FrameClock;
use crate::core::stage::Stage;
use crate::core::state_machine::{Flow, StateHooks, StateKey, StateMachine};
use crate::error::Result;
use crate::world::{Rect, SpriteRef, TileMap};

//=== Constants ===========================================================

const RISE_MS: Span = Span::new(1000.0, 2200.0);
const SINK_MS: Span = Span::new(1000.0, 2500.0);
const IDLE_MS: Span = Span::new(300.0, 1850.0);
const RETHINK_MS: Span = Span::new(200.0, 1000.0);

const HIDE_TIMER: TimerTag = TimerTag("hide");
const HIDE_DELAY_MS: f32 = 20.0;

const DROPPING_OFFSET: (f32, f32) = (-12.0, 8.0);
const DROPPING_SCALE: f32 = 0.8;

//=== States ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlyState {
    Idle,
    MoveToPlayer,
    ReturnToOrigin,
    Rise,
    Sink,
    Dead,
}

impl StateKey for FlyState {}

pub type FlyController = Actor<Fly>;

//=== Fly =================================================================

pub struct Fly {
    life: Lifecycle,
    config: FlyConfig,
    stage: Stage,
    clock: FrameClock,
    player: PlayerTracker,
    ground: String,
    rng: StdRng,

    origin: (f32, f32),
    sight: f32,
    last_player: Option<(f32, f32)>,
    last_bounds: Option<Rect>,
    /// Vertical intent: 1 sinking, -1 idle, 0 otherwise.
    direction: i8,

    elapsed_ms: f32,
    target_ms: f32,
    cast_at: u64,
}

impl Fly {
    pub fn new(stage: &Stage, sprite: SpriteRef) -> Self {
        let config = stage.config().fly.clone();
        let mut rng = stage.rng();
        let target_ms = config.first_think_ms.sample(&mut rng);
        let sight = config.sight_tiles * stage.map().borrow().tile_width() as f32;
        let origin = sprite.borrow().position();

        Self {
            life: Lifecycle::new(sprite),
            config,
            stage: stage.clone(),
            clock: stage.clock().clone(),
            player: PlayerTracker::new(stage.player()),
            ground: stage.ground_layer().to_string(),
            rng,
            origin,
            sight,
            last_player: None,
            last_bounds: None,
            direction: 0,
            elapsed_ms: 0.0,
            target_ms,
            cast_at: 0,
        }
    }

    pub fn origin(&self) -> (f32, f32) {
        self.origin
    }

    fn wing_power(&self) -> f32 {
        self.config.wing_power
    }

    //--- Sensing ----------------------------------------------------------

    fn player_in_range(&self) -> bool {
        match (self.life.position(), self.player.position()) {
            (Some(me), Some(player)) => distance(me, player) < self.sight,
            _ => false,
        }
    }

    /// Coin flip once half the leg is over; a dive needs the player in range.
    fn wants_dive(&mut self) -> bool {
        if !self.player.is_present() || self.elapsed_ms <= self.target_ms / 2.0 {
            return false;
        }
        self.rng.gen_range(0..=3) >= 2 && self.player_in_range()
    }

    fn sees_player(&self) -> bool {
        let (Some(me), Some(target)) = (self.life.position(), self.last_player.or_else(|| self.player.position())) else {
            return false;
        };
        match self.stage.map().try_borrow() {
            Ok(map) => line_of_sight(&map, &self.ground, me, target),
            Err(_) => false,
        }
    }

    fn vertical_speed(&self) -> f32 {
        self.life.velocity().map_or(0.0, |v| v.1)
    }

    /// Flies along `angle` at wing power, facing the direction of travel.
    fn fly_along(&self, angle: f32, facing_right: bool) {
        let power = self.wing_power();
        self.life.with_sprite(|sprite| {
            sprite.set_flip_x(facing_right);
            sprite.set_velocity(angle.cos() * power, angle.sin() * power);
        });
    }

    fn cast_dropping(&mut self, angle: f32) {
        let frame = self.clock.frame();
        if self.cast_at > frame {
            return;
        }
        let Some(me) = self.life.position() else {
            return;
        };

        let speed = self.wing_power() * self.config.dropping_speed;
        let launch = Launch {
            kind: "dropping",
            position: (me.0 + DROPPING_OFFSET.0, me.1 + DROPPING_OFFSET.1),
            velocity: (angle.cos() * speed, angle.sin() * speed),
            ttl_ms: self.config.dropping_ttl_ms.sample(&mut self.rng),
            scale: DROPPING_SCALE,
        };
        if let Err(err) = Projectile::launch(&self.stage, launch) {
            error!(target: "creature", "{}: dropping failed: {}", self.life.name(), err);
            return;
        }
        self.cast_at = frame + self.config.cooldown_frames.sample(&mut self.rng);
    }

    //--- Hovering Hooks ---------------------------------------------------

    fn idle_enter(&mut self, _flow: &mut Flow<FlyState>) {
        self.life.play("idle");
        self.direction = -1;
        self.elapsed_ms = 0.0;
    }

    fn idle_update(&mut self, flow: &mut Flow<FlyState>, dt_ms: f32) {
        self.elapsed_ms += dt_ms;
        if self.player.is_present() && self.target_ms / 2.0 < self.elapsed_ms {
            if self.player_in_range() {
                flow.set_state(FlyState::MoveToPlayer);
                return;
            }
            flow.set_state(FlyState::Rise);
        }
        if self.elapsed_ms > self.target_ms {
            self.target_ms = IDLE_MS.sample(&mut self.rng);
            flow.set_state(FlyState::Rise);
        }
    }

    fn rise_enter(&mut self, _flow: &mut Flow<FlyState>) {
        self.life.play("flying");
        self.elapsed_ms = 0.0;
        self.direction = 0;
        let lift = -self.wing_power();
        self.life.with_sprite(|sprite| sprite.set_velocity_y(lift));
    }

    fn rise_update(&mut self, flow: &mut Flow<FlyState>, dt_ms: f32) {
        self.elapsed_ms += dt_ms;
        let lift = -self.wing_power();
        self.life.with_sprite(|sprite| sprite.set_velocity_y(lift));

        if self.wants_dive() {
            flow.set_state(FlyState::MoveToPlayer);
            return;
        }
        if self.elapsed_ms > self.target_ms {
            flow.set_state(FlyState::Sink);
            self.target_ms = RISE_MS.sample(&mut self.rng);
        }
    }

    fn sink_enter(&mut self, _flow: &mut Flow<FlyState>) {
        self.life.play("flying");
        self.elapsed_ms = 0.0;
        self.direction = 1;
    }

    fn sink_update(&mut self, flow: &mut Flow<FlyState>, dt_ms: f32) {
        self.elapsed_ms += dt_ms;
        let fall = 4.0 * self.wing_power();
        self.life.with_sprite(|sprite| sprite.set_velocity_y(fall));

        if self.wants_dive() {
            flow.set_state(FlyState::MoveToPlayer);
            return;
        }
        if self.elapsed_ms > self.target_ms {
            flow.set_state(FlyState::Rise);
            self.target_ms = SINK_MS.sample(&mut self.rng);
        }
    }

    //--- Attack Hooks -----------------------------------------------------

    fn dive_enter(&mut self, _flow: &mut Flow<FlyState>) {
        self.elapsed_ms = 0.0;
        self.direction = 0;
        self.last_bounds = self.player.bounds();
        self.life.play("flying");
    }

    fn dive_update(&mut self, flow: &mut Flow<FlyState>, _dt_ms: f32) {
        if !self.player.is_present() {
            return;
        }

        if !self.sees_player() {
            if self.vertical_speed() == 0.0 || self.rng.gen_bool(0.5) {
                flow.set_state(FlyState::Rise);
            } else {
                flow.set_state(FlyState::Sink);
            }
            self.target_ms = RETHINK_MS.sample(&mut self.rng);
            return;
        }

        let (Some(me), Some(target)) = (self.life.position(), self.last_player.or_else(|| self.player.position())) else {
            return;
        };
        self.fly_along(attack_angle(me, target), target.0 - me.0 > 0.0);

        let Some(mine) = self.life.read_sprite(|sprite| sprite.bounds()) else {
            return;
        };
        let hit_last = self.last_bounds.map_or(false, |bounds| bounds.intersects(&mine));
        let hit_now = self.player.bounds().map_or(false, |bounds| bounds.intersects(&mine));
        if hit_last || hit_now {
            flow.set_state(FlyState::ReturnToOrigin);
        }
    }

    fn return_enter(&mut self, _flow: &mut Flow<FlyState>) {
        self.life.play("flying");
        self.elapsed_ms = 0.0;
        if let Some(player) = self.player.position() {
            self.last_player = Some(player);
        }
    }

    fn return_update(&mut self, flow: &mut Flow<FlyState>, _dt_ms: f32) {
        let Some(me) = self.life.position() else {
            return;
        };

        if let Some(target) = self.last_player {
            self.cast_dropping(attack_angle(me, target));
        }

        let home = self.origin;
        self.fly_along(attack_angle(me, home), home.0 - me.0 > 0.0);

        if distance(me, home) < self.config.home_radius {
            flow.set_state(FlyState::Sink);
        }
    }
}

impl Behavior for Fly {
    type State = FlyState;

    const KIND: &'static str = "fly";
    const INITIAL: FlyState = FlyState::Rise;
    const SIGNALS: &'static [Signal] = &[Signal::Stomped, Signal::Blocked, Signal::AnimationComplete, Signal::Timer];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, FlyState>) -> Result<()> {
        fsm.add_state(
            FlyState::Idle,
            StateHooks::new().on_enter(Self::idle_enter).on_update(Self::idle_update),
        )?
        .add_state(
            FlyState::MoveToPlayer,
            StateHooks::new().on_enter(Self::dive_enter).on_update(Self::dive_update),
        )?
        .add_state(
            FlyState::ReturnToOrigin,
            StateHooks::new().on_enter(Self::return_enter).on_update(Self::return_update),
        )?
        .add_state(
            FlyState::Rise,
            StateHooks::new().on_enter(Self::rise_enter).on_update(Self::rise_update),
        )?
        .add_state(
            FlyState::Sink,
            StateHooks::new().on_enter(Self::sink_enter).on_update(Self::sink_update),
        )?
        .add_state(FlyState::Dead, StateHooks::new())?;
        Ok(())
    }

    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()> {
        match event.signal() {
            Signal::Stomped => {
                debug!(target: "creature", "fly {} swatted", brain.body.life.name());
                brain.collapse(FlyState::Dead, "dead");
                let life = &brain.body.life;
                brain
                    .body
                    .stage
                    .scheduler()
                    .after(HIDE_DELAY_MS, Event::timer(life.name(), life.id(), HIDE_TIMER));
            }
            Signal::Timer if event.timer_tag() == Some(HIDE_TIMER) => {
                brain.body.life.with_sprite(|sprite| sprite.set_visible(false));
            }
            Signal::AnimationComplete if brain.is_in(FlyState::Dead) => {
                brain.release();
            }
            Signal::Blocked if !brain.is_in(FlyState::Dead) => {
                brain.body.elapsed_ms = 0.0;
                let next = if brain.body.vertical_speed() > 0.0 {
                    FlyState::Rise
                } else {
                    FlyState::Sink
                };
                brain.go(next);
            }
            _ => {}
        }
        Ok(())
    }

    fn tick(brain: &mut Brain<Self>, dt_ms: f32) {
        brain.drive(dt_ms);
        if let Some(player) = brain.body.player.position() {
            brain.body.last_player = Some(player);
        }
    }
}

impl CreatureBehavior for Fly {
    fn lookahead(brain: &mut Brain<Self>, map: &TileMap) -> bool {
        if brain.is_in(FlyState::Dead) {
            return false;
        }

        let body = &brain.body;
        let probe = body.config.probe_distance;
        let near = body.life.read_sprite(|sprite| {
            let direction = if sprite.velocity().1 > 0.0 { 1.0 } else { -1.0 };
            has_tile_vertical(map, &body.ground, sprite, direction, probe)
        });
        if near != Some(true) {
            return false;
        }

        let next = if brain.body.direction == 1 {
            FlyState::Rise
        } else {
            FlyState::Sink
        };
        brain.go(next);
        true
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
