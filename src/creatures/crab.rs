//=========================================================================
// Crab
//=========================================================================
//
// Patrolling crab that notices the player and escalates.
//
// State Graph:
//   Idle ──> MoveLeft <──leg over──> MoveRight
//   Paused ──> reverse, Dash ──> onward
//                    │
//                    └─ aggro check (every 400 ms, within 3 tiles)
//                          ├─ player running  ──> Attack
//                          ├─ player above/below ──> Idle
//                          └─ otherwise ──> Follow
//
//   Follow <──> Evade ──> Attack by distance rings:
//     < 96 attack, < 128 evade, < 256 follow, beyond gives up.
//
// Strength: one stomp kills a patrolling crab. Entering Attack raises
// strength to the remaining attack power, and every stomp lowers both.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;
use rand::rngs::StdRng;

//=== Internal Dependencies ===============================================

use super::actor::{Actor, Behavior, Brain, CreatureBehavior, Lifecycle};
use super::proximity::{distance, linear, vertical_gap, PlayerTracker};
use super::terrain::has_tile_ahead;
use crate::config::CrabConfig;
use crate::core::event_bus::{Event, Signal};
use crate::core::stage::Stage;
use crate::core::state_machine::{Flow, StateHooks, StateKey, StateMachine};
use crate::error::Result;
use crate::world::{SpriteRef, TileMap};

//=== States ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrabState {
    Idle,
    MoveLeft,
    MoveRight,
    Paused,
    Dash,
    Attack,
    Follow,
    Evade,
    Dead,
}

impl StateKey for CrabState {}

impl CrabState {
    /// States in which the periodic aggro check stays quiet.
    fn is_engaged(self) -> bool {
        matches!(self, Self::Attack | Self::Follow | Self::Evade | Self::Dead)
    }
}

/// Marker shown above an engaged crab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrabIcon {
    Beware,
    Star,
}

pub type CrabController = Actor<Crab>;

//=== Crab ================================================================

pub struct Crab {
    life: Lifecycle,
    config: CrabConfig,
    player: PlayerTracker,
    ground: String,
    rng: StdRng,
    aggro_range: f32,

    elapsed_ms: f32,
    leg_ms: f32,
    phase_ms: f32,
    aggro_ms: f32,

    strength: u32,
    attack_power: u32,
    icon: Option<CrabIcon>,
}

impl Crab {
    pub fn new(stage: &Stage, sprite: SpriteRef) -> Self {
        let config = stage.config().crab.clone();
        let mut rng = stage.rng();
        let leg_ms = config.first_turn_ms.sample(&mut rng);
        let aggro_range = config.aggro_tiles * stage.map().borrow().tile_width() as f32;
        let attack_power = config.attack_power;

        Self {
            life: Lifecycle::new(sprite),
            config,
            player: PlayerTracker::new(stage.player()),
            ground: stage.ground_layer().to_string(),
            rng,
            aggro_range,
            elapsed_ms: 0.0,
            leg_ms,
            phase_ms: 0.0,
            aggro_ms: 0.0,
            strength: 1,
            attack_power,
            icon: None,
        }
    }

    pub fn strength(&self) -> u32 {
        self.strength
    }

    pub fn attack_power(&self) -> u32 {
        self.attack_power
    }

    pub fn icon(&self) -> Option<CrabIcon> {
        self.icon
    }

    //--- Decisions --------------------------------------------------------

    /// State the aggro check asks for, if the player is close enough.
    fn aggro(&self, current: Option<CrabState>) -> Option<CrabState> {
        if current.map_or(true, CrabState::is_engaged) {
            return None;
        }

        let me = self.life.position()?;
        let player = self.player.position()?;
        if distance(me, player) >= self.aggro_range {
            return None;
        }

        let running = self.player.velocity().map_or(0.0, |v| v.0.abs());
        Some(if running > self.config.aggro_player_speed {
            CrabState::Attack
        } else if vertical_gap(me, player) > self.config.vertical_tolerance {
            CrabState::Idle
        } else {
            CrabState::Follow
        })
    }

    /// Picks what to do once a leg ends: aggro if the player is close,
    /// otherwise turn around for a fresh leg.
    fn slumber(&mut self, current: Option<CrabState>) -> Option<CrabState> {
        if self.life.sprite().is_none() {
            return None;
        }
        if let Some(state) = self.aggro(current) {
            return Some(state);
        }

        let next = self.reverse();
        self.leg_ms = self.config.turn_ms.sample(&mut self.rng);
        self.icon = None;
        Some(next)
    }

    fn reverse(&self) -> CrabState {
        if self.life.facing_right() {
            CrabState::MoveLeft
        } else {
            CrabState::MoveRight
        }
    }

    fn onward(&self) -> CrabState {
        if self.life.facing_right() {
            CrabState::MoveRight
        } else {
            CrabState::MoveLeft
        }
    }

    fn take_stomp(&mut self) -> bool {
        self.attack_power = self.attack_power.saturating_sub(1);
        self.strength = self.strength.saturating_sub(1);
        self.strength == 0
    }

    //--- Patrol Hooks -----------------------------------------------------

    fn idle_enter(&mut self, flow: &mut Flow<CrabState>) {
        self.life.play("idle");
        flow.set_state(self.reverse());
    }

    fn move_enter(&mut self, _flow: &mut Flow<CrabState>) {
        self.elapsed_ms = 0.0;
        self.life.play("idle");
    }

    fn move_update(&mut self, flow: &mut Flow<CrabState>, dt_ms: f32, facing_right: bool) {
        self.elapsed_ms += dt_ms;
        self.life.walk(facing_right, self.config.walk_speed);

        if self.elapsed_ms > self.leg_ms {
            if let Some(next) = self.slumber(flow.current()) {
                flow.set_state(next);
            }
        }
    }

    fn move_left_update(&mut self, flow: &mut Flow<CrabState>, dt_ms: f32) {
        self.move_update(flow, dt_ms, false);
    }

    fn move_right_update(&mut self, flow: &mut Flow<CrabState>, dt_ms: f32) {
        self.move_update(flow, dt_ms, true);
    }

    fn paused_enter(&mut self, _flow: &mut Flow<CrabState>) {
        self.elapsed_ms = 0.0;
        self.phase_ms = self.config.pause_ms.sample(&mut self.rng);
        self.life.play("paused");
        self.life.with_sprite(|sprite| sprite.set_velocity_x(0.0));
    }

    fn paused_update(&mut self, flow: &mut Flow<CrabState>, dt_ms: f32) {
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms > self.phase_ms {
            flow.set_state(self.reverse());
        }
    }

    fn dash_enter(&mut self, _flow: &mut Flow<CrabState>) {
        self.elapsed_ms = 0.0;
        self.phase_ms = self.config.dash_ms.sample(&mut self.rng);
        self.life.play("dash");
        let back = !self.life.facing_right();
        self.life.with_sprite(|sprite| sprite.set_flip_x(back));
    }

    fn dash_update(&mut self, flow: &mut Flow<CrabState>, dt_ms: f32) {
        self.elapsed_ms += dt_ms;
        self.life.walk(self.life.facing_right(), self.config.dash_speed);

        if self.elapsed_ms > self.phase_ms {
            flow.set_state(self.onward());
        }
    }

    //--- Engagement Hooks -------------------------------------------------

    fn attack_enter(&mut self, _flow: &mut Flow<CrabState>) {
        self.elapsed_ms = 0.0;
        self.strength = self.attack_power;
        self.phase_ms = self.config.attack_ms.sample(&mut self.rng);
        if self.icon.is_none() {
            self.icon = Some(CrabIcon::Beware);
        }
        debug!(target: "creature", "{} attacks (strength {})", self.life.name(), self.strength);
    }

    fn attack_update(&mut self, flow: &mut Flow<CrabState>, dt_ms: f32) {
        if let (Some(me), Some(player)) = (self.life.position(), self.player.position()) {
            let length = distance(me, player);
            if length > 0.0 {
                let heading = (player.0 - me.0) / length;
                let speed = heading * self.config.attack_speed;
                self.life.with_sprite(|sprite| {
                    sprite.set_flip_x(heading > 0.0);
                    sprite.set_velocity_x(speed);
                });
            }
        }

        self.elapsed_ms += dt_ms;
        if self.elapsed_ms > self.phase_ms {
            flow.set_state(CrabState::Idle);
        }
    }

    fn engaged_exit(&mut self, _flow: &mut Flow<CrabState>) {
        self.icon = None;
    }

    fn follow_enter(&mut self, _flow: &mut Flow<CrabState>) {
        self.elapsed_ms = 0.0;
        self.life.play("calm");
        if self.icon.is_none() {
            self.icon = Some(CrabIcon::Star);
        }
    }

    fn follow_update(&mut self, flow: &mut Flow<CrabState>, dt_ms: f32) {
        let (Some(me), Some(player)) = (self.life.position(), self.player.position()) else {
            return;
        };

        self.elapsed_ms += dt_ms;
        if vertical_gap(me, player) > self.config.vertical_tolerance {
            self.life.play("dash");
            if self.elapsed_ms > self.config.follow_giveup_ms {
                flow.set_state(CrabState::Idle);
            }
            return;
        }

        let d = distance(me, player);
        let toward = player.0 > me.0;
        let mut magnitude = 1.5;
        if d <= self.config.approach_radius {
            magnitude = linear(3.0, 0.0, d / self.config.approach_radius);
            if magnitude < 1.0 {
                self.life.play("dash");
            }
        } else if d > self.config.follow_radius {
            flow.set_state(CrabState::Idle);
        }
        self.life.walk(toward, magnitude);

        if d < self.config.evade_radius {
            flow.set_state(CrabState::Evade);
        }
        if d < self.config.attack_radius {
            flow.set_state(CrabState::Attack);
        }
    }

    fn evade_enter(&mut self, _flow: &mut Flow<CrabState>) {
        self.elapsed_ms = 0.0;
        self.life.play("idle");
    }

    fn evade_update(&mut self, flow: &mut Flow<CrabState>, _dt_ms: f32) {
        let (Some(me), Some(player)) = (self.life.position(), self.player.position()) else {
            return;
        };
        if vertical_gap(me, player) > self.config.vertical_tolerance {
            return;
        }

        let d = distance(me, player);
        let away = player.0 <= me.0;
        let mut magnitude = 2.0;
        if d < self.config.follow_radius {
            magnitude = linear(0.0, 7.0, d / self.config.follow_radius);
        } else {
            flow.set_state(CrabState::Follow);
        }
        if d < self.config.attack_radius {
            flow.set_state(CrabState::Attack);
        }
        self.life.walk(away, magnitude);
    }
}

impl Behavior for Crab {
    type State = CrabState;

    const KIND: &'static str = "crab";
    const INITIAL: CrabState = CrabState::Idle;
    const SIGNALS: &'static [Signal] = &[Signal::Stomped, Signal::Blocked, Signal::AnimationComplete];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, CrabState>) -> Result<()> {
        fsm.add_state(CrabState::Idle, StateHooks::new().on_enter(Self::idle_enter))?
            .add_state(
                CrabState::MoveLeft,
                StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_left_update),
            )?
            .add_state(
                CrabState::MoveRight,
                StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_right_update),
            )?
            .add_state(
                CrabState::Paused,
                StateHooks::new().on_enter(Self::paused_enter).on_update(Self::paused_update),
            )?
            .add_state(
                CrabState::Dash,
                StateHooks::new().on_enter(Self::dash_enter).on_update(Self::dash_update),
            )?
            .add_state(
                CrabState::Attack,
                StateHooks::new()
                    .on_enter(Self::attack_enter)
                    .on_update(Self::attack_update)
                    .on_exit(Self::engaged_exit),
            )?
            .add_state(
                CrabState::Follow,
                StateHooks::new()
                    .on_enter(Self::follow_enter)
                    .on_update(Self::follow_update)
                    .on_exit(Self::engaged_exit),
            )?
            .add_state(
                CrabState::Evade,
                StateHooks::new().on_enter(Self::evade_enter).on_update(Self::evade_update),
            )?
            .add_state(CrabState::Dead, StateHooks::new())?;
        Ok(())
    }

    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()> {
        match event.signal() {
            Signal::Stomped => {
                if !brain.body.take_stomp() {
                    debug!(target: "creature", "{} shrugs off a stomp", brain.body.life.name());
                    return Ok(());
                }
                brain.go(CrabState::Dead);
                brain.unsubscribe(Signal::Stomped);
                brain.body.icon = None;
                brain.body.life.play("dead");
            }
            Signal::AnimationComplete if brain.is_in(CrabState::Dead) => {
                brain.release();
            }
            Signal::Blocked if !brain.is_in(CrabState::Dead) => {
                let current = brain.state();
                if let Some(next) = brain.body.slumber(current) {
                    brain.go(next);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn tick(brain: &mut Brain<Self>, dt_ms: f32) {
        brain.drive(dt_ms);

        brain.body.aggro_ms += dt_ms;
        if brain.body.aggro_ms > brain.body.config.aggro_interval_ms {
            brain.body.aggro_ms = 0.0;
            if let Some(next) = brain.body.aggro(brain.state()) {
                brain.go(next);
            }
        }
    }
}

impl CreatureBehavior for Crab {
    fn lookahead(brain: &mut Brain<Self>, map: &TileMap) -> bool {
        if brain.is_in(CrabState::Dead) {
            return false;
        }

        let body = &brain.body;
        let ledge = body.life.read_sprite(|sprite| {
            !has_tile_ahead(map, &body.ground, sprite, true, 0.0) && sprite.velocity().1 == 0.0
        });
        if ledge != Some(true) {
            return false;
        }

        let current = brain.state();
        if let Some(next) = brain.body.slumber(current) {
            brain.go(next);
        }
        true
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
