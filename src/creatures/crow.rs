//=========================================================================
// Crow
//=========================================================================
//
// Slow, long-legged patrol that turns back at the map edges.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::actor::{Actor, Behavior, Brain, CreatureBehavior, Lifecycle};
use super::patrol::{edge_heading, Patrol};
use crate::core::event_bus::{Event, Signal};
use crate::core::stage::Stage;
use crate::core::state_machine::{Flow, StateHooks, StateKey, StateMachine};
use crate::error::Result;
use crate::world::{SpriteRef, TileMap};

//=== States ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrowState {
    Idle,
    MoveLeft,
    MoveRight,
    Dead,
}

impl StateKey for CrowState {}

pub type CrowController = Actor<Crow>;

//=== Crow ================================================================

pub struct Crow {
    life: Lifecycle,
    patrol: Patrol,
}

impl Crow {
    pub fn new(stage: &Stage, sprite: SpriteRef) -> Self {
        let config = &stage.config().crow;
        Self {
            life: Lifecycle::new(sprite),
            patrol: Patrol::new(config.speed, config.turn_after_ms),
        }
    }

    fn idle_enter(&mut self, flow: &mut Flow<CrowState>) {
        self.life.play("idle");
        flow.set_state(CrowState::MoveLeft);
    }

    fn move_enter(&mut self, _flow: &mut Flow<CrowState>) {
        self.patrol.reset();
    }

    fn move_left_update(&mut self, flow: &mut Flow<CrowState>, dt_ms: f32) {
        if self.patrol.step(&self.life, false, dt_ms) {
            flow.set_state(CrowState::MoveRight);
        }
    }

    fn move_right_update(&mut self, flow: &mut Flow<CrowState>, dt_ms: f32) {
        if self.patrol.step(&self.life, true, dt_ms) {
            flow.set_state(CrowState::MoveLeft);
        }
    }
}

impl Behavior for Crow {
    type State = CrowState;

    const KIND: &'static str = "crow";
    const INITIAL: CrowState = CrowState::Idle;
    const SIGNALS: &'static [Signal] = &[Signal::Stomped, Signal::Blocked, Signal::AnimationComplete];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, CrowState>) -> Result<()> {
        fsm.add_state(CrowState::Idle, StateHooks::new().on_enter(Self::idle_enter))?
            .add_state(
                CrowState::MoveLeft,
                StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_left_update),
            )?
            .add_state(
                CrowState::MoveRight,
                StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_right_update),
            )?
            .add_state(CrowState::Dead, StateHooks::new())?;
        Ok(())
    }

    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()> {
        match event.signal() {
            Signal::Stomped => brain.collapse(CrowState::Dead, "dead"),
            Signal::AnimationComplete if brain.is_in(CrowState::Dead) => {
                brain.release();
            }
            Signal::Blocked if !brain.is_in(CrowState::Dead) => {
                brain.body.patrol.reset();
                let next = if brain.body.life.facing_right() {
                    CrowState::MoveLeft
                } else {
                    CrowState::MoveRight
                };
                brain.go(next);
            }
            _ => {}
        }
        Ok(())
    }
}

impl CreatureBehavior for Crow {
    fn lookahead(brain: &mut Brain<Self>, map: &TileMap) -> bool {
        if brain.is_in(CrowState::Dead) {
            return false;
        }
        let Some((x, width)) = brain.body.life.read_sprite(|s| (s.x(), s.width())) else {
            return false;
        };

        match edge_heading(x, width, map.width_in_pixels(), width) {
            Some(true) => brain.go(CrowState::MoveRight),
            Some(false) => brain.go(CrowState::MoveLeft),
            None => {}
        }
        false
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
