//=========================================================================
// Water
//=========================================================================
//
// Animated water surface. No signals; it only loops its clip.
//
//=========================================================================

use super::actor::{Actor, Behavior, Brain, Lifecycle};
use crate::core::event_bus::{Event, Signal};
use crate::core::stage::Stage;
use crate::core::state_machine::{Flow, StateHooks, StateKey, StateMachine};
use crate::error::Result;
use crate::world::SpriteRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterState {
    Idle,
}

impl StateKey for WaterState {}

pub type WaterController = Actor<Water>;

pub struct Water {
    life: Lifecycle,
}

impl Water {
    pub fn new(_stage: &Stage, sprite: SpriteRef) -> Self {
        Self {
            life: Lifecycle::new(sprite),
        }
    }

    fn idle_enter(&mut self, _flow: &mut Flow<WaterState>) {
        self.life.play("idle");
    }
}

impl Behavior for Water {
    type State = WaterState;

    const KIND: &'static str = "water";
    const INITIAL: WaterState = WaterState::Idle;
    const SIGNALS: &'static [Signal] = &[];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, WaterState>) -> Result<()> {
        fsm.add_state(WaterState::Idle, StateHooks::new().on_enter(Self::idle_enter))?;
        Ok(())
    }

    fn on_signal(_brain: &mut Brain<Self>, _event: &Event) -> Result<()> {
        Ok(())
    }
}
