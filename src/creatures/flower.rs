//=========================================================================
// Flower
//=========================================================================
//
// Decorative creature that wilts when stomped.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::actor::{Actor, Behavior, Brain, CreatureBehavior, Lifecycle};
use crate::core::event_bus::{Event, Signal};
use crate::core::stage::Stage;
use crate::core::state_machine::{Flow, StateHooks, StateKey, StateMachine};
use crate::error::Result;
use crate::world::SpriteRef;

//=== States ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowerState {
    Idle,
    Dead,
}

impl StateKey for FlowerState {}

pub type FlowerController = Actor<Flower>;

//=== Flower ==============================================================

pub struct Flower {
    life: Lifecycle,
}

impl Flower {
    pub fn new(_stage: &Stage, sprite: SpriteRef) -> Self {
        Self {
            life: Lifecycle::new(sprite),
        }
    }

    fn idle_enter(&mut self, _flow: &mut Flow<FlowerState>) {
        self.life.play("idle");
    }
}

impl Behavior for Flower {
    type State = FlowerState;

    const KIND: &'static str = "flower";
    const INITIAL: FlowerState = FlowerState::Idle;
    const SIGNALS: &'static [Signal] = &[Signal::Stomped, Signal::AnimationComplete];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, FlowerState>) -> Result<()> {
        fsm.add_state(FlowerState::Idle, StateHooks::new().on_enter(Self::idle_enter))?
            .add_state(FlowerState::Dead, StateHooks::new())?;
        Ok(())
    }

    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()> {
        match event.signal() {
            Signal::Stomped => brain.collapse(FlowerState::Dead, "dead"),
            Signal::AnimationComplete if brain.is_in(FlowerState::Dead) => {
                brain.release();
            }
            _ => {}
        }
        Ok(())
    }
}

impl CreatureBehavior for Flower {}

//=========================================================================
// Unit Tests
//=========================================================================
