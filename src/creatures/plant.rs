//=========================================================================
// Plant
//=========================================================================
//
// Rooted creature that sprouts the first time the player brushes it.
//
//   Idle (`wait`) ──touch──> Grow ──`grow` done──> Idle (`idle`)
//   stomp before growing ──> Grow ──`grow` done──> Dead
//   stomp after growing  ──> Dead ──`dead` done──> released
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::actor::{Actor, Behavior, Brain, CreatureBehavior, Lifecycle};
use crate::core::event_bus::{Event, Signal};
use crate::core::stage::Stage;
use crate::core::state_machine::{Flow, StateHooks, StateKey, StateMachine};
use crate::error::Result;
use crate::world::SpriteRef;

//=== States ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlantState {
    Idle,
    Grow,
    Dead,
}

impl StateKey for PlantState {}

pub type PlantController = Actor<Plant>;

//=== Plant ===============================================================

pub struct Plant {
    life: Lifecycle,
    touched: bool,
    doomed: bool,
}

impl Plant {
    pub fn new(_stage: &Stage, sprite: SpriteRef) -> Self {
        Self {
            life: Lifecycle::new(sprite),
            touched: false,
            doomed: false,
        }
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    //--- State Hooks ------------------------------------------------------

    fn idle_enter(&mut self, _flow: &mut Flow<PlantState>) {
        self.life.play(if self.touched { "idle" } else { "wait" });
    }

    fn grow_enter(&mut self, _flow: &mut Flow<PlantState>) {
        self.life.play("grow");
    }

    fn dead_enter(&mut self, _flow: &mut Flow<PlantState>) {
        self.life.play("dead");
    }
}

impl Behavior for Plant {
    type State = PlantState;

    const KIND: &'static str = "plant";
    const INITIAL: PlantState = PlantState::Idle;
    const SIGNALS: &'static [Signal] = &[Signal::Stomped, Signal::Touched, Signal::AnimationComplete];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, PlantState>) -> Result<()> {
        fsm.add_state(PlantState::Idle, StateHooks::new().on_enter(Self::idle_enter))?
            .add_state(PlantState::Grow, StateHooks::new().on_enter(Self::grow_enter))?
            .add_state(PlantState::Dead, StateHooks::new().on_enter(Self::dead_enter))?;
        Ok(())
    }

    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()> {
        match event.signal() {
            Signal::Stomped => {
                brain.unsubscribe(Signal::Stomped);
                brain.unsubscribe(Signal::Touched);
                brain.body.life.with_sprite(|sprite| sprite.set_collision_category(0));
                if brain.body.touched {
                    brain.go(PlantState::Dead);
                } else {
                    brain.body.touched = true;
                    brain.body.doomed = true;
                    brain.go(PlantState::Grow);
                }
            }
            Signal::Touched if !brain.body.touched => {
                debug!(target: "creature", "{} sprouts", brain.body.life.name());
                brain.unsubscribe(Signal::Touched);
                brain.body.touched = true;
                brain.go(PlantState::Grow);
            }
            Signal::AnimationComplete if brain.is_in(PlantState::Grow) && event.clip() == Some("grow") => {
                let next = if brain.body.doomed { PlantState::Dead } else { PlantState::Idle };
                brain.go(next);
            }
            Signal::AnimationComplete if brain.is_in(PlantState::Dead) && event.clip() == Some("dead") => {
                brain.release();
            }
            _ => {}
        }
        Ok(())
    }
}

impl CreatureBehavior for Plant {}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{Controller, Creature};
    use crate::creatures::fixtures;

    fn spawn(stage: &Stage) -> PlantController {
        let sprite = fixtures::sprite(stage, "plant-1", 320.0, 160.0);
        Actor::new(stage, Plant::new(stage, sprite)).unwrap()
    }

    #[test]
    fn waits_until_touched() {
        let stage = fixtures::open_stage();
        let plant = spawn(&stage);
        assert_eq!(fixtures::clip(&plant), Some("wait".to_string()));

        fixtures::hit(&stage, &plant, Signal::Touched);
        assert_eq!(plant.state(), Some(PlantState::Grow));
        assert_eq!(fixtures::clip(&plant), Some("grow".to_string()));

        fixtures::finish(&stage, &plant, "grow");
        assert_eq!(plant.state(), Some(PlantState::Idle));
        assert_eq!(fixtures::clip(&plant), Some("idle".to_string()));
    }

    #[test]
    fn grows_only_once() {
        let stage = fixtures::open_stage();
        let plant = spawn(&stage);
        fixtures::hit(&stage, &plant, Signal::Touched);
        fixtures::finish(&stage, &plant, "grow");

        assert_eq!(fixtures::hit(&stage, &plant, Signal::Touched), 0);
        assert_eq!(plant.state(), Some(PlantState::Idle));
    }

    #[test]
    fn stomp_on_seedling_grows_then_dies() {
        let stage = fixtures::open_stage();
        let plant = spawn(&stage);

        fixtures::hit(&stage, &plant, Signal::Stomped);
        assert_eq!(plant.state(), Some(PlantState::Grow));
        assert_eq!(plant.sprite().unwrap().borrow().collision_category(), 0);

        fixtures::finish(&stage, &plant, "grow");
        assert_eq!(plant.state(), Some(PlantState::Dead));

        fixtures::finish(&stage, &plant, "dead");
        assert!(!plant.keep_object());
    }

    #[test]
    fn stomp_on_grown_plant_dies_at_once() {
        let stage = fixtures::open_stage();
        let plant = spawn(&stage);
        fixtures::hit(&stage, &plant, Signal::Touched);
        fixtures::finish(&stage, &plant, "grow");

        fixtures::hit(&stage, &plant, Signal::Stomped);
        assert_eq!(plant.state(), Some(PlantState::Dead));
        assert_eq!(fixtures::clip(&plant), Some("dead".to_string()));
    }
}
