//=========================================================================
// Zeppelin
//=========================================================================
//
// Indestructible background patrol. Reverses on walls, map edges and its
// own timer. It never subscribes to stomps, so only a host teardown
// retires it.
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
pub enum ZeppelinState {
    Idle,
    MoveLeft,
    MoveRight,
}

impl StateKey for ZeppelinState {}

pub type ZeppelinController = Actor<Zeppelin>;

//=== Zeppelin ============================================================

pub struct Zeppelin {
    life: Lifecycle,
    patrol: Patrol,
}

impl Zeppelin {
    pub fn new(stage: &Stage, sprite: SpriteRef) -> Self {
        let config = &stage.config().zeppelin;
        let mut rng = stage.rng();
        let speed = config.speed.sample(&mut rng);
        let turn_after_ms = config.turn_after_ms.sample(&mut rng);

        Self {
            life: Lifecycle::new(sprite),
            patrol: Patrol::new(speed, turn_after_ms),
        }
    }

    pub fn patrol(&self) -> &Patrol {
        &self.patrol
    }

    fn idle_enter(&mut self, flow: &mut Flow<ZeppelinState>) {
        flow.set_state(ZeppelinState::MoveLeft);
    }

    fn move_enter(&mut self, _flow: &mut Flow<ZeppelinState>) {
        self.patrol.reset();
    }

    fn move_left_update(&mut self, flow: &mut Flow<ZeppelinState>, dt_ms: f32) {
        if self.patrol.step(&self.life, false, dt_ms) {
            flow.set_state(ZeppelinState::MoveRight);
        }
    }

    fn move_right_update(&mut self, flow: &mut Flow<ZeppelinState>, dt_ms: f32) {
        if self.patrol.step(&self.life, true, dt_ms) {
            flow.set_state(ZeppelinState::MoveLeft);
        }
    }
}

impl Behavior for Zeppelin {
    type State = ZeppelinState;

    const KIND: &'static str = "zeppelin";
    const INITIAL: ZeppelinState = ZeppelinState::Idle;
    const SIGNALS: &'static [Signal] = &[Signal::Blocked];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, ZeppelinState>) -> Result<()> {
        fsm.add_state(ZeppelinState::Idle, StateHooks::new().on_enter(Self::idle_enter))?
            .add_state(
                ZeppelinState::MoveLeft,
                StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_left_update),
            )?
            .add_state(
                ZeppelinState::MoveRight,
                StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_right_update),
            )?;
        Ok(())
    }

    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()> {
        if event.signal() == Signal::Blocked {
            brain.body.patrol.reset();
            let next = if brain.body.life.facing_right() {
                ZeppelinState::MoveLeft
            } else {
                ZeppelinState::MoveRight
            };
            brain.go(next);
        }
        Ok(())
    }
}

impl CreatureBehavior for Zeppelin {
    fn lookahead(brain: &mut Brain<Self>, map: &TileMap) -> bool {
        let Some((x, width)) = brain.body.life.read_sprite(|s| (s.x(), s.width())) else {
            return false;
        };

        match edge_heading(x, width, map.width_in_pixels(), width / 2.0) {
            Some(true) => brain.go(ZeppelinState::MoveRight),
            Some(false) => brain.go(ZeppelinState::MoveLeft),
            None => {}
        }
        false
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

    fn spawn(x: f32) -> (Stage, ZeppelinController) {
        let stage = fixtures::open_stage();
        let sprite = fixtures::sprite(&stage, "zeppelin-1", x, 32.0);
        let zeppelin = Actor::new(&stage, Zeppelin::new(&stage, sprite)).unwrap();
        (stage, zeppelin)
    }

    #[test]
    fn rolls_speed_and_leg_length() {
        let (_stage, zeppelin) = spawn(320.0);
        let (speed, turn) = zeppelin
            .inspect(|z| (z.patrol().speed, z.patrol().turn_after_ms))
            .unwrap();
        assert!((0.5..=2.5).contains(&speed));
        assert!((4000.0..=8000.0).contains(&turn));
    }

    #[test]
    fn ignores_stomps() {
        let (stage, zeppelin) = spawn(320.0);
        assert_eq!(fixtures::hit(&stage, &zeppelin, Signal::Stomped), 0);
        assert_eq!(zeppelin.state(), Some(ZeppelinState::MoveLeft));
    }

    #[test]
    fn right_margin_is_half_width() {
        let (stage, mut zeppelin) = spawn(320.0);
        fixtures::hit(&stage, &zeppelin, Signal::Blocked);
        assert_eq!(zeppelin.state(), Some(ZeppelinState::MoveRight));

        let map = stage.map().borrow();
        fixtures::move_to(&zeppelin, 600.0, 32.0);
        zeppelin.lookahead(&map);
        assert_eq!(zeppelin.state(), Some(ZeppelinState::MoveRight));

        fixtures::move_to(&zeppelin, 620.0, 32.0);
        zeppelin.lookahead(&map);
        assert_eq!(zeppelin.state(), Some(ZeppelinState::MoveLeft));
    }

    #[test]
    fn kept_until_torn_down() {
        let (stage, mut zeppelin) = spawn(320.0);
        for _ in 0..3 {
            fixtures::hit(&stage, &zeppelin, Signal::Stomped);
            zeppelin.update(16.0);
        }
        assert!(zeppelin.keep_object());

        zeppelin.destroy();
        assert!(!zeppelin.keep_object());
        assert!(zeppelin.sprite().is_none());
        zeppelin.update(16.0);
    }
}
