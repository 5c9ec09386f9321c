//=========================================================================
// Bat
//=========================================================================
//
// Flies left and right on a fixed timer while bobbing vertically.
//
//   Idle ──enter──> MoveLeft <──2000 ms / blocked──> MoveRight
//                        └──────── stomped ────────> Dead ──clip done──> released
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::actor::{Actor, Behavior, Brain, CreatureBehavior, Lifecycle};
use super::patrol::Patrol;
use crate::config::BatConfig;
use crate::core::event_bus::{Event, Signal};
use crate::core::stage::Stage;
use crate::core::state_machine::{Flow, StateHooks, StateKey, StateMachine};
use crate::error::Result;
use crate::world::SpriteRef;

//=== States ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatState {
    Idle,
    MoveLeft,
    MoveRight,
    Dead,
}

impl StateKey for BatState {}

pub type BatController = Actor<Bat>;

//=== Bob =================================================================

/// Vertical oscillation layered on top of the patrol.
#[derive(Debug, Clone)]
struct Bob {
    speed: f32,
    range: f32,
    flip_ms: f32,
    timer: f32,
    direction: f32,
}

impl Bob {
    fn new(config: &BatConfig) -> Self {
        Self {
            speed: config.bob_speed,
            range: config.bob_range,
            flip_ms: config.bob_flip_ms,
            timer: 0.0,
            direction: -1.0,
        }
    }

    /// Vertical velocity for this frame.
    fn step(&mut self, dt_ms: f32, move_time: f32) -> f32 {
        self.timer += dt_ms;
        if self.timer >= self.flip_ms {
            self.direction = -self.direction;
            self.timer = 0.0;
        }
        self.direction * self.range * (move_time / 1000.0 * self.speed).sin()
    }
}

//=== Bat =================================================================

pub struct Bat {
    life: Lifecycle,
    patrol: Patrol,
    bob: Bob,
}

impl Bat {
    pub fn new(stage: &Stage, sprite: SpriteRef) -> Self {
        let config = &stage.config().bat;
        let speed = config.speed.sample(&mut stage.rng());

        Self {
            life: Lifecycle::new(sprite),
            patrol: Patrol::new(speed, config.turn_after_ms),
            bob: Bob::new(config),
        }
    }

    pub fn speed(&self) -> f32 {
        self.patrol.speed
    }

    //--- Hooks ------------------------------------------------------------

    fn idle_enter(&mut self, flow: &mut Flow<BatState>) {
        self.life.play("idle");
        flow.set_state(BatState::MoveLeft);
    }

    fn move_enter(&mut self, _flow: &mut Flow<BatState>) {
        self.patrol.reset();
    }

    fn move_left_update(&mut self, flow: &mut Flow<BatState>, dt_ms: f32) {
        if self.patrol.step(&self.life, false, dt_ms) {
            flow.set_state(BatState::MoveRight);
        }
    }

    fn move_right_update(&mut self, flow: &mut Flow<BatState>, dt_ms: f32) {
        if self.patrol.step(&self.life, true, dt_ms) {
            flow.set_state(BatState::MoveLeft);
        }
    }
}

impl Behavior for Bat {
    type State = BatState;

    const KIND: &'static str = "bat";
    const INITIAL: BatState = BatState::Idle;
    const SIGNALS: &'static [Signal] = &[Signal::Stomped, Signal::Blocked, Signal::AnimationComplete];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, BatState>) -> Result<()> {
        fsm.add_state(BatState::Idle, StateHooks::new().on_enter(Self::idle_enter))?
            .add_state(
                BatState::MoveLeft,
                StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_left_update),
            )?
            .add_state(
                BatState::MoveRight,
                StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_right_update),
            )?
            .add_state(BatState::Dead, StateHooks::new())?;
        Ok(())
    }

    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()> {
        match event.signal() {
            Signal::Stomped => {
                debug!(target: "creature", "bat {} stomped", brain.body.life.name());
                brain.collapse(BatState::Dead, "dead");
            }
            Signal::AnimationComplete if brain.is_in(BatState::Dead) => {
                brain.release();
            }
            Signal::Blocked if !brain.is_in(BatState::Dead) => {
                brain.body.patrol.reset();
                let next = if brain.body.life.facing_right() {
                    BatState::MoveLeft
                } else {
                    BatState::MoveRight
                };
                brain.go(next);
            }
            _ => {}
        }
        Ok(())
    }

    fn tick(brain: &mut Brain<Self>, dt_ms: f32) {
        brain.drive(dt_ms);
        if brain.is_in(BatState::Dead) {
            return;
        }

        let body = &mut brain.body;
        let vy = body.bob.step(dt_ms, body.patrol.move_time());
        body.life.with_sprite(|sprite| sprite.set_velocity_y(vy));
    }
}

impl CreatureBehavior for Bat {}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{Controller, Creature};
    use crate::creatures::fixtures;

    fn spawn() -> (Stage, BatController) {
        let stage = fixtures::open_stage();
        let sprite = fixtures::sprite(&stage, "bat-1", 320.0, 100.0);
        let bat = Actor::new(&stage, Bat::new(&stage, sprite)).unwrap();
        (stage, bat)
    }

    //--- Patrol -----------------------------------------------------------

    #[test]
    fn idle_chains_into_move_left() {
        let (_stage, bat) = spawn();
        assert_eq!(bat.state(), Some(BatState::MoveLeft));
        assert_eq!(fixtures::clip(&bat), Some("idle".to_string()));
    }

    #[test]
    fn speed_is_drawn_from_configured_range() {
        let (_stage, bat) = spawn();
        let speed = bat.inspect(Bat::speed).unwrap();
        assert!((5.0..=8.0).contains(&speed));
    }

    #[test]
    fn turns_after_two_seconds() {
        let (_stage, mut bat) = spawn();

        for _ in 0..4 {
            bat.update(500.0);
        }
        assert_eq!(bat.state(), Some(BatState::MoveLeft));

        bat.update(1.0);
        assert_eq!(bat.state(), Some(BatState::MoveRight));
    }

    #[test]
    fn moving_left_faces_left() {
        let (_stage, mut bat) = spawn();
        bat.update(16.0);

        let sprite = bat.sprite().unwrap();
        let sprite = sprite.borrow();
        assert!(!sprite.flip_x());
        assert!(sprite.velocity().0 < 0.0);
    }

    #[test]
    fn blocked_reverses_direction() {
        let (stage, mut bat) = spawn();
        bat.update(16.0);

        fixtures::hit(&stage, &bat, Signal::Blocked);
        assert_eq!(bat.state(), Some(BatState::MoveRight));
    }

    //--- Defeat -----------------------------------------------------------

    #[test]
    fn stomp_then_clip_releases_bat() {
        let (stage, mut bat) = spawn();
        let sprite = bat.sprite().unwrap();

        fixtures::hit(&stage, &bat, Signal::Stomped);
        assert_eq!(bat.state(), Some(BatState::Dead));
        assert!(sprite.borrow().is_static());
        assert_eq!(sprite.borrow().collision_category(), 0);
        assert!(bat.keep_object());

        fixtures::finish(&stage, &bat, "dead");
        assert!(!bat.keep_object());
        assert!(!sprite.borrow().is_active());
        assert!(bat.sprite().is_none());
        assert_eq!(stage.bus().topic_count(), 0);

        bat.update(16.0);
        bat.destroy();
    }

    #[test]
    fn blocked_is_ignored_once_dead() {
        let (stage, bat) = spawn();
        fixtures::hit(&stage, &bat, Signal::Stomped);
        fixtures::hit(&stage, &bat, Signal::Blocked);
        assert_eq!(bat.state(), Some(BatState::Dead));
    }

    #[test]
    fn events_for_other_names_are_ignored() {
        let (stage, bat) = spawn();
        let other = fixtures::sprite(&stage, "bat-2", 0.0, 0.0);
        let _other = Actor::new(&stage, Bat::new(&stage, other)).unwrap();

        let event = Event::contact(
            "bat-1",
            Signal::Stomped,
            crate::world::EntityId(9999),
            fixtures::PLAYER_ID,
            crate::world::BodyLabel::Player,
        );
        stage.bus().emit(&event);
        assert_eq!(bat.state(), Some(BatState::MoveLeft));
    }
}
