//=========================================================================
// Bomb
//=========================================================================
//
// Wandering bomb that fakes countdowns and detonates when stomped.
//
// Lifecycle:
//   Idle ──timer──> MoveLeft/MoveRight (coin flip, legs alternate)
//   stomp ──> armed: frozen, plays `count`
//   `count` done while armed ──> Dead: clears terrain, plays `boom`
//   `boom` done or fallback timer ──> released (first one wins)
//
// The fake countdown replays `count` at random intervals while the bomb
// is harmless; its completion only sends the bomb back to Idle.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;

//=== Internal Dependencies ===============================================

use super::actor::{Actor, Behavior, Brain, CreatureBehavior, Lifecycle};
use super::explosion::Explosion;
use super::terrain::has_tile_ahead;
use crate::config::BombConfig;
use crate::core::event_bus::{Event, Signal, TimerTag};
use crate::core::scheduler::Scheduler;
use crate::core::stage::Stage;
use crate::core::state_machine::{Flow, StateHooks, StateKey, StateMachine};
use crate::error::Result;
use crate::world::{Rect, SpriteRef, TileMap};

//=== Constants ===========================================================

pub const FALLBACK_TIMER: TimerTag = TimerTag("fallback");

const BLAST_SCALE: f32 = 3.0;

//=== States ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BombState {
    Idle,
    MoveLeft,
    MoveRight,
    Dead,
}

impl StateKey for BombState {}

pub type BombController = Actor<Bomb>;

//=== Bomb ================================================================

pub struct Bomb {
    life: Lifecycle,
    config: BombConfig,
    explosion: Explosion,
    scheduler: Scheduler,
    ground: String,
    rng: StdRng,

    speed: f32,
    elapsed_ms: f32,
    leg_ms: f32,

    fake_elapsed_ms: f32,
    fake_after_ms: f32,
    faking: bool,
    armed: bool,
}

impl Bomb {
    pub fn new(stage: &Stage, sprite: SpriteRef) -> Self {
        let config = stage.config().bomb.clone();
        let mut rng = stage.rng();
        let speed = config.speed.sample(&mut rng);
        let fake_after_ms = config.first_fake_ms.sample(&mut rng);

        Self {
            life: Lifecycle::new(sprite),
            explosion: Explosion::new(stage),
            scheduler: stage.scheduler().clone(),
            ground: stage.ground_layer().to_string(),
            rng,
            speed,
            elapsed_ms: 0.0,
            leg_ms: config.idle_ms.min,
            fake_elapsed_ms: 0.0,
            fake_after_ms,
            faking: false,
            armed: false,
            config,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    fn tick_fake_countdown(&mut self, dt_ms: f32) {
        self.fake_elapsed_ms += dt_ms;
        if self.fake_elapsed_ms > self.fake_after_ms {
            self.life.play("count");
            self.faking = true;
            self.fake_after_ms = self.config.fake_ms.sample(&mut self.rng);
            self.fake_elapsed_ms = 0.0;
        }
    }

    /// Clears the blast footprint: three tiles square below the centre
    /// plus one tile on each flank.
    fn detonate(&self) {
        let Some((x, y)) = self.life.position() else {
            return;
        };
        let left = x - 64.0;

        let mut cleared = self.explosion.clear(Rect::new(left, y, 192.0, 192.0), "explosion3").len();
        cleared += self.explosion.clear(Rect::new(left - 64.0, y, 64.0, 64.0), "explosion1").len();
        cleared += self.explosion.clear(Rect::new(left + 256.0, y, 64.0, 64.0), "explosion4").len();
        info!(target: "creature", "{} detonated, {} tiles cleared", self.life.name(), cleared);
    }

    //--- Hooks ------------------------------------------------------------

    fn idle_enter(&mut self, _flow: &mut Flow<BombState>) {
        self.elapsed_ms = 0.0;
        self.leg_ms = self.config.idle_ms.sample(&mut self.rng);
        self.life.play("idle");
    }

    fn idle_update(&mut self, flow: &mut Flow<BombState>, dt_ms: f32) {
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms > self.leg_ms {
            flow.set_state(if self.rng.gen_bool(0.5) {
                BombState::MoveLeft
            } else {
                BombState::MoveRight
            });
        }
    }

    fn move_enter(&mut self, _flow: &mut Flow<BombState>) {
        self.elapsed_ms = 0.0;
        self.leg_ms = self.config.walk_ms.sample(&mut self.rng);
    }

    fn move_update(&mut self, flow: &mut Flow<BombState>, dt_ms: f32, facing_right: bool) {
        self.elapsed_ms += dt_ms;
        self.life.walk(facing_right, self.speed);
        if self.elapsed_ms > self.leg_ms {
            flow.set_state(if facing_right {
                BombState::MoveLeft
            } else {
                BombState::MoveRight
            });
        }
    }

    fn move_left_update(&mut self, flow: &mut Flow<BombState>, dt_ms: f32) {
        self.move_update(flow, dt_ms, false);
    }

    fn move_right_update(&mut self, flow: &mut Flow<BombState>, dt_ms: f32) {
        self.move_update(flow, dt_ms, true);
    }

    fn dead_enter(&mut self, _flow: &mut Flow<BombState>) {
        self.elapsed_ms = 0.0;
        self.detonate();
        self.life.with_sprite(|sprite| {
            sprite.set_scale(BLAST_SCALE);
            sprite.play("boom");
        });
        self.scheduler.after(
            self.config.fallback_ms,
            Event::timer(self.life.name(), self.life.id(), FALLBACK_TIMER),
        );
    }

    fn reverse(brain: &mut Brain<Self>) {
        brain.body.elapsed_ms = 0.0;
        let next = if brain.body.life.facing_right() {
            BombState::MoveLeft
        } else {
            BombState::MoveRight
        };
        brain.go(next);
    }
}

impl Behavior for Bomb {
    type State = BombState;

    const KIND: &'static str = "bomb";
    const INITIAL: BombState = BombState::Idle;
    const SIGNALS: &'static [Signal] = &[Signal::Stomped, Signal::Blocked, Signal::AnimationComplete, Signal::Timer];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, BombState>) -> Result<()> {
        fsm.add_state(
            BombState::Idle,
            StateHooks::new().on_enter(Self::idle_enter).on_update(Self::idle_update),
        )?
        .add_state(
            BombState::MoveLeft,
            StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_left_update),
        )?
        .add_state(
            BombState::MoveRight,
            StateHooks::new().on_enter(Self::move_enter).on_update(Self::move_right_update),
        )?
        .add_state(BombState::Dead, StateHooks::new().on_enter(Self::dead_enter))?;
        Ok(())
    }

    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()> {
        let dead = brain.is_in(BombState::Dead);
        match event.signal() {
            Signal::Stomped => {
                debug!(target: "creature", "{} armed", brain.body.life.name());
                brain.unsubscribe(Signal::Stomped);
                brain.body.armed = true;
                brain.body.life.freeze();
                brain.body.life.play("count");
            }
            Signal::AnimationComplete if dead && event.clip() == Some("boom") => {
                brain.release();
            }
            Signal::Timer if dead && event.timer_tag() == Some(FALLBACK_TIMER) => {
                brain.release();
            }
            Signal::AnimationComplete if !dead && event.clip() == Some("count") => {
                if brain.body.armed {
                    brain.go(BombState::Dead);
                } else if brain.body.faking {
                    brain.body.faking = false;
                    brain.go(BombState::Idle);
                    brain.body.life.play("idle");
                }
            }
            Signal::Blocked if !dead && !brain.body.armed => Self::reverse(brain),
            _ => {}
        }
        Ok(())
    }

    fn tick(brain: &mut Brain<Self>, dt_ms: f32) {
        if brain.body.armed {
            return;
        }
        brain.drive(dt_ms);
        brain.body.tick_fake_countdown(dt_ms);
    }
}

impl CreatureBehavior for Bomb {
    fn lookahead(brain: &mut Brain<Self>, map: &TileMap) -> bool {
        if brain.is_in(BombState::Dead) || brain.body.armed {
            return false;
        }

        let body = &brain.body;
        let ledge = body.life.read_sprite(|sprite| {
            !has_tile_ahead(map, &body.ground, sprite, true, 0.0) && sprite.velocity().1 == 0.0
        });
        if ledge != Some(true) {
            return false;
        }

        Self::reverse(brain);
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
    use crate::world::GROUND_LAYER;

    fn spawn(stage: &Stage) -> BombController {
        let sprite = fixtures::sprite(stage, "bomb-1", 320.0, 160.0);
        Actor::new(stage, Bomb::new(stage, sprite)).unwrap()
    }

    //--- Wandering --------------------------------------------------------

    #[test]
    fn idles_then_wanders() {
        let stage = fixtures::open_stage();
        let mut bomb = spawn(&stage);
        assert_eq!(bomb.state(), Some(BombState::Idle));

        bomb.update(2300.0);
        let state = bomb.state();
        assert!(state == Some(BombState::MoveLeft) || state == Some(BombState::MoveRight));

        bomb.update(16.0);
        let speed = bomb.inspect(Bomb::speed).unwrap();
        let vx = bomb.sprite().unwrap().borrow().velocity().0;
        assert_eq!(vx.abs(), speed);
        assert!((1.0..=1.75).contains(&speed));
    }

    #[test]
    fn fake_countdown_returns_to_idle() {
        let stage = fixtures::open_stage();
        let mut bomb = spawn(&stage);

        bomb.update(61.0);
        assert_eq!(fixtures::clip(&bomb), Some("count".to_string()));

        fixtures::finish(&stage, &bomb, "count");
        assert_eq!(bomb.state(), Some(BombState::Idle));
        assert_eq!(fixtures::clip(&bomb), Some("idle".to_string()));
        assert!(!bomb.inspect(Bomb::is_armed).unwrap());
    }

    //--- Detonation -------------------------------------------------------

    #[test]
    fn stomp_arms_then_detonates() {
        let stage = fixtures::open_stage();
        let bomb = spawn(&stage);
        let sprite = bomb.sprite().unwrap();

        fixtures::hit(&stage, &bomb, Signal::Stomped);
        assert!(bomb.inspect(Bomb::is_armed).unwrap());
        assert!(sprite.borrow().is_static());
        assert_eq!(fixtures::clip(&bomb), Some("count".to_string()));
        assert_eq!(bomb.state(), Some(BombState::Idle));

        fixtures::finish(&stage, &bomb, "count");
        assert_eq!(bomb.state(), Some(BombState::Dead));
        assert_eq!(fixtures::clip(&bomb), Some("boom".to_string()));
        assert_eq!(sprite.borrow().scale(), 3.0);

        // Columns 3..=6 and 8 of the floor row are gone.
        assert_eq!(stage.map().borrow().tile_count(GROUND_LAYER), 5);
        assert_eq!(
            stage.sounds().drain(),
            vec!["explosion3".to_string(), "explosion1".to_string(), "explosion4".to_string()]
        );
    }

    #[test]
    fn blast_clip_releases_bomb() {
        let stage = fixtures::open_stage();
        let bomb = spawn(&stage);
        fixtures::hit(&stage, &bomb, Signal::Stomped);
        fixtures::finish(&stage, &bomb, "count");

        assert_eq!(stage.scheduler().pending_count(), 1);

        fixtures::finish(&stage, &bomb, "boom");
        assert!(!bomb.keep_object());
        assert!(bomb.sprite().is_none());
        assert_eq!(stage.scheduler().pending_count(), 0);
    }

    #[test]
    fn fallback_timer_releases_bomb() {
        let stage = fixtures::open_stage();
        let bomb = spawn(&stage);
        fixtures::hit(&stage, &bomb, Signal::Stomped);
        fixtures::finish(&stage, &bomb, "count");

        fixtures::advance(&stage, 249.0);
        assert!(bomb.keep_object());
        fixtures::advance(&stage, 1.0);
        assert!(!bomb.keep_object());
    }

    #[test]
    fn armed_bomb_ignores_second_stomp_and_walls() {
        let stage = fixtures::open_stage();
        let bomb = spawn(&stage);
        fixtures::hit(&stage, &bomb, Signal::Stomped);

        assert_eq!(fixtures::hit(&stage, &bomb, Signal::Stomped), 0);
        fixtures::hit(&stage, &bomb, Signal::Blocked);
        assert_eq!(bomb.state(), Some(BombState::Idle));
    }

    #[test]
    fn armed_bomb_skips_ledge_check() {
        let stage = fixtures::stage_with(&["..........", "..........", ".........."]);
        let mut bomb = spawn(&stage);
        fixtures::hit(&stage, &bomb, Signal::Stomped);

        let map = stage.map().borrow();
        assert!(!bomb.lookahead(&map));
    }
}
