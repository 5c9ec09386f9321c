//=========================================================================
// TNT
//=========================================================================
//
// Stompable crate that launches the player and blasts terrain.
//
// The blast lands on the crate's wired target when the level gives one,
// otherwise on the crate itself. A local blast plays `boom` on the crate
// before it dies; a remote one leaves the crate to die straight away.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::info;
use rand::rngs::StdRng;
use rand::Rng;

//=== Internal Dependencies ===============================================

use super::actor::{Actor, Behavior, Brain, Lifecycle};
use super::explosion::Explosion;
use super::proximity::PlayerTracker;
use crate::config::TntConfig;
use crate::core::event_bus::{Event, Signal};
use crate::core::stage::Stage;
use crate::core::state_machine::{Flow, StateHooks, StateKey, StateMachine};
use crate::error::Result;
use crate::world::{Rect, SpriteRef};

const BLAST_SCALE: f32 = 3.0;

//=== States ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TntState {
    Idle,
    Dead,
}

impl StateKey for TntState {}

pub type TntController = Actor<Tnt>;

//=== Tnt =================================================================

pub struct Tnt {
    life: Lifecycle,
    config: TntConfig,
    player: PlayerTracker,
    explosion: Explosion,
    rng: StdRng,
    target: Option<(f32, f32)>,
    primed: bool,
    exploded: bool,
}

impl Tnt {
    /// `target` is the blast point wired in the level, if any.
    pub fn new(stage: &Stage, sprite: SpriteRef, target: Option<(f32, f32)>) -> Self {
        Self {
            life: Lifecycle::new(sprite),
            config: stage.config().tnt.clone(),
            player: PlayerTracker::new(stage.player()),
            explosion: Explosion::new(stage),
            rng: stage.rng(),
            target,
            primed: false,
            exploded: false,
        }
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    pub fn target(&self) -> Option<(f32, f32)> {
        self.target
    }

    fn cue(&mut self) -> String {
        format!("explosion{}", self.rng.gen_range(1..=self.config.sound_variants.max(1)))
    }

    /// Clears a four-by-three tile block under `(cx, cy)` plus one tile on
    /// each flank.
    fn explode_at(&mut self, cx: f32, cy: f32) {
        let left = cx - 128.0;
        let variants = self.config.sound_variants.max(1);
        let rng = &mut self.rng;

        let mut cleared = self
            .explosion
            .clear_each(Rect::new(left, cy, 256.0, 192.0), || format!("explosion{}", rng.gen_range(1..=variants)))
            .len();

        let cue = self.cue();
        cleared += self.explosion.clear(Rect::new(left - 64.0, cy, 64.0, 64.0), &cue).len();
        let cue = self.cue();
        cleared += self.explosion.clear(Rect::new(left + 256.0, cy, 64.0, 64.0), &cue).len();

        self.exploded = true;
        info!(target: "creature", "{} exploded at ({:.0}, {:.0}), {} tiles cleared", self.life.name(), cx, cy, cleared);
    }

    //--- Hooks ------------------------------------------------------------

    fn idle_enter(&mut self, _flow: &mut Flow<TntState>) {
        if !self.primed {
            self.life.play("idle");
        }
    }

    fn dead_enter(&mut self, _flow: &mut Flow<TntState>) {
        self.life.play("dead");
    }
}

impl Behavior for Tnt {
    type State = TntState;

    const KIND: &'static str = "tnt";
    const INITIAL: TntState = TntState::Idle;
    const SIGNALS: &'static [Signal] = &[Signal::Stomped, Signal::AnimationComplete];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, TntState>) -> Result<()> {
        fsm.add_state(TntState::Idle, StateHooks::new().on_enter(Self::idle_enter))?
            .add_state(TntState::Dead, StateHooks::new().on_enter(Self::dead_enter))?;
        Ok(())
    }

    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()> {
        match event.signal() {
            Signal::Stomped => {
                brain.unsubscribe(Signal::Stomped);
                let body = &mut brain.body;
                body.primed = true;
                body.life.freeze();
                body.life.play("active");
                body.player.bounce(body.config.bounce_speed);
            }
            Signal::AnimationComplete if brain.is_in(TntState::Dead) => {
                if event.clip() == Some("dead") {
                    brain.release();
                }
            }
            Signal::AnimationComplete if event.clip() == Some("active") && brain.body.primed && !brain.body.exploded => {
                let body = &mut brain.body;
                match body.target {
                    Some((x, y)) => {
                        body.explode_at(x, y);
                        brain.go(TntState::Dead);
                    }
                    None => {
                        let Some((x, y)) = body.life.position() else {
                            return Ok(());
                        };
                        body.explode_at(x, y);
                        body.life.with_sprite(|sprite| {
                            sprite.set_scale(BLAST_SCALE);
                            sprite.play("boom");
                        });
                    }
                }
            }
            Signal::AnimationComplete if event.clip() == Some("boom") => {
                brain.go(TntState::Dead);
            }
            _ => {}
        }
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Controller;
    use crate::creatures::fixtures;
    use crate::world::{PlayerRef, GROUND_LAYER};

    fn spawn(target: Option<(f32, f32)>) -> (Stage, PlayerRef, TntController) {
        let (stage, player) = fixtures::stage_with_player(&fixtures::FLOOR_ROWS, 100.0, 96.0);
        let sprite = fixtures::sprite(&stage, "tnt-1", 320.0, 160.0);
        let tnt = Actor::new(&stage, Tnt::new(&stage, sprite, target)).unwrap();
        (stage, player, tnt)
    }

    #[test]
    fn stomp_primes_and_launches_player() {
        let (stage, player, tnt) = spawn(None);
        assert_eq!(fixtures::clip(&tnt), Some("idle".to_string()));

        fixtures::hit(&stage, &tnt, Signal::Stomped);
        assert!(tnt.inspect(Tnt::is_primed).unwrap());
        assert!(tnt.sprite().unwrap().borrow().is_static());
        assert_eq!(fixtures::clip(&tnt), Some("active".to_string()));
        assert_eq!(player.borrow().launches(), &[18.0]);
    }

    #[test]
    fn local_blast_clears_footprint_and_flanks() {
        let (stage, _player, tnt) = spawn(None);
        fixtures::hit(&stage, &tnt, Signal::Stomped);
        fixtures::finish(&stage, &tnt, "active");

        // Columns 2..=7 of the floor row.
        assert_eq!(stage.map().borrow().tile_count(GROUND_LAYER), 4);
        let cues = stage.sounds().drain();
        assert_eq!(cues.len(), 6);
        assert!(cues.iter().all(|cue| cue.starts_with("explosion")));

        assert_eq!(tnt.state(), Some(TntState::Idle));
        assert_eq!(fixtures::clip(&tnt), Some("boom".to_string()));
    }

    #[test]
    fn local_blast_dies_after_boom() {
        let (stage, _player, tnt) = spawn(None);
        fixtures::hit(&stage, &tnt, Signal::Stomped);
        fixtures::finish(&stage, &tnt, "active");

        fixtures::finish(&stage, &tnt, "boom");
        assert_eq!(tnt.state(), Some(TntState::Dead));
        assert_eq!(fixtures::clip(&tnt), Some("dead".to_string()));

        fixtures::finish(&stage, &tnt, "dead");
        assert!(tnt.sprite().is_none());
        assert!(tnt.is_garbage());
    }

    #[test]
    fn remote_blast_dies_at_once() {
        let (stage, _player, tnt) = spawn(Some((480.0, 160.0)));
        fixtures::hit(&stage, &tnt, Signal::Stomped);
        fixtures::finish(&stage, &tnt, "active");

        assert_eq!(tnt.state(), Some(TntState::Dead));
        assert!(stage.map().borrow().tile_count(GROUND_LAYER) < 10);
        assert!(tnt.sprite().unwrap().borrow().scale() == 1.0);
    }

    #[test]
    fn unprimed_animation_does_nothing() {
        let (stage, _player, tnt) = spawn(None);
        fixtures::finish(&stage, &tnt, "active");

        assert_eq!(tnt.state(), Some(TntState::Idle));
        assert_eq!(stage.map().borrow().tile_count(GROUND_LAYER), 10);
    }
}
