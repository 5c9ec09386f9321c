//=========================================================================
// Projectile
//=========================================================================
//
// Fireballs and droppings launched by ranged creatures.
//
// A projectile flies without gravity until it touches anything or its
// time-to-live timer fires. Touching the player deals damage first.
// Launching queues the controller on the stage; the manager adopts it at
// the end of the frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::actor::{Actor, Behavior, Brain, Lifecycle};
use super::proximity::PlayerTracker;
use crate::core::entity::Entity;
use crate::core::event_bus::{Event, Signal, TimerTag};
use crate::core::stage::Stage;
use crate::core::state_machine::{StateHooks, StateKey, StateMachine};
use crate::error::Result;
use crate::world::{BodyLabel, EntityId, Sprite};

//=== Constants ===========================================================

pub const TTL_TIMER: TimerTag = TimerTag("ttl");

const PROJECTILE_SIZE: f32 = 24.0;

//=== States ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectileState {
    Flying,
}

impl StateKey for ProjectileState {}

pub type ProjectileController = Actor<Projectile>;

//=== Launch ==============================================================

/// Everything needed to put a projectile in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Launch {
    pub kind: &'static str,
    pub position: (f32, f32),
    pub velocity: (f32, f32),
    pub ttl_ms: f32,
    pub scale: f32,
}

//=== Projectile ==========================================================

pub struct Projectile {
    life: Lifecycle,
    player: PlayerTracker,
    damage: f32,
    cause: String,
}

impl Projectile {
    /// Builds the projectile, schedules its expiry and queues it for the
    /// manager. Returns the new entity's id.
    pub fn launch(stage: &Stage, launch: Launch) -> Result<EntityId> {
        let id = stage.next_id();
        let name = format!("{}-{}", launch.kind, id.raw());

        let mut sprite = Sprite::new(
            id,
            &name,
            BodyLabel::Projectile,
            launch.position.0,
            launch.position.1,
            PROJECTILE_SIZE,
            PROJECTILE_SIZE,
        );
        sprite.set_ignore_gravity(true);
        sprite.set_flip_x(launch.velocity.0 > 0.0);
        sprite.set_velocity(launch.velocity.0, launch.velocity.1);
        sprite.set_scale(launch.scale);
        sprite.play(launch.kind);

        let config = &stage.config().projectile;
        let body = Self {
            life: Lifecycle::new(sprite.into_ref()),
            player: PlayerTracker::new(stage.player()),
            damage: config.damage,
            cause: config.cause.clone(),
        };

        let controller = Actor::new(stage, body)?;
        stage.scheduler().after(launch.ttl_ms, Event::timer(&name, id, TTL_TIMER));
        stage.spawns().push(Entity::controller(controller));

        debug!(target: "creature", "Launched {} at ({:.0}, {:.0})", name, launch.position.0, launch.position.1);
        Ok(id)
    }
}

impl Behavior for Projectile {
    type State = ProjectileState;

    const KIND: &'static str = "projectile";
    const INITIAL: ProjectileState = ProjectileState::Flying;
    const SIGNALS: &'static [Signal] = &[Signal::Blocked, Signal::Stomped, Signal::Touched, Signal::Timer];

    fn life(&self) -> &Lifecycle {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Lifecycle {
        &mut self.life
    }

    fn register(fsm: &mut StateMachine<Self, ProjectileState>) -> Result<()> {
        fsm.add_state(ProjectileState::Flying, StateHooks::new())?;
        Ok(())
    }

    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()> {
        if event.other_label() == Some(BodyLabel::Player) {
            let body = &brain.body;
            body.player.damage(body.damage, &body.cause);
        }
        brain.release();
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creatures::fixtures;
    use crate::world::PlayerRef;

    fn fire(stage: &Stage) -> Entity {
        Projectile::launch(stage, Launch {
            kind: "fireball",
            position: (100.0, 100.0),
            velocity: (-11.0, 0.0),
            ttl_ms: 2000.0,
            scale: 1.0,
        })
        .unwrap();
        stage.spawns().drain().pop().unwrap()
    }

    fn setup() -> (Stage, PlayerRef) {
        fixtures::stage_with_player(&fixtures::FLOOR_ROWS, 0.0, 0.0)
    }

    #[test]
    fn launch_queues_a_weightless_controller() {
        let (stage, _player) = setup();
        let entity = fire(&stage);

        assert_eq!(entity.kind(), "controller");
        let sprite = entity.sprite().unwrap();
        let sprite = sprite.borrow();
        assert!(sprite.ignores_gravity());
        assert_eq!(sprite.velocity(), (-11.0, 0.0));
        assert_eq!(sprite.label(), BodyLabel::Projectile);
        assert_eq!(stage.scheduler().pending_count(), 1);
    }

    #[test]
    fn touching_player_deals_damage_and_expires() {
        let (stage, player) = setup();
        let entity = fire(&stage);
        let sprite = entity.sprite().unwrap();

        let event = Event::contact(entity.name(), Signal::Touched, entity.id(), fixtures::PLAYER_ID, BodyLabel::Player);
        stage.bus().emit(&event);
        assert_eq!(player.borrow().health(), 75.0);
        assert_eq!(player.borrow().damage_taken()[0].cause, "lava");
        assert!(!sprite.borrow().is_active());
    }

    #[test]
    fn wall_contact_expires_without_damage() {
        let (stage, player) = setup();
        let entity = fire(&stage);

        let event = Event::contact(entity.name(), Signal::Touched, entity.id(), EntityId(2), BodyLabel::Ground);
        stage.bus().emit(&event);
        assert_eq!(player.borrow().health(), 100.0);
        assert!(entity.sprite().is_none());
    }

    #[test]
    fn ttl_timer_expires_projectile() {
        let (stage, _player) = setup();
        let entity = fire(&stage);

        fixtures::advance(&stage, 1999.0);
        assert!(entity.sprite().is_some());

        fixtures::advance(&stage, 2.0);
        assert!(entity.sprite().is_none());
    }
}
