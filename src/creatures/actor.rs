//=========================================================================
// Actor
//=========================================================================
//
// The lifecycle every archetype shares, written once.
//
// Architecture:
//   Actor<B>  (handle stored by the manager)
//     └─ Rc<RefCell<Brain<B>>>
//          ├─ body: B                  archetype data + Lifecycle
//          ├─ fsm: StateMachine<B, S>  archetype states
//          └─ subs: Subscriptions      "<name>-<signal>" handlers
//
// Bus handlers hold the brain weakly. Each one checks that the event
// names this entity and that the entity is not garbage before the
// archetype sees it.
//
// Teardown order: garbage flag first, then subscriptions, state
// machine, and finally the sprite.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use crate::core::entity::{Controller, Creature};
use crate::core::event_bus::{Event, EventBus, Handler, Signal, Subscriptions, Topic};
use crate::core::scheduler::Scheduler;
use crate::core::stage::Stage;
use crate::core::state_machine::{StateKey, StateMachine};
use crate::error::{BehaviorError, Result};
use crate::world::{EntityId, Sprite, SpriteRef, TileMap};

//=== Lifecycle ===========================================================

/// Sprite ownership and the garbage flag.
#[derive(Debug)]
pub struct Lifecycle {
    id: EntityId,
    name: String,
    sprite: Option<SpriteRef>,
    garbage: bool,
}

impl Lifecycle {
    pub fn new(sprite: SpriteRef) -> Self {
        let (id, name) = {
            let sprite = sprite.borrow();
            (sprite.id(), sprite.name().to_string())
        };

        Self {
            id,
            name,
            sprite: Some(sprite),
            garbage: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sprite(&self) -> Option<SpriteRef> {
        self.sprite.clone()
    }

    pub fn is_garbage(&self) -> bool {
        self.garbage
    }

    /// Runs `f` on the sprite. `None` once released or while the host
    /// holds a borrow.
    pub fn with_sprite<R>(&self, f: impl FnOnce(&mut Sprite) -> R) -> Option<R> {
        let sprite = self.sprite.as_ref()?;
        match sprite.try_borrow_mut() {
            Ok(mut sprite) => Some(f(&mut sprite)),
            Err(_) => {
                warn!(target: "creature", "{}: sprite busy", self.name);
                None
            }
        }
    }

    pub fn read_sprite<R>(&self, f: impl FnOnce(&Sprite) -> R) -> Option<R> {
        let sprite = self.sprite.as_ref()?;
        let sprite = sprite.try_borrow().ok()?;
        Some(f(&sprite))
    }

    pub fn position(&self) -> Option<(f32, f32)> {
        self.read_sprite(Sprite::position)
    }

    pub fn velocity(&self) -> Option<(f32, f32)> {
        self.read_sprite(Sprite::velocity)
    }

    /// Facing from the flip flag; false (left) once released.
    pub fn facing_right(&self) -> bool {
        self.read_sprite(Sprite::flip_x).unwrap_or(false)
    }

    pub fn play(&self, clip: &str) {
        self.with_sprite(|sprite| sprite.play(clip));
    }

    /// Sets facing, then horizontal velocity with the matching sign.
    pub fn walk(&self, facing_right: bool, speed: f32) {
        self.with_sprite(|sprite| {
            sprite.set_flip_x(facing_right);
            sprite.set_velocity_x(if facing_right { speed.abs() } else { -speed.abs() });
        });
    }

    /// Takes the body out of collisions without moving it again.
    pub fn freeze(&self) {
        self.with_sprite(|sprite| {
            sprite.set_static(true);
            sprite.set_collision_category(0);
        });
    }

    /// Sets the garbage flag. Returns false if it was already set.
    pub(crate) fn mark_garbage(&mut self) -> bool {
        if self.garbage {
            return false;
        }
        self.garbage = true;
        true
    }

    pub(crate) fn release_sprite(&mut self) {
        if let Some(sprite) = self.sprite.take() {
            match sprite.try_borrow_mut() {
                Ok(mut sprite) => sprite.destroy(),
                Err(_) => warn!(target: "creature", "{}: sprite busy at release", self.name),
            }
        }
    }
}

//=== Behavior ============================================================

/// Archetype definition plugged into [`Actor`].
pub trait Behavior: Sized + 'static {
    type State: StateKey;

    /// Short archetype name for logs.
    const KIND: &'static str;

    /// State entered right after construction.
    const INITIAL: Self::State;

    /// Signals subscribed on this entity's own topics.
    const SIGNALS: &'static [Signal];

    fn life(&self) -> &Lifecycle;

    fn life_mut(&mut self) -> &mut Lifecycle;

    /// Registers every state.
    fn register(fsm: &mut StateMachine<Self, Self::State>) -> Result<()>;

    /// Reacts to an event addressed to this entity.
    fn on_signal(brain: &mut Brain<Self>, event: &Event) -> Result<()>;

    /// Per-frame work around the state machine.
    fn tick(brain: &mut Brain<Self>, dt_ms: f32) {
        brain.drive(dt_ms);
    }
}

/// Archetypes that also self-correct against terrain and can be pruned.
pub trait CreatureBehavior: Behavior {
    fn lookahead(_brain: &mut Brain<Self>, _map: &TileMap) -> bool {
        false
    }

    fn keep_object(brain: &Brain<Self>) -> bool {
        !brain.body.life().is_garbage()
    }
}

//=== Brain ===============================================================

pub struct Brain<B: Behavior> {
    pub body: B,
    pub fsm: StateMachine<B, B::State>,
    subs: Subscriptions,
    bus: EventBus,
    scheduler: Scheduler,
}

impl<B: Behavior> Brain<B> {
    /// Runs the current state's update hook.
    pub fn drive(&mut self, dt_ms: f32) {
        if let Err(err) = self.fsm.update(&mut self.body, dt_ms) {
            error!(target: "creature", "{}", err);
        }
    }

    /// Transitions from outside a hook (event handlers, lookahead).
    pub fn go(&mut self, key: B::State) {
        if let Err(err) = self.fsm.set_state(&mut self.body, key) {
            error!(target: "creature", "{}", err);
        }
    }

    pub fn state(&self) -> Option<B::State> {
        self.fsm.current()
    }

    pub fn is_in(&self, key: B::State) -> bool {
        self.fsm.is_in(key)
    }

    pub fn unsubscribe(&mut self, signal: Signal) {
        self.subs.off(&self.bus, signal);
    }

    pub fn is_subscribed(&self, signal: Signal) -> bool {
        self.subs.is_subscribed(signal)
    }

    /// Common defeat path: stop listening for stomps, freeze the body,
    /// play the death clip and enter `dead`.
    pub fn collapse(&mut self, dead: B::State, clip: &str) {
        self.unsubscribe(Signal::Stomped);
        let life = self.body.life();
        life.freeze();
        life.play(clip);
        self.go(dead);
    }

    /// Tears the entity down. Returns false when it already was.
    pub fn release(&mut self) -> bool {
        if !self.body.life_mut().mark_garbage() {
            return false;
        }

        let id = self.body.life().id();
        let dropped = self.scheduler.cancel_for(id);
        debug!(
            target: "creature",
            "{} {} released ({} timers dropped)",
            B::KIND,
            self.body.life().name(),
            dropped
        );
        self.subs.release(&self.bus);
        self.fsm.destroy();
        self.body.life_mut().release_sprite();
        true
    }
}

//=== Actor ===============================================================

/// Managed handle to one archetype instance.
pub struct Actor<B: Behavior> {
    brain: Rc<RefCell<Brain<B>>>,
    id: EntityId,
    name: String,
}

impl<B: Behavior> Actor<B> {
    /// Wires `body` to its state machine and bus topics, then enters the
    /// initial state.
    pub fn new(stage: &Stage, body: B) -> Result<Self> {
        let id = body.life().id();
        let name = body.life().name().to_string();

        let mut fsm = StateMachine::new(format!("{}:{}", B::KIND, name));
        B::register(&mut fsm)?;

        let bus = stage.bus().clone();
        let brain = Rc::new(RefCell::new(Brain {
            body,
            fsm,
            subs: Subscriptions::new(id),
            bus: bus.clone(),
            scheduler: stage.scheduler().clone(),
        }));

        {
            let mut guard = brain.borrow_mut();
            for &signal in B::SIGNALS {
                let topic = Topic::new(name.as_str(), signal);
                let handler = dispatch(Rc::downgrade(&brain), &topic);
                guard.subs.on(&bus, topic, handler);
            }

            let Brain { body, fsm, .. } = &mut *guard;
            fsm.set_state(body, B::INITIAL)?;
        }

        debug!(target: "creature", "Spawned {} {} ({})", B::KIND, name, id);
        Ok(Self { brain, id, name })
    }

    pub fn state(&self) -> Option<B::State> {
        self.brain.try_borrow().ok().and_then(|brain| brain.state())
    }

    /// Read access to the archetype data.
    pub fn inspect<R>(&self, f: impl FnOnce(&B) -> R) -> Option<R> {
        self.brain.try_borrow().ok().map(|brain| f(&brain.body))
    }

    pub fn is_garbage(&self) -> bool {
        self.inspect(|body| body.life().is_garbage()).unwrap_or(false)
    }
}

fn dispatch<B: Behavior>(brain: Weak<RefCell<Brain<B>>>, topic: &Topic) -> Handler {
    let topic = topic.to_string();

    Rc::new(move |event: &Event| -> Result<()> {
        let Some(brain) = brain.upgrade() else {
            return Ok(());
        };
        let mut brain = brain
            .try_borrow_mut()
            .map_err(|_| BehaviorError::HandlerBusy { topic: topic.clone() })?;

        let life = brain.body.life();
        if life.is_garbage() || event.source != life.id() {
            return Ok(());
        }

        B::on_signal(&mut brain, event)
    })
}

//=== Contracts ===========================================================

impl<B: Behavior> Controller for Actor<B> {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, dt_ms: f32) {
        let Ok(mut brain) = self.brain.try_borrow_mut() else {
            warn!(target: "creature", "{}: update skipped, controller busy", self.name);
            return;
        };
        if brain.body.life().is_garbage() {
            return;
        }
        B::tick(&mut brain, dt_ms);
    }

    fn destroy(&mut self) {
        match self.brain.try_borrow_mut() {
            Ok(mut brain) => {
                brain.release();
            }
            Err(_) => warn!(target: "creature", "{}: destroy skipped, controller busy", self.name),
        }
    }

    fn sprite(&self) -> Option<SpriteRef> {
        self.brain.try_borrow().ok().and_then(|brain| brain.body.life().sprite())
    }
}

impl<B: CreatureBehavior> Creature for Actor<B> {
    fn lookahead(&mut self, map: &TileMap) -> bool {
        let Ok(mut brain) = self.brain.try_borrow_mut() else {
            return false;
        };
        if brain.body.life().is_garbage() {
            return false;
        }
        B::lookahead(&mut brain, map)
    }

    fn keep_object(&self) -> bool {
        self.brain.try_borrow().map_or(true, |brain| B::keep_object(&brain))
    }
}
