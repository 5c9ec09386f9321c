//=========================================================================
// Player
//=========================================================================
//
// Player state as seen by creatures.
//
// The player controller lives in the host. It mirrors pose and velocity
// here every step. Creatures hold only a weak reference and may damage
// or launch the player.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

//=== Internal Dependencies ===============================================

use super::body::{EntityId, Rect};

pub type PlayerRef = Rc<RefCell<Player>>;

//=== Damage ==============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Damage {
    pub amount: f32,
    pub cause: String,
}

//=== Player ==============================================================

#[derive(Debug, Clone)]
pub struct Player {
    id: EntityId,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    velocity: (f32, f32),
    health: f32,
    damage_taken: Vec<Damage>,
    launches: Vec<f32>,
    alternate_skin: bool,
}

impl Player {
    pub const MAX_HEALTH: f32 = 100.0;

    pub fn new(id: EntityId, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            velocity: (0.0, 0.0),
            health: Self::MAX_HEALTH,
            damage_taken: Vec::new(),
            launches: Vec::new(),
            alternate_skin: false,
        }
    }

    pub fn into_ref(self) -> PlayerRef {
        Rc::new(RefCell::new(self))
    }

    //--- Pose -------------------------------------------------------------

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn velocity(&self) -> (f32, f32) {
        self.velocity
    }

    pub fn set_velocity(&mut self, vx: f32, vy: f32) {
        self.velocity = (vx, vy);
    }

    pub fn bounds(&self) -> Rect {
        Rect::centered(self.x, self.y, self.width, self.height)
    }

    //--- Interaction ------------------------------------------------------

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn take_damage(&mut self, amount: f32, cause: &str) {
        self.health = (self.health - amount).max(0.0);
        debug!(target: "creature", "Player took {} damage from {} ({} left)", amount, cause, self.health);
        self.damage_taken.push(Damage {
            amount,
            cause: cause.to_string(),
        });
    }

    /// Launches the player upward.
    pub fn bounce(&mut self, speed: f32) {
        self.velocity.1 = -speed.abs();
        self.launches.push(speed);
    }

    /// Swaps between the default and alternate skin.
    pub fn toggle_skin(&mut self) {
        self.alternate_skin = !self.alternate_skin;
        debug!(target: "creature", "Player skin switched (alternate: {})", self.alternate_skin);
    }

    pub fn has_alternate_skin(&self) -> bool {
        self.alternate_skin
    }

    pub fn damage_taken(&self) -> &[Damage] {
        &self.damage_taken
    }

    pub fn launches(&self) -> &[f32] {
        &self.launches
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
