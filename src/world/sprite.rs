//=========================================================================
// Sprite
//=========================================================================
//
// Physical/visual handle owned by one controller.
//
// The host mirrors its physics body into this record every step
// (position, velocity) and reads back what controllers wrote (velocity,
// flip, static, collision category, animation). Position is the body
// centre.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

//=== Internal Dependencies ===============================================

use super::body::{BodyLabel, EntityId, Rect};

//=== SpriteRef ===========================================================

pub type SpriteRef = Rc<RefCell<Sprite>>;

//=== Sprite ==============================================================

#[derive(Debug, Clone)]
pub struct Sprite {
    id: EntityId,
    name: String,
    label: BodyLabel,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    velocity: (f32, f32),
    flip_x: bool,
    is_static: bool,
    collision_category: u32,
    ignore_gravity: bool,
    visible: bool,
    active: bool,
    scale: f32,
    animation: Option<String>,
    plays: u32,
}

impl Sprite {
    //--- Construction -----------------------------------------------------

    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        label: BodyLabel,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            label,
            x,
            y,
            width,
            height,
            velocity: (0.0, 0.0),
            flip_x: false,
            is_static: false,
            collision_category: 1,
            ignore_gravity: false,
            visible: true,
            active: true,
            scale: 1.0,
            animation: None,
            plays: 0,
        }
    }

    pub fn into_ref(self) -> SpriteRef {
        Rc::new(RefCell::new(self))
    }

    //--- Identity ---------------------------------------------------------

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> BodyLabel {
        self.label
    }

    //--- Pose -------------------------------------------------------------

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::centered(self.x, self.y, self.width * self.scale, self.height * self.scale)
    }

    //--- Motion -----------------------------------------------------------

    pub fn velocity(&self) -> (f32, f32) {
        self.velocity
    }

    pub fn set_velocity(&mut self, vx: f32, vy: f32) {
        self.velocity = (vx, vy);
    }

    pub fn set_velocity_x(&mut self, vx: f32) {
        self.velocity.0 = vx;
    }

    pub fn set_velocity_y(&mut self, vy: f32) {
        self.velocity.1 = vy;
    }

    /// `true` when the sprite faces right.
    pub fn flip_x(&self) -> bool {
        self.flip_x
    }

    pub fn set_flip_x(&mut self, flip: bool) {
        self.flip_x = flip;
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn set_static(&mut self, is_static: bool) {
        self.is_static = is_static;
        if is_static {
            self.velocity = (0.0, 0.0);
        }
    }

    pub fn collision_category(&self) -> u32 {
        self.collision_category
    }

    /// Category 0 takes the body out of every collision filter.
    pub fn set_collision_category(&mut self, category: u32) {
        self.collision_category = category;
    }

    pub fn ignores_gravity(&self) -> bool {
        self.ignore_gravity
    }

    pub fn set_ignore_gravity(&mut self, ignore: bool) {
        self.ignore_gravity = ignore;
    }

    //--- Visual -----------------------------------------------------------

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Starts an animation clip. The host reports completion back through
    /// the manager.
    pub fn play(&mut self, clip: &str) {
        trace!(target: "creature", "{} plays {}", self.name, clip);
        self.animation = Some(clip.to_string());
        self.plays += 1;
    }

    pub fn animation(&self) -> Option<&str> {
        self.animation.as_deref()
    }

    /// Number of `play` calls so far.
    pub fn play_count(&self) -> u32 {
        self.plays
    }

    //--- Lifetime ---------------------------------------------------------

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Deactivates the body; the host removes it from physics and display.
    pub fn destroy(&mut self) {
        self.active = false;
        self.visible = false;
        self.velocity = (0.0, 0.0);
        self.collision_category = 0;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
