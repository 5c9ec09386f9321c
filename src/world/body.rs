//=========================================================================
// Body Identity
//=========================================================================
//
// Identifiers, collision labels and axis-aligned bounds shared by
// sprites, the player and collision pairs.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== EntityId ============================================================

/// Stable identity of one spawned body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//=== BodyLabel ===========================================================

/// Physics label carried by every body in a collision pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyLabel {
    Player,
    Ground,
    Creature,
    Projectile,
    Object,
}

impl BodyLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            BodyLabel::Player => "player",
            BodyLabel::Ground => "ground",
            BodyLabel::Creature => "creature",
            BodyLabel::Projectile => "projectile",
            BodyLabel::Object => "object",
        }
    }
}

//=== Rect ================================================================

/// Axis-aligned rectangle in world pixels, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Builds a rectangle around a centre point.
    pub fn centered(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap test; touching edges do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
