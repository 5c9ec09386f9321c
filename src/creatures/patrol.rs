//=========================================================================
// Patrol
//=========================================================================
//
// Left/right walking on a timer, shared by most archetypes.
//
// Each move state resets the leg on enter and steps it on update. A leg
// reports `true` once its time runs out and the owner switches to the
// opposite move state.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::actor::Lifecycle;

//=== Patrol ==============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Patrol {
    pub speed: f32,
    pub turn_after_ms: f32,
    move_time: f32,
}

impl Patrol {
    pub fn new(speed: f32, turn_after_ms: f32) -> Self {
        Self {
            speed,
            turn_after_ms,
            move_time: 0.0,
        }
    }

    pub fn move_time(&self) -> f32 {
        self.move_time
    }

    /// Starts a new leg.
    pub fn reset(&mut self) {
        self.move_time = 0.0;
    }

    /// Walks one update in the given direction. Returns true once the leg
    /// has lasted longer than `turn_after_ms`.
    pub fn step(&mut self, life: &Lifecycle, facing_right: bool, dt_ms: f32) -> bool {
        self.move_time += dt_ms;
        life.walk(facing_right, self.speed);
        self.move_time > self.turn_after_ms
    }
}

//=== Map Edges ===========================================================

/// Heading to take at a map edge. `Some(true)` turns right from the left
/// edge, `Some(false)` turns left once `x` is within `right_margin` of the
/// right edge. The left edge wins on maps narrower than the body.
pub fn edge_heading(x: f32, width: f32, map_width: f32, right_margin: f32) -> Option<bool> {
    if x <= width / 2.0 {
        Some(true)
    } else if x >= map_width - right_margin {
        Some(false)
    } else {
        None
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
