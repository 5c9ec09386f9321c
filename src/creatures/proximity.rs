//=========================================================================
// Player Proximity
//=========================================================================
//
// Distance, angle and sight queries against the tracked player.
//
// Creatures hold the player weakly through `PlayerTracker`. Once the host
// drops its player every query returns None and aggressive behaviors
// fall back to patrolling.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Weak;

//=== Internal Dependencies ===============================================

use crate::world::{Player, Rect, TileMap};

//=== Geometry ============================================================

pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

/// `1.0` when `to` lies right of `from`, `-1.0` otherwise.
pub fn direction_x(from: (f32, f32), to: (f32, f32)) -> f32 {
    if to.0 > from.0 {
        1.0
    } else {
        -1.0
    }
}

/// Heading from `from` to `to`, in radians.
pub fn attack_angle(from: (f32, f32), to: (f32, f32)) -> f32 {
    (to.1 - from.1).atan2(to.0 - from.0)
}

pub fn vertical_gap(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.1 - b.1).abs()
}

/// Linear interpolation from `a` to `b`.
pub fn linear(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn bounds_overlap(a: &Rect, b: &Rect) -> bool {
    a.intersects(b)
}

/// Walks the segment through the grid and reports whether no solid tile
/// lies on it.
pub fn line_of_sight(map: &TileMap, layer: &str, from: (f32, f32), to: (f32, f32)) -> bool {
    let length = distance(from, to);
    let step = (map.tile_width().min(map.tile_height()) as f32 / 4.0).max(1.0);
    let samples = (length / step).ceil() as u32;

    (0..=samples).all(|i| {
        let t = if samples == 0 { 0.0 } else { i as f32 / samples as f32 };
        let x = linear(from.0, to.0, t);
        let y = linear(from.1, to.1, t);
        map.tile_at_world(layer, x, y).is_none()
    })
}

//=== PlayerTracker =======================================================

#[derive(Debug, Clone)]
pub struct PlayerTracker {
    player: Weak<RefCell<Player>>,
}

impl PlayerTracker {
    pub fn new(player: Weak<RefCell<Player>>) -> Self {
        Self { player }
    }

    pub fn is_present(&self) -> bool {
        self.player.strong_count() > 0
    }

    pub fn position(&self) -> Option<(f32, f32)> {
        self.read(Player::position)
    }

    pub fn velocity(&self) -> Option<(f32, f32)> {
        self.read(Player::velocity)
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.read(Player::bounds)
    }

    pub fn distance_from(&self, point: (f32, f32)) -> Option<f32> {
        self.position().map(|player| distance(point, player))
    }

    /// Returns false when the player is gone or busy.
    pub fn damage(&self, amount: f32, cause: &str) -> bool {
        self.write(|player| player.take_damage(amount, cause))
    }

    pub fn bounce(&self, speed: f32) -> bool {
        self.write(|player| player.bounce(speed))
    }

    pub fn toggle_skin(&self) -> bool {
        self.write(Player::toggle_skin)
    }

    fn read<R>(&self, f: impl FnOnce(&Player) -> R) -> Option<R> {
        let player = self.player.upgrade()?;
        let player = player.try_borrow().ok()?;
        Some(f(&player))
    }

    fn write(&self, f: impl FnOnce(&mut Player)) -> bool {
        let Some(player) = self.player.upgrade() else {
            return false;
        };
        let Ok(mut player) = player.try_borrow_mut() else {
            return false;
        };
        f(&mut player);
        true
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{EntityId, GROUND_LAYER};
    use std::f32::consts::FRAC_PI_2;
    use std::rc::Rc;

    //--- Geometry ---------------------------------------------------------

    #[test]
    fn distance_and_direction() {
        assert_eq!(distance((0.0, 0.0), (3.0, 4.0)), 5.0);
        assert_eq!(direction_x((10.0, 0.0), (20.0, 0.0)), 1.0);
        assert_eq!(direction_x((10.0, 0.0), (5.0, 0.0)), -1.0);
        assert_eq!(vertical_gap((0.0, 10.0), (0.0, -6.0)), 16.0);
    }

    #[test]
    fn angle_points_down_screen() {
        let angle = attack_angle((0.0, 0.0), (0.0, 10.0));
        assert!((angle - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn linear_interpolates() {
        assert_eq!(linear(3.0, 0.0, 0.5), 1.5);
        assert_eq!(linear(0.0, 7.0, 1.0), 7.0);
    }

    //--- Line of sight ----------------------------------------------------

    #[test]
    fn wall_blocks_sight() {
        let map = TileMap::from_rows(GROUND_LAYER, 64, &[
            "......",
            "..#...",
            "......",
        ]);

        assert!(line_of_sight(&map, GROUND_LAYER, (32.0, 32.0), (352.0, 32.0)));
        assert!(!line_of_sight(&map, GROUND_LAYER, (32.0, 96.0), (352.0, 96.0)));
    }

    //--- PlayerTracker ----------------------------------------------------

    #[test]
    fn tracker_follows_live_player() {
        let player = Player::new(EntityId(0), 100.0, 50.0, 32.0, 64.0).into_ref();
        let tracker = PlayerTracker::new(Rc::downgrade(&player));

        assert_eq!(tracker.position(), Some((100.0, 50.0)));
        assert_eq!(tracker.distance_from((100.0, 20.0)), Some(30.0));
        assert!(tracker.damage(25.0, "lava"));
        assert_eq!(player.borrow().health(), 75.0);
    }

    #[test]
    fn tracker_goes_quiet_after_player_drops() {
        let player = Player::new(EntityId(0), 0.0, 0.0, 32.0, 64.0).into_ref();
        let tracker = PlayerTracker::new(Rc::downgrade(&player));
        drop(player);

        assert!(!tracker.is_present());
        assert_eq!(tracker.position(), None);
        assert!(!tracker.bounce(10.0));
    }
}
