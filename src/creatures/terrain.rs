//=========================================================================
// Terrain Probes
//=========================================================================
//
// Small-window tile lookups creatures run every frame to avoid walking
// off ledges or into walls.
//
// Facing comes from the sprite's flip flag (true = right). Every probe
// is a single tile lookup. A point outside the map reads as "no tile",
// so patrols reverse at map edges.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use crate::world::{Sprite, TileMap};

//=== Helpers =============================================================

fn facing(sprite: &Sprite) -> f32 {
    if sprite.flip_x() {
        1.0
    } else {
        -1.0
    }
}

fn probe_x(map: &TileMap, sprite: &Sprite, offset: f32) -> f32 {
    let reach = sprite.width() / 2.0 + map.tile_width() as f32 / 2.0 + offset;
    sprite.x() + facing(sprite) * reach
}

//=== Probes ==============================================================

/// Whether solid ground lies one tile ahead in the facing direction.
///
/// With `check_floor` the probe is taken half a tile below the sprite's
/// feet; otherwise at the sprite's centre height.
pub fn has_tile_ahead(map: &TileMap, layer: &str, sprite: &Sprite, check_floor: bool, offset: f32) -> bool {
    let x = probe_x(map, sprite, offset);
    let y = if check_floor {
        sprite.y() + sprite.height() / 2.0 + map.tile_height() as f32 / 2.0
    } else {
        sprite.y()
    };

    let solid = map.is_solid_at(layer, x, y);
    trace!(target: "terrain", "{} probes ahead ({:.0}, {:.0}): {}", sprite.name(), x, y, solid);
    solid
}

/// Whether a wall blocks travel one tile ahead at the sprite's own height.
pub fn has_tile_in_front(map: &TileMap, layer: &str, sprite: &Sprite, offset: f32) -> bool {
    let x = probe_x(map, sprite, offset);
    map.is_solid_at(layer, x, sprite.y())
}

/// Whether a tile lies `distance` pixels above (`direction < 0`) or
/// below (`direction > 0`) the sprite's centre.
pub fn has_tile_vertical(map: &TileMap, layer: &str, sprite: &Sprite, direction: f32, distance: f32) -> bool {
    let step = if direction < 0.0 { -distance } else { distance };
    map.is_solid_at(layer, sprite.x(), sprite.y() + step)
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BodyLabel, EntityId, GROUND_LAYER};

    // Six columns, floor on row 2 under columns 1..=4 and a wall at column 4.
    fn ledge_map() -> TileMap {
        TileMap::from_rows(GROUND_LAYER, 64, &[
            "......",
            "....#.",
            ".####.",
        ])
    }

    fn walker(x: f32, facing_right: bool) -> Sprite {
        let mut sprite = Sprite::new(EntityId(1), "crab", BodyLabel::Creature, x, 96.0, 64.0, 64.0);
        sprite.set_flip_x(facing_right);
        sprite
    }

    //--- Floor ------------------------------------------------------------

    #[test]
    fn floor_ahead_detected() {
        let map = ledge_map();
        assert!(has_tile_ahead(&map, GROUND_LAYER, &walker(160.0, true), true, 0.0));
        assert!(has_tile_ahead(&map, GROUND_LAYER, &walker(224.0, false), true, 0.0));
    }

    #[test]
    fn ledge_ahead_detected() {
        let map = ledge_map();
        assert!(!has_tile_ahead(&map, GROUND_LAYER, &walker(96.0, false), true, 0.0));
    }

    #[test]
    fn map_edge_reads_as_no_floor() {
        let map = ledge_map();
        assert!(!has_tile_ahead(&map, GROUND_LAYER, &walker(20.0, false), true, 0.0));
        assert!(!has_tile_ahead(&map, GROUND_LAYER, &walker(370.0, true), true, 0.0));
        assert!(!has_tile_in_front(&map, GROUND_LAYER, &walker(370.0, true), 0.0));
    }

    //--- Walls ------------------------------------------------------------

    #[test]
    fn wall_in_front_detected() {
        let map = ledge_map();
        assert!(has_tile_in_front(&map, GROUND_LAYER, &walker(224.0, true), 0.0));
        assert!(!has_tile_in_front(&map, GROUND_LAYER, &walker(224.0, false), 0.0));
    }

    #[test]
    fn vertical_probe_looks_down_and_up() {
        let map = ledge_map();
        let sprite = walker(160.0, true);
        assert!(has_tile_vertical(&map, GROUND_LAYER, &sprite, 1.0, 64.0));
        assert!(!has_tile_vertical(&map, GROUND_LAYER, &sprite, -1.0, 64.0));
    }
}
