//=========================================================================
// Explosion
//=========================================================================
//
// Terrain destruction for bombs and TNT.
//
// Cleared tiles are removed from the ground layer and hidden; the host's
// player body treats hidden tile bodies as gone on its next contact. Each
// cleared region records a sound cue for the host's audio surface.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::stage::{SoundCues, Stage};
use crate::world::{Rect, Tile, TileMapRef};

//=== Explosion ===========================================================

#[derive(Debug, Clone)]
pub struct Explosion {
    map: TileMapRef,
    layer: String,
    sounds: SoundCues,
}

impl Explosion {
    pub fn new(stage: &Stage) -> Self {
        Self {
            map: stage.map().clone(),
            layer: stage.ground_layer().to_string(),
            sounds: stage.sounds().clone(),
        }
    }

    /// Clears `area` and records `cue` once for the region.
    pub fn clear(&self, area: Rect, cue: &str) -> Vec<Tile> {
        self.sounds.play(cue);
        self.clear_with(area, |_| {})
    }

    /// Clears `area`, recording one cue per removed tile.
    pub fn clear_each(&self, area: Rect, mut cue: impl FnMut() -> String) -> Vec<Tile> {
        let sounds = self.sounds.clone();
        self.clear_with(area, move |_| sounds.play(cue()))
    }

    fn clear_with(&self, area: Rect, mut on_tile: impl FnMut(&Tile)) -> Vec<Tile> {
        let Ok(mut map) = self.map.try_borrow_mut() else {
            warn!(target: "terrain", "Tile map busy, explosion at ({:.0}, {:.0}) skipped", area.x, area.y);
            return Vec::new();
        };

        let mut removed = Vec::new();
        for tile in map.tiles_within_world(&self.layer, area) {
            if let Some(tile) = map.remove_tile_at(&self.layer, tile.x, tile.y) {
                on_tile(&tile);
                removed.push(tile);
            }
        }

        debug!(
            target: "terrain",
            "Explosion cleared {} tiles in {:.0}x{:.0} at ({:.0}, {:.0})",
            removed.len(),
            area.width,
            area.height,
            area.x,
            area.y
        );
        removed
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
