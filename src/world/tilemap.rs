//=========================================================================
// Tile Map
//=========================================================================
//
// In-memory tile grid with named layers.
//
// Loading map files is the host's concern; it fills layers through
// `put_tile`. Controllers read tiles for terrain probes, and explosions
// remove them.
//
// Coordinates:
//   world (x, y) pixels ─── world_to_tile() ──→ (tx, ty) grid cell
//   Anything outside the grid maps to None.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::body::Rect;

//=== Constants ===========================================================

pub const GROUND_LAYER: &str = "ground";

pub type TileMapRef = Rc<RefCell<TileMap>>;

//=== Tile ================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub index: i32,
    pub collides: bool,
    pub visible: bool,
}

impl Tile {
    pub fn new(x: u32, y: u32, index: i32) -> Self {
        Self {
            x,
            y,
            index,
            collides: index >= 0,
            visible: true,
        }
    }
}

//=== TileLayer ===========================================================

#[derive(Debug, Clone)]
struct TileLayer {
    name: String,
    cells: Vec<Option<Tile>>,
}

//=== TileMap =============================================================

#[derive(Debug, Clone)]
pub struct TileMap {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    layers: Vec<TileLayer>,
}

impl TileMap {
    //--- Construction -----------------------------------------------------

    /// Creates a map of `width` x `height` tiles with no layers.
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        assert!(tile_width > 0 && tile_height > 0, "Tile size must be positive");
        Self {
            width,
            height,
            tile_width,
            tile_height,
            layers: Vec::new(),
        }
    }

    /// Builds a single-layer map from text rows; `#` marks a solid tile.
    ///
    /// ```rust
    /// # use hoppa_engine::world::TileMap;
    /// let map = TileMap::from_rows("ground", 64, &[
    ///     "........",
    ///     "########",
    /// ]);
    /// assert!(map.tile_at_world("ground", 10.0, 70.0).is_some());
    /// ```
    pub fn from_rows(layer: &str, tile_size: u32, rows: &[&str]) -> Self {
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0) as u32;
        let mut map = Self::new(width, rows.len() as u32, tile_size, tile_size);
        map.add_layer(layer);

        for (ty, row) in rows.iter().enumerate() {
            for (tx, cell) in row.chars().enumerate() {
                if cell == '#' {
                    map.put_tile(layer, tx as u32, ty as u32, 1);
                }
            }
        }
        map
    }

    pub fn into_ref(self) -> TileMapRef {
        Rc::new(RefCell::new(self))
    }

    /// Adds an empty layer. Re-adding an existing name is ignored.
    pub fn add_layer(&mut self, name: &str) {
        if self.layers.iter().any(|layer| layer.name == name) {
            warn!(target: "terrain", "Layer {} already exists", name);
            return;
        }

        let cells = vec![None; (self.width * self.height) as usize];
        self.layers.push(TileLayer {
            name: name.to_string(),
            cells,
        });
    }

    /// Places a tile. Returns false when the layer or cell does not exist.
    pub fn put_tile(&mut self, layer: &str, tx: u32, ty: u32, index: i32) -> bool {
        let Some(slot) = self.cell_index(tx, ty) else {
            return false;
        };
        let Some(layer) = self.layer_mut(layer) else {
            return false;
        };

        layer.cells[slot] = Some(Tile::new(tx, ty, index));
        true
    }

    //--- Dimensions -------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn width_in_pixels(&self) -> f32 {
        (self.width * self.tile_width) as f32
    }

    pub fn height_in_pixels(&self) -> f32 {
        (self.height * self.tile_height) as f32
    }

    //--- Coordinates ------------------------------------------------------

    /// Grid cell containing a world point, or `None` outside the map.
    pub fn world_to_tile(&self, x: f32, y: f32) -> Option<(u32, u32)> {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }

        let tx = (x / self.tile_width as f32).floor() as u32;
        let ty = (y / self.tile_height as f32).floor() as u32;
        (tx < self.width && ty < self.height).then_some((tx, ty))
    }

    /// World position of a cell's top-left corner.
    pub fn tile_to_world(&self, tx: u32, ty: u32) -> (f32, f32) {
        ((tx * self.tile_width) as f32, (ty * self.tile_height) as f32)
    }

    //--- Queries ----------------------------------------------------------

    pub fn tile_at(&self, layer: &str, tx: u32, ty: u32) -> Option<&Tile> {
        let slot = self.cell_index(tx, ty)?;
        self.layer(layer)?.cells[slot].as_ref()
    }

    pub fn tile_at_world(&self, layer: &str, x: f32, y: f32) -> Option<&Tile> {
        let (tx, ty) = self.world_to_tile(x, y)?;
        self.tile_at(layer, tx, ty)
    }

    /// Whether a colliding tile occupies the world point.
    pub fn is_solid_at(&self, layer: &str, x: f32, y: f32) -> bool {
        self.tile_at_world(layer, x, y).is_some_and(|tile| tile.collides)
    }

    /// Tiles overlapping a world rectangle, clipped to the map.
    ///
    /// The covered columns run from `floor(x / tw)` up to but excluding
    /// `ceil((x + w) / tw)`, so a rectangle aligned to the grid covers
    /// exactly `w / tw` columns.
    pub fn tiles_within_world(&self, layer: &str, area: Rect) -> Vec<Tile> {
        let Some(layer) = self.layer(layer) else {
            return Vec::new();
        };

        let tw = self.tile_width as f32;
        let th = self.tile_height as f32;
        let x0 = (area.x / tw).floor().max(0.0) as u32;
        let y0 = (area.y / th).floor().max(0.0) as u32;
        let x1 = ((area.right() / tw).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((area.bottom() / th).ceil().max(0.0) as u32).min(self.height);

        let mut tiles = Vec::new();
        for ty in y0..y1 {
            for tx in x0..x1 {
                if let Some(tile) = &layer.cells[(ty * self.width + tx) as usize] {
                    tiles.push(tile.clone());
                }
            }
        }
        tiles
    }

    //--- Mutation ---------------------------------------------------------

    /// Removes the tile at a grid cell and returns it.
    ///
    /// Removing an empty cell returns `None`, so overlapping explosions in
    /// one frame are harmless.
    pub fn remove_tile_at(&mut self, layer: &str, tx: u32, ty: u32) -> Option<Tile> {
        let slot = self.cell_index(tx, ty)?;
        let mut tile = self.layer_mut(layer)?.cells[slot].take()?;
        tile.visible = false;
        debug!(target: "terrain", "Removed tile ({}, {}) from {}", tx, ty, layer);
        Some(tile)
    }

    pub fn tile_count(&self, layer: &str) -> usize {
        self.layer(layer)
            .map(|layer| layer.cells.iter().flatten().count())
            .unwrap_or(0)
    }

    //--- Internal Helpers -------------------------------------------------

    fn cell_index(&self, tx: u32, ty: u32) -> Option<usize> {
        (tx < self.width && ty < self.height).then(|| (ty * self.width + tx) as usize)
    }

    fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    fn layer_mut(&mut self, name: &str) -> Option<&mut TileLayer> {
        self.layers.iter_mut().find(|layer| layer.name == name)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_map() -> TileMap {
        TileMap::from_rows(GROUND_LAYER, 64, &[
            "......",
            "......",
            "######",
        ])
    }

    //--- Coordinates ------------------------------------------------------

    #[test]
    fn world_to_tile_rejects_outside_points() {
        let map = floor_map();
        assert_eq!(map.world_to_tile(65.0, 130.0), Some((1, 2)));
        assert_eq!(map.world_to_tile(-1.0, 10.0), None);
        assert_eq!(map.world_to_tile(6.0 * 64.0, 10.0), None);
        assert_eq!(map.world_to_tile(10.0, 3.0 * 64.0), None);
    }

    #[test]
    fn dimensions_in_pixels() {
        let map = floor_map();
        assert_eq!(map.width_in_pixels(), 384.0);
        assert_eq!(map.height_in_pixels(), 192.0);
    }

    //--- Queries ----------------------------------------------------------

    #[test]
    fn tile_at_world_finds_floor() {
        let map = floor_map();
        assert!(map.is_solid_at(GROUND_LAYER, 10.0, 150.0));
        assert!(!map.is_solid_at(GROUND_LAYER, 10.0, 10.0));
        assert!(!map.is_solid_at("decor", 10.0, 150.0));
    }

    #[test]
    fn aligned_rect_covers_exact_columns() {
        let map = floor_map();
        let tiles = map.tiles_within_world(GROUND_LAYER, Rect::new(64.0, 128.0, 192.0, 64.0));
        let columns: Vec<u32> = tiles.iter().map(|t| t.x).collect();
        assert_eq!(columns, vec![1, 2, 3]);
    }

    #[test]
    fn rect_is_clipped_to_map() {
        let map = floor_map();
        let tiles = map.tiles_within_world(GROUND_LAYER, Rect::new(-500.0, -500.0, 5000.0, 5000.0));
        assert_eq!(tiles.len(), 6);
    }

    //--- Mutation ---------------------------------------------------------

    #[test]
    fn remove_is_idempotent() {
        let mut map = floor_map();

        let removed = map.remove_tile_at(GROUND_LAYER, 2, 2);
        assert!(removed.is_some_and(|t| !t.visible));
        assert!(map.remove_tile_at(GROUND_LAYER, 2, 2).is_none());
        assert!(map.remove_tile_at(GROUND_LAYER, 99, 2).is_none());
        assert_eq!(map.tile_count(GROUND_LAYER), 5);
    }

    #[test]
    fn put_tile_outside_grid_fails() {
        let mut map = floor_map();
        assert!(!map.put_tile(GROUND_LAYER, 6, 0, 1));
        assert!(!map.put_tile("missing", 0, 0, 1));
        assert!(map.put_tile(GROUND_LAYER, 0, 0, 1));
    }
}
