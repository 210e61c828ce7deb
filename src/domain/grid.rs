/// Static per-map tile grid.
///
/// Bounds checking is folded into the wall check: any coordinate outside
/// the grid reads as Wall, so every collision query is a single predicate
/// and callers never index out of range.

use super::tile::Tile;

#[derive(Clone, Debug)]
pub struct TileGrid {
    tiles: Vec<Vec<Tile>>,
    width: i32,
    height: i32,
}

impl TileGrid {
    pub fn new(tiles: Vec<Vec<Tile>>) -> Self {
        let height = tiles.len() as i32;
        let width = tiles.first().map_or(0, |row| row.len() as i32);
        TileGrid { tiles, width, height }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Tile at (x, y). Out of bounds reads as Wall.
    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        if self.in_bounds(x, y) {
            self.tiles[y as usize][x as usize]
        } else {
            Tile::Wall
        }
    }

    /// True for Wall tiles and for anything outside the grid.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y).is_solid()
    }
}
