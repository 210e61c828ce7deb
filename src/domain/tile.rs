/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Floor,
    Wall,
    Hazard, // deadly: the hero dies on arrival here
}

impl Tile {
    /// Does this tile block movement?
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Does arriving on this tile kill the hero?
    pub fn is_deadly(self) -> bool {
        matches!(self, Tile::Hazard)
    }

    /// Can a character occupy this cell?
    pub fn is_passable(self) -> bool {
        !self.is_solid()
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Floor
    }
}
