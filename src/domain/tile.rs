/// Cell types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Floor,
    Wall,
}

impl Cell {
    /// Can an actor (player, monster) occupy this cell?
    pub fn is_passable(self) -> bool {
        matches!(self, Cell::Floor)
    }

    /// Doors are set into walls.
    pub fn holds_door(self) -> bool {
        matches!(self, Cell::Wall)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Floor
    }
}
