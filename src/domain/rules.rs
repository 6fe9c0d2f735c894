/// Movement rules for the player.
///
/// A step succeeds only onto an in-bounds Floor cell. Doors sit in walls and
/// never become walkable, so the player always stands on Floor.

use super::entity::{MoveDir, Pos};
use super::grid::Grid;

/// Destination of a one-cell step, or None if it is blocked.
pub fn try_step(grid: &Grid, from: Pos, dir: MoveDir) -> Option<Pos> {
    let (dx, dy) = dir.delta();
    let dest = from.offset(dx, dy)?;
    if grid.in_bounds(dest) && grid.cell_at(dest).is_passable() {
        Some(dest)
    } else {
        None
    }
}

/// Cell directly in front of `from` when facing `dir`, wall or not.
pub fn facing_cell(from: Pos, dir: MoveDir) -> Option<Pos> {
    let (dx, dy) = dir.delta();
    from.offset(dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_onto_floor() {
        let grid = Grid::from_rows(&[
            "#####",
            "#   #",
            "#####",
        ]);
        assert_eq!(try_step(&grid, Pos::new(2, 1), MoveDir::Left), Some(Pos::new(1, 1)));
        assert_eq!(try_step(&grid, Pos::new(2, 1), MoveDir::Right), Some(Pos::new(3, 1)));
    }

    #[test]
    fn step_blocked_by_wall() {
        let grid = Grid::from_rows(&[
            "#####",
            "# # #",
            "#####",
        ]);
        assert_eq!(try_step(&grid, Pos::new(1, 1), MoveDir::Right), None);
        assert_eq!(try_step(&grid, Pos::new(1, 1), MoveDir::Up), None);
        assert_eq!(try_step(&grid, Pos::new(3, 1), MoveDir::Down), None);
    }

    #[test]
    fn step_off_map_edge() {
        let grid = Grid::from_rows(&["   "]);
        assert_eq!(try_step(&grid, Pos::new(0, 0), MoveDir::Left), None);
        assert_eq!(try_step(&grid, Pos::new(2, 0), MoveDir::Right), None);
        assert_eq!(try_step(&grid, Pos::new(1, 0), MoveDir::Up), None);
    }

    #[test]
    fn facing_cell_ignores_terrain() {
        assert_eq!(facing_cell(Pos::new(2, 2), MoveDir::Up), Some(Pos::new(2, 1)));
        assert_eq!(facing_cell(Pos::new(0, 2), MoveDir::Left), None);
    }
}
