/// Grid: the dungeon occupancy map.
///
/// Cells are stored row-major as `cells[y][x]`. The outer border is always
/// Wall; generation scatters extra walls over the interior. The grid is never
/// mutated after generation: doors, levers and chests sit on top of it.

use super::entity::Pos;
use super::rng::GameRng;
use super::tile::Cell;

#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// Border walls plus `width * height / 5` random interior wall writes.
    /// Duplicate writes simply overwrite; nothing guarantees connectivity.
    pub fn generate(width: usize, height: usize, rng: &mut GameRng) -> Self {
        let mut cells = vec![vec![Cell::Floor; width]; height];
        for (y, row) in cells.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                    *cell = Cell::Wall;
                }
            }
        }

        // No interior to scatter into
        if width >= 3 && height >= 3 {
            for _ in 0..(width * height / 5) {
                let wx = rng.range_inclusive(1, width - 2);
                let wy = rng.range_inclusive(1, height - 2);
                cells[wy][wx] = Cell::Wall;
            }
        }

        Grid { width, height, cells }
    }

    /// Build a grid from a string diagram: '#' = Wall, anything else = Floor.
    #[cfg(test)]
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let cells = rows
            .iter()
            .map(|row| row.chars().map(|c| if c == '#' { Cell::Wall } else { Cell::Floor }).collect())
            .collect();
        Grid { width, height, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Cell at `pos`. Out of bounds reads as Wall.
    #[inline]
    pub fn cell_at(&self, pos: Pos) -> Cell {
        if self.in_bounds(pos) {
            self.cells[pos.y][pos.x]
        } else {
            Cell::Wall
        }
    }

    #[inline]
    pub fn is_floor(&self, pos: Pos) -> bool {
        self.cell_at(pos) == Cell::Floor
    }

    #[cfg(test)]
    pub fn is_wall(&self, pos: Pos) -> bool {
        self.cell_at(pos) == Cell::Wall
    }

    pub fn floor_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| **c == Cell::Floor).count()
    }

    /// Closest Floor cell to `target`, searching outward ring by ring
    /// (Chebyshev distance), row-major within a ring.
    pub fn nearest_floor(&self, target: Pos) -> Option<Pos> {
        let max_radius = self.width.max(self.height);
        for radius in 0..=max_radius {
            let y_lo = target.y.saturating_sub(radius);
            let x_lo = target.x.saturating_sub(radius);
            for y in y_lo..=target.y + radius {
                for x in x_lo..=target.x + radius {
                    let pos = Pos::new(x, y);
                    if pos.chebyshev(target) == radius && self.is_floor(pos) {
                        return Some(pos);
                    }
                }
            }
        }
        None
    }
}
