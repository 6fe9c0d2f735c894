/// Entity placement by bounded rejection sampling.
///
/// Every placer samples a uniform coordinate inside a `Region` until the
/// cell predicate accepts it, then hands the coordinate to a factory that
/// builds the typed entity. Retries are capped per entity: when the cap is
/// hit the entity is skipped, so a saturated grid can never hang generation.

use log::warn;

use super::entity::{Chest, Door, Lever, LootKind, Monster, MonsterKind, Pos};
use super::grid::Grid;
use super::rng::GameRng;

/// Inclusive rectangle of candidate coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Region {
    pub min_x: usize,
    pub max_x: usize,
    pub min_y: usize,
    pub max_y: usize,
}

impl Region {
    /// All cells at least `margin` cells away from the grid edge.
    /// None when the grid is too small to have such cells.
    pub fn inset(grid: &Grid, margin: usize) -> Option<Region> {
        let (w, h) = (grid.width(), grid.height());
        if w < 2 * margin + 1 || h < 2 * margin + 1 {
            return None;
        }
        Some(Region {
            min_x: margin,
            max_x: w - 1 - margin,
            min_y: margin,
            max_y: h - 1 - margin,
        })
    }

    /// Everything inside the border ring.
    pub fn interior(grid: &Grid) -> Option<Region> {
        Self::inset(grid, 1)
    }

    #[cfg(test)]
    pub fn contains(&self, pos: Pos) -> bool {
        (self.min_x..=self.max_x).contains(&pos.x) && (self.min_y..=self.max_y).contains(&pos.y)
    }

    fn sample(&self, rng: &mut GameRng) -> Pos {
        let x = rng.range_inclusive(self.min_x, self.max_x);
        let y = rng.range_inclusive(self.min_y, self.max_y);
        Pos::new(x, y)
    }
}

/// Place up to `count` entities.
///
/// `factory` receives the entity's ordinal (0-based creation index, counting
/// skipped entities too), its accepted position, and the rng.
pub fn place_entities<T>(
    grid: &Grid,
    rng: &mut GameRng,
    count: usize,
    region: Option<Region>,
    max_attempts: usize,
    predicate: impl Fn(&Grid, Pos) -> bool,
    mut factory: impl FnMut(usize, Pos, &mut GameRng) -> T,
) -> Vec<T> {
    let region = match region {
        Some(r) => r,
        None => {
            if count > 0 {
                warn!("grid {}x{} too small for placement region; skipping {count} entities", grid.width(), grid.height());
            }
            return vec![];
        }
    };

    let mut placed = Vec::with_capacity(count);
    for ordinal in 0..count {
        let found = (0..max_attempts)
            .map(|_| region.sample(rng))
            .find(|&pos| predicate(grid, pos));
        match found {
            Some(pos) => placed.push(factory(ordinal, pos, rng)),
            None => warn!("no valid cell after {max_attempts} attempts; entity {ordinal} skipped"),
        }
    }
    placed
}

pub fn place_chests(grid: &Grid, rng: &mut GameRng, count: usize, max_attempts: usize) -> Vec<Chest> {
    place_entities(
        grid, rng, count, Region::interior(grid), max_attempts,
        |g, p| g.is_floor(p),
        |_, pos, rng| {
            let loot = *rng.choose(&LootKind::ALL).unwrap_or(&LootKind::Key);
            Chest::new(pos, loot)
        },
    )
}

/// Doors are set into walls.
pub fn place_doors(grid: &Grid, rng: &mut GameRng, count: usize, max_attempts: usize) -> Vec<Door> {
    place_entities(
        grid, rng, count, Region::interior(grid), max_attempts,
        |g, p| g.cell_at(p).holds_door(),
        |_, pos, _| Door::new(pos),
    )
}

/// Lever `i` is wired to door `i` (creation order).
pub fn place_levers(grid: &Grid, rng: &mut GameRng, count: usize, max_attempts: usize) -> Vec<Lever> {
    place_entities(
        grid, rng, count, Region::interior(grid), max_attempts,
        |g, p| g.is_floor(p),
        |ordinal, pos, _| Lever::new(pos, ordinal),
    )
}

/// Monsters keep two cells off the edge and never start on `avoid`
/// (the player's spawn).
pub fn place_monsters(
    grid: &Grid,
    rng: &mut GameRng,
    count: usize,
    max_attempts: usize,
    avoid: Pos,
) -> Vec<Monster> {
    place_entities(
        grid, rng, count, Region::inset(grid, 2), max_attempts,
        |g, p| g.is_floor(p) && p != avoid,
        |_, pos, rng| {
            let kind = *rng.choose(&MonsterKind::ALL).unwrap_or(&MonsterKind::Skeleton);
            Monster::new(pos, kind)
        },
    )
}

/// Decorative torches: any interior cell.
pub fn place_torches(grid: &Grid, rng: &mut GameRng, count: usize) -> Vec<Pos> {
    place_entities(grid, rng, count, Region::interior(grid), 1, |_, _| true, |_, pos, _| pos)
}
