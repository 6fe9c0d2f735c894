/// Monster AI: a periodic random walk.
///
/// A `MonsterClock` counts frames and fires on a fixed cadence. On each
/// firing every monster independently picks one of five moves (N, S, E, W,
/// stay) and commits it only if the destination is an in-bounds Floor cell.
/// Monsters ignore each other and may share a cell.

use super::entity::{Monster, Pos};
use super::grid::Grid;
use super::rng::GameRng;

pub const WANDER_MOVES: [(i32, i32); 5] = [(0, 1), (0, -1), (1, 0), (-1, 0), (0, 0)];

/// Frame counter that fires every `interval` ticks.
#[derive(Clone, Debug)]
pub struct MonsterClock {
    counter: u32,
    interval: u32,
}

impl MonsterClock {
    pub fn new(interval: u32) -> Self {
        MonsterClock { counter: 0, interval: interval.max(1) }
    }

    /// Count one frame. True when the stepper should run; the counter
    /// resets on firing.
    pub fn tick(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.interval {
            self.counter = 0;
            true
        } else {
            false
        }
    }
}

/// One stepper firing over all monsters.
pub fn wander(grid: &Grid, monsters: &mut [Monster], rng: &mut GameRng) {
    for m in monsters.iter_mut() {
        let &(dx, dy) = rng.choose(&WANDER_MOVES).unwrap_or(&(0, 0));
        if let Some(dest) = m.pos.offset(dx, dy) {
            if grid.in_bounds(dest) && grid.cell_at(dest).is_passable() {
                m.pos = dest;
            }
        }
    }
}

/// First monster standing on `pos`.
pub fn monster_at(monsters: &[Monster], pos: Pos) -> Option<&Monster> {
    monsters.iter().find(|m| m.pos == pos)
}
