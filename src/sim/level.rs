/// Dungeon generation: builds a fresh `WorldState` from config.
///
/// Order matters for seed reproducibility:
///   grid → torches → monsters → chests → doors → levers.
///
/// The player starts at (2, 2), or the nearest Floor cell when the scatter
/// walled that spot in. A grid with no Floor at all is regenerated a few
/// times before giving up with `GenError::NoFloor`.

use log::{debug, info};

use crate::config::{DungeonConfig, GameConfig, SpeedConfig};
use crate::domain::entity::Pos;
use crate::domain::grid::Grid;
use crate::domain::placement;
use crate::domain::rng::GameRng;
use crate::error::GenError;
use crate::sim::world::WorldState;

pub const PLAYER_SPAWN: Pos = Pos::new(2, 2);

const GRID_RETRIES: usize = 8;

/// Generate the session's world, seeded from config or entropy.
pub fn generate_world(config: &GameConfig) -> Result<WorldState, GenError> {
    let rng = match config.dungeon.seed {
        Some(seed) => GameRng::new(seed),
        None => GameRng::from_entropy(),
    };
    info!("dungeon seed {}", rng.seed());
    generate_with_rng(&config.dungeon, config.speed.clone(), rng)
}

pub fn generate_with_rng(
    dungeon: &DungeonConfig,
    speed: SpeedConfig,
    mut rng: GameRng,
) -> Result<WorldState, GenError> {
    let (grid, spawn) = generate_grid(dungeon, &mut rng)?;
    let attempts = dungeon.placement_attempts;

    let torches = placement::place_torches(&grid, &mut rng, dungeon.torches);
    let monsters = placement::place_monsters(&grid, &mut rng, dungeon.monsters, attempts, spawn);
    let chests = placement::place_chests(&grid, &mut rng, dungeon.chests, attempts);
    let doors = placement::place_doors(&grid, &mut rng, dungeon.doors, attempts);
    let levers = placement::place_levers(&grid, &mut rng, dungeon.levers, attempts);

    info!(
        "generated {}x{} dungeon: {} floor, {} chests, {} doors, {} levers, {} monsters",
        grid.width(), grid.height(), grid.floor_count(),
        chests.len(), doors.len(), levers.len(), monsters.len(),
    );
    debug!("player spawn ({}, {})", spawn.x, spawn.y);

    let mut world = WorldState::new(grid, spawn, speed, rng);
    world.torches = torches;
    world.monsters = monsters;
    world.chests = chests;
    world.doors = doors;
    world.levers = levers;
    Ok(world)
}

fn generate_grid(dungeon: &DungeonConfig, rng: &mut GameRng) -> Result<(Grid, Pos), GenError> {
    for attempt in 0..GRID_RETRIES {
        let grid = Grid::generate(dungeon.width, dungeon.height, rng);
        if let Some(spawn) = grid.nearest_floor(PLAYER_SPAWN) {
            return Ok((grid, spawn));
        }
        debug!("grid attempt {attempt} has no floor; regenerating");
    }
    Err(GenError::NoFloor { width: dungeon.width, height: dungeon.height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::Phase;

    fn config() -> GameConfig {
        GameConfig::default()
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let cfg = config();
        let a = generate_with_rng(&cfg.dungeon, cfg.speed.clone(), GameRng::new(1234)).unwrap();
        let b = generate_with_rng(&cfg.dungeon, cfg.speed.clone(), GameRng::new(1234)).unwrap();
        assert_eq!(a.chests, b.chests);
        assert_eq!(a.doors, b.doors);
        assert_eq!(a.levers, b.levers);
        assert_eq!(a.monsters, b.monsters);
        assert_eq!(a.torches, b.torches);
        assert_eq!(a.player.pos, b.player.pos);
    }

    #[test]
    fn generated_world_honors_placement_invariants() {
        let cfg = config();
        for seed in 0..25 {
            let w = generate_with_rng(&cfg.dungeon, cfg.speed.clone(), GameRng::new(seed)).unwrap();
            assert_eq!(w.phase, Phase::Playing);
            assert!(w.grid.is_floor(w.player.pos));
            assert_eq!(w.chests.len(), 4);
            assert_eq!(w.doors.len(), 2);
            assert_eq!(w.levers.len(), 2);
            assert_eq!(w.monsters.len(), 4);
            assert_eq!(w.torches.len(), 6);
            assert!(w.chests.iter().all(|c| w.grid.is_floor(c.pos) && !c.opened));
            assert!(w.levers.iter().all(|l| w.grid.is_floor(l.pos) && !l.activated));
            assert!(w.doors.iter().all(|d| w.grid.is_wall(d.pos) && d.locked));
            assert!(w.monsters.iter().all(|m| w.grid.is_floor(m.pos) && m.pos != w.player.pos));
            assert_eq!(w.player.inventory.count(crate::domain::entity::LootKind::Key), 0);
            assert_eq!(w.tutorial.cursor(), 0);
            assert!(w.riddle.is_none());
        }
    }

    #[test]
    fn walled_in_grid_reports_no_floor() {
        let mut cfg = config();
        cfg.dungeon.width = 2;
        cfg.dungeon.height = 2;
        let err = generate_with_rng(&cfg.dungeon, cfg.speed.clone(), GameRng::new(0)).err();
        assert_eq!(err, Some(GenError::NoFloor { width: 2, height: 2 }));
    }

    #[test]
    fn configured_seed_drives_generation() {
        let mut cfg = config();
        cfg.dungeon.seed = Some(77);
        let a = generate_world(&cfg).unwrap();
        let b = generate_world(&cfg).unwrap();
        assert_eq!(a.rng.seed(), 77);
        assert_eq!(a.chests, b.chests);
    }
}
