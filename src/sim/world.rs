/// WorldState: the complete state of a running session.
///
/// ## Layers
///
///   - `grid`    : the generated dungeon. **Never mutated** after generation.
///   - entities  : chests, doors, levers, monsters, torches, player.
///   - modal/UI  : riddle prompt, tutorial cursor, message line.
///
/// The world owns the only random source, so a seeded world replays the
/// same monster walk for the same inputs.

use crate::config::SpeedConfig;
use crate::domain::ai::MonsterClock;
use crate::domain::entity::{Chest, Door, Lever, Monster, MonsterKind, Player, Pos};
use crate::domain::grid::Grid;
use crate::domain::interact::RiddlePrompt;
use crate::domain::rng::GameRng;
use crate::domain::tutorial::Tutorial;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    /// Terminal: a monster reached the player.
    Slain(MonsterKind),
}

pub struct WorldState {
    // ── Terrain ──
    pub grid: Grid,
    pub torches: Vec<Pos>,

    // ── Entities ──
    pub player: Player,
    pub chests: Vec<Chest>,
    pub doors: Vec<Door>,
    pub levers: Vec<Lever>,
    pub monsters: Vec<Monster>,

    // ── Modal state ──
    /// Open riddle prompt. While set, it captures all input.
    pub riddle: Option<RiddlePrompt>,
    pub tutorial: Tutorial,

    // ── Timing ──
    pub speed: SpeedConfig,
    pub monster_clock: MonsterClock,
    pub tick: u64,

    // ── Meta ──
    pub phase: Phase,
    pub rng: GameRng,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    /// Empty world over `grid` with the player at `spawn`.
    pub fn new(grid: Grid, spawn: Pos, speed: SpeedConfig, rng: GameRng) -> Self {
        WorldState {
            grid,
            torches: vec![],
            player: Player::new(spawn),
            chests: vec![],
            doors: vec![],
            levers: vec![],
            monsters: vec![],
            riddle: None,
            tutorial: Tutorial::new(),
            monster_clock: MonsterClock::new(speed.monster_move_interval),
            speed,
            tick: 0,
            phase: Phase::Playing,
            rng,
            message: String::new(),
            message_timer: 0,
        }
    }

    /// Show `msg` on the message line for the configured duration.
    pub fn set_message(&mut self, msg: &str) {
        self.message = msg.to_string();
        self.message_timer = self.speed.message_ticks;
    }

    pub fn is_over(&self) -> bool {
        self.phase != Phase::Playing
    }
}
