/// Entities: Player, Chest, Door, Lever, Monster.
/// One typed record per kind; all share the grid's coordinate space.

use std::fmt;

/// Grid coordinate. `x` = column, `y` = row.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }

    /// Offset by (dx, dy). None if it would leave the non-negative quadrant.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Pos> {
        let nx = self.x as i64 + dx as i64;
        let ny = self.y as i64 + dy as i64;
        if nx < 0 || ny < 0 {
            return None;
        }
        Some(Pos::new(nx as usize, ny as usize))
    }

    /// Chebyshev (king-move) distance.
    pub fn chebyshev(self, other: Pos) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

/// Movement direction (one discrete step per key press)
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
    Up,
    Down,
}

impl MoveDir {
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
        }
    }
}

/// A discrete player action, classified from keyboard or gamepad input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(MoveDir),
    Interact,
    /// A typed character (riddle answers).
    Text(char),
    Backspace,
    /// Submit (Enter / Start).
    Confirm,
    /// Dismiss the riddle prompt (Esc / Select while answering).
    Cancel,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LootKind {
    Key,
    Relic,
}

impl LootKind {
    pub const ALL: [LootKind; 2] = [LootKind::Key, LootKind::Relic];
}

impl fmt::Display for LootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LootKind::Key => write!(f, "key"),
            LootKind::Relic => write!(f, "gothic relic"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MonsterKind {
    Vampire,
    Skeleton,
    Ghost,
}

impl MonsterKind {
    pub const ALL: [MonsterKind; 3] = [MonsterKind::Vampire, MonsterKind::Skeleton, MonsterKind::Ghost];
}

impl fmt::Display for MonsterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonsterKind::Vampire => write!(f, "vampire"),
            MonsterKind::Skeleton => write!(f, "skeleton"),
            MonsterKind::Ghost => write!(f, "ghost"),
        }
    }
}

/// Loot counts. Only keys are ever spent.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Inventory {
    keys: u32,
    relics: u32,
}

impl Inventory {
    pub fn count(&self, kind: LootKind) -> u32 {
        match kind {
            LootKind::Key => self.keys,
            LootKind::Relic => self.relics,
        }
    }

    pub fn add(&mut self, kind: LootKind) {
        match kind {
            LootKind::Key => self.keys += 1,
            LootKind::Relic => self.relics += 1,
        }
    }

    pub fn has_key(&self) -> bool {
        self.keys > 0
    }

    /// Spend one key. Returns false (and changes nothing) when none are held.
    pub fn spend_key(&mut self) -> bool {
        if self.keys == 0 {
            return false;
        }
        self.keys -= 1;
        true
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Pos,
    pub facing: MoveDir,
    pub inventory: Inventory,
}

impl Player {
    pub fn new(pos: Pos) -> Self {
        Player {
            pos,
            facing: MoveDir::Right,
            inventory: Inventory::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chest {
    pub pos: Pos,
    pub loot: LootKind,
    pub opened: bool,
}

impl Chest {
    pub fn new(pos: Pos, loot: LootKind) -> Self {
        Chest { pos, loot, opened: false }
    }
}

pub const DOOR_RIDDLE: &str =
    "What walks on four legs in the morning, two legs at noon, and three in the evening?";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Door {
    pub pos: Pos,
    pub locked: bool,
    pub riddle: &'static str,
}

impl Door {
    pub fn new(pos: Pos) -> Self {
        Door { pos, locked: true, riddle: DOOR_RIDDLE }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lever {
    pub pos: Pos,
    pub activated: bool,
    /// Index into the door list of the door this lever unlocks.
    pub door_idx: usize,
}

impl Lever {
    pub fn new(pos: Pos, door_idx: usize) -> Self {
        Lever { pos, activated: false, door_idx }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Monster {
    pub pos: Pos,
    pub kind: MonsterKind,
}

impl Monster {
    pub fn new(pos: Pos, kind: MonsterKind) -> Self {
        Monster { pos, kind }
    }
}
