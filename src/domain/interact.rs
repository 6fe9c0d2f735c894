/// Interaction rules: chests, doors, levers and the riddle prompt.
///
/// All lookups are exact position matches over small lists. Each function
/// acts on at most one entity and reports what happened; the caller decides
/// priority, messages and tutorial progress.

use super::entity::{Chest, Door, Inventory, Lever, LootKind, Pos};

/// The only accepted riddle answer (after trimming and lower-casing).
pub const RIDDLE_SOLUTION: &str = "man";

/// Open the first unopened chest at `at`, adding its loot to `inv`.
/// Opened chests are skipped, so repeating the call yields nothing.
pub fn open_chest(chests: &mut [Chest], at: Pos, inv: &mut Inventory) -> Option<LootKind> {
    let chest = chests.iter_mut().find(|c| c.pos == at && !c.opened)?;
    chest.opened = true;
    inv.add(chest.loot);
    Some(chest.loot)
}

/// Result of touching a door.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DoorOutcome {
    /// Already unlocked; nothing changes.
    Open,
    /// Locked and the player holds a key: a riddle must be answered.
    Riddle,
    /// Locked and no key.
    Locked,
}

/// Inspect the first door at `at`. Never mutates the door.
pub fn inspect_door(doors: &[Door], at: Pos, inv: &Inventory) -> Option<(usize, DoorOutcome)> {
    let (idx, door) = doors.iter().enumerate().find(|(_, d)| d.pos == at)?;
    let outcome = if !door.locked {
        DoorOutcome::Open
    } else if inv.has_key() {
        DoorOutcome::Riddle
    } else {
        DoorOutcome::Locked
    };
    Some((idx, outcome))
}

/// A lever that was just pulled.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LeverPull {
    pub lever_idx: usize,
    pub door_idx: usize,
    /// False when the lever's door does not exist.
    pub door_found: bool,
}

/// Activate the first unactivated lever at `at`. Its door is forced open
/// whatever its previous state.
pub fn pull_lever(levers: &mut [Lever], doors: &mut [Door], at: Pos) -> Option<LeverPull> {
    let (lever_idx, lever) = levers
        .iter_mut()
        .enumerate()
        .find(|(_, l)| l.pos == at && !l.activated)?;
    lever.activated = true;
    let door_idx = lever.door_idx;
    let door = doors.get_mut(door_idx);
    let door_found = door.is_some();
    if let Some(door) = door {
        door.locked = false;
    }
    Some(LeverPull { lever_idx, door_idx, door_found })
}

/// Modal text prompt guarding one door.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RiddlePrompt {
    pub door_idx: usize,
    pub answer: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RiddleVerdict {
    Solved,
    Wrong,
}

impl RiddlePrompt {
    pub fn new(door_idx: usize) -> Self {
        RiddlePrompt { door_idx, answer: String::new() }
    }

    /// Append a typed character. Control characters are ignored.
    pub fn push(&mut self, c: char) {
        if !c.is_control() {
            self.answer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.answer.pop();
    }

    pub fn is_correct(&self) -> bool {
        self.answer.trim().to_lowercase() == RIDDLE_SOLUTION
    }

    /// Judge the answer. The text is cleared either way; on success the
    /// bound door unlocks and one key is spent. The caller closes the
    /// prompt on `Solved`.
    pub fn submit(&mut self, doors: &mut [Door], inv: &mut Inventory) -> RiddleVerdict {
        let correct = self.is_correct();
        self.answer.clear();
        if !correct {
            return RiddleVerdict::Wrong;
        }
        if let Some(door) = doors.get_mut(self.door_idx) {
            door.locked = false;
        }
        inv.spend_key();
        RiddleVerdict::Solved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::DOOR_RIDDLE;

    fn keys(n: u32) -> Inventory {
        let mut inv = Inventory::default();
        for _ in 0..n {
            inv.add(LootKind::Key);
        }
        inv
    }

    #[test]
    fn chest_yields_loot_exactly_once() {
        let at = Pos::new(5, 5);
        let mut chests = vec![Chest::new(at, LootKind::Key)];
        let mut inv = Inventory::default();

        assert_eq!(open_chest(&mut chests, at, &mut inv), Some(LootKind::Key));
        assert_eq!(inv.count(LootKind::Key), 1);
        assert!(chests[0].opened);

        assert_eq!(open_chest(&mut chests, at, &mut inv), None);
        assert_eq!(inv.count(LootKind::Key), 1);
    }

    #[test]
    fn chest_elsewhere_is_ignored() {
        let mut chests = vec![Chest::new(Pos::new(1, 1), LootKind::Relic)];
        let mut inv = Inventory::default();
        assert_eq!(open_chest(&mut chests, Pos::new(1, 2), &mut inv), None);
        assert!(!chests[0].opened);
        assert_eq!(inv, Inventory::default());
    }

    #[test]
    fn door_outcomes() {
        let at = Pos::new(3, 3);
        let mut doors = vec![Door::new(at)];
        assert_eq!(doors[0].riddle, DOOR_RIDDLE);

        assert_eq!(inspect_door(&doors, at, &keys(0)), Some((0, DoorOutcome::Locked)));
        assert_eq!(inspect_door(&doors, at, &keys(1)), Some((0, DoorOutcome::Riddle)));
        assert!(doors[0].locked, "inspection never unlocks");

        doors[0].locked = false;
        assert_eq!(inspect_door(&doors, at, &keys(0)), Some((0, DoorOutcome::Open)));
        assert_eq!(inspect_door(&doors, Pos::new(4, 3), &keys(1)), None);
    }

    #[test]
    fn lever_unlocks_its_door_regardless_of_state() {
        let mut doors = vec![Door::new(Pos::new(0, 1)), Door::new(Pos::new(0, 2))];
        doors[1].locked = false;
        let mut levers = vec![
            Lever::new(Pos::new(4, 4), 0),
            Lever::new(Pos::new(6, 6), 1),
        ];

        let pull = pull_lever(&mut levers, &mut doors, Pos::new(4, 4)).unwrap();
        assert_eq!(pull, LeverPull { lever_idx: 0, door_idx: 0, door_found: true });
        assert!(!doors[0].locked);

        let pull = pull_lever(&mut levers, &mut doors, Pos::new(6, 6)).unwrap();
        assert_eq!(pull.door_idx, 1);
        assert!(!doors[1].locked);

        // Already activated
        assert_eq!(pull_lever(&mut levers, &mut doors, Pos::new(4, 4)), None);
    }

    #[test]
    fn lever_without_door_still_activates() {
        let mut doors: Vec<Door> = vec![];
        let mut levers = vec![Lever::new(Pos::new(2, 2), 3)];
        let pull = pull_lever(&mut levers, &mut doors, Pos::new(2, 2)).unwrap();
        assert!(!pull.door_found);
        assert!(levers[0].activated);
    }

    #[test]
    fn riddle_accepts_any_case_and_padding() {
        let mut doors = vec![Door::new(Pos::new(3, 3))];
        let mut inv = keys(1);
        let mut prompt = RiddlePrompt::new(0);
        for c in "Man ".chars() {
            prompt.push(c);
        }
        assert_eq!(prompt.submit(&mut doors, &mut inv), RiddleVerdict::Solved);
        assert!(!doors[0].locked);
        assert_eq!(inv.count(LootKind::Key), 0);
        assert!(prompt.answer.is_empty());
    }

    #[test]
    fn wrong_answer_changes_nothing_but_the_buffer() {
        let mut doors = vec![Door::new(Pos::new(3, 3))];
        let mut inv = keys(2);
        let mut prompt = RiddlePrompt::new(0);
        for c in "sphinx".chars() {
            prompt.push(c);
        }
        assert_eq!(prompt.submit(&mut doors, &mut inv), RiddleVerdict::Wrong);
        assert!(doors[0].locked);
        assert_eq!(inv.count(LootKind::Key), 2);
        assert!(prompt.answer.is_empty());
    }

    #[test]
    fn prompt_editing() {
        let mut prompt = RiddlePrompt::new(0);
        prompt.push('m');
        prompt.push('\u{7}');
        prompt.push('x');
        prompt.backspace();
        prompt.push('A');
        prompt.push('N');
        assert_eq!(prompt.answer, "mAN");
        assert!(prompt.is_correct());
    }
}
