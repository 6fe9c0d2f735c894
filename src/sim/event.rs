/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound; tests use them to
/// observe what a step did.

use crate::domain::entity::{LootKind, MonsterKind, Pos};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PlayerMoved { to: Pos },
    ChestOpened { loot: LootKind },
    DoorOpen { door: usize },
    DoorLocked { door: usize },
    RiddlePosed { door: usize },
    RiddleSolved { door: usize },
    RiddleWrong,
    RiddleDismissed,
    LeverPulled { lever: usize, door: usize },
    MonstersStepped,
    TutorialAdvanced { step: usize },
    PlayerSlain { kind: MonsterKind },
}
