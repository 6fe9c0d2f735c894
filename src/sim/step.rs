/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Timers (message line, tutorial read delay)
///   2. Player action (movement, interaction, or riddle input)
///   3. Collision check
///   4. Monster stepper (on its tick cadence)
///   5. Collision check
///
/// At most one player action is applied per frame. Once a monster reaches
/// the player the phase becomes `Slain` and later steps do nothing.

use log::{debug, info};

use crate::domain::ai;
use crate::domain::entity::{Action, MoveDir, Pos};
use crate::domain::interact::{self, DoorOutcome, RiddlePrompt, RiddleVerdict};
use crate::domain::rules;
use crate::domain::tutorial::Trigger;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, action: Option<Action>) -> Vec<GameEvent> {
    if world.is_over() { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_timers(world, &mut events);
    if let Some(action) = action {
        resolve_action(world, action, &mut events);
    }
    if resolve_collision(world, &mut events) { return events; }
    resolve_monsters(world, &mut events);
    resolve_collision(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

fn resolve_timers(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 { world.message.clear(); }
    }
    let advanced = world.tutorial.tick(world.speed.tutorial_read_ticks);
    note_tutorial(world, advanced, events);
}

fn advance_tutorial(world: &mut WorldState, trigger: Trigger, events: &mut Vec<GameEvent>) {
    let advanced = world.tutorial.notify(trigger);
    note_tutorial(world, advanced, events);
}

fn note_tutorial(world: &WorldState, advanced: Option<usize>, events: &mut Vec<GameEvent>) {
    if let Some(step) = advanced {
        events.push(GameEvent::TutorialAdvanced { step });
        if world.tutorial.is_finished() {
            info!("tutorial complete at tick {}", world.tick);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Player action
// ══════════════════════════════════════════════════════════════

fn resolve_action(world: &mut WorldState, action: Action, events: &mut Vec<GameEvent>) {
    // Riddle prompt is modal: it captures every action until closed
    if world.riddle.is_some() {
        resolve_riddle_input(world, action, events);
        return;
    }

    match action {
        Action::Move(dir) => resolve_player_movement(world, dir, events),
        Action::Interact => resolve_interact(world, events),
        // Text entry only means something inside the riddle prompt
        Action::Text(_) | Action::Backspace | Action::Confirm | Action::Cancel => {}
    }
}

fn resolve_player_movement(world: &mut WorldState, dir: MoveDir, events: &mut Vec<GameEvent>) {
    world.player.facing = dir;
    if let Some(dest) = rules::try_step(&world.grid, world.player.pos, dir) {
        world.player.pos = dest;
        events.push(GameEvent::PlayerMoved { to: dest });
        advance_tutorial(world, Trigger::Moved, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Interaction: chest → door → lever
// ══════════════════════════════════════════════════════════════

/// Resolve at the player's own cell; if nothing is there, try a door in
/// the wall the player is facing.
fn resolve_interact(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let here = world.player.pos;
    if interact_at(world, here, events) { return; }
    if let Some(front) = rules::facing_cell(here, world.player.facing) {
        interact_door(world, front, events);
    }
}

/// Act on the first kind of entity found at `at`. True if anything matched.
fn interact_at(world: &mut WorldState, at: Pos, events: &mut Vec<GameEvent>) -> bool {
    interact_chest(world, at, events)
        || interact_door(world, at, events)
        || interact_lever(world, at, events)
}

fn interact_chest(world: &mut WorldState, at: Pos, events: &mut Vec<GameEvent>) -> bool {
    let loot = match interact::open_chest(&mut world.chests, at, &mut world.player.inventory) {
        Some(l) => l,
        None => return false,
    };
    world.set_message(&format!("You found a {loot}!"));
    events.push(GameEvent::ChestOpened { loot });
    advance_tutorial(world, Trigger::ChestOpened, events);
    true
}

fn interact_door(world: &mut WorldState, at: Pos, events: &mut Vec<GameEvent>) -> bool {
    let (door, outcome) = match interact::inspect_door(&world.doors, at, &world.player.inventory) {
        Some(found) => found,
        None => return false,
    };
    match outcome {
        DoorOutcome::Open => {
            world.set_message("The door is open!");
            events.push(GameEvent::DoorOpen { door });
        }
        DoorOutcome::Locked => {
            world.set_message("The door is locked. You need a key.");
            events.push(GameEvent::DoorLocked { door });
        }
        DoorOutcome::Riddle => {
            world.riddle = Some(RiddlePrompt::new(door));
            world.set_message("A riddle blocks your way. Answer it!");
            events.push(GameEvent::RiddlePosed { door });
            advance_tutorial(world, Trigger::LockedDoorWithKey, events);
        }
    }
    true
}

fn interact_lever(world: &mut WorldState, at: Pos, events: &mut Vec<GameEvent>) -> bool {
    let pull = match interact::pull_lever(&mut world.levers, &mut world.doors, at) {
        Some(p) => p,
        None => return false,
    };
    if pull.door_found {
        debug!("lever {} unlocked door {}", pull.lever_idx, pull.door_idx);
    } else {
        debug!("lever {} is wired to missing door {}", pull.lever_idx, pull.door_idx);
    }
    world.set_message("You hear a door unlock in the distance.");
    events.push(GameEvent::LeverPulled { lever: pull.lever_idx, door: pull.door_idx });
    advance_tutorial(world, Trigger::LeverPulled, events);
    true
}

// ══════════════════════════════════════════════════════════════
// Riddle prompt
// ══════════════════════════════════════════════════════════════

fn resolve_riddle_input(world: &mut WorldState, action: Action, events: &mut Vec<GameEvent>) {
    let prompt = match world.riddle.as_mut() {
        Some(p) => p,
        None => return,
    };

    match action {
        Action::Text(c) => prompt.push(c),
        Action::Backspace => prompt.backspace(),
        Action::Confirm => {
            let door = prompt.door_idx;
            match prompt.submit(&mut world.doors, &mut world.player.inventory) {
                RiddleVerdict::Solved => {
                    world.riddle = None;
                    debug!("riddle for door {door} solved");
                    world.set_message("You solved the riddle! The door unlocks.");
                    events.push(GameEvent::RiddleSolved { door });
                    advance_tutorial(world, Trigger::RiddleSolved, events);
                }
                RiddleVerdict::Wrong => {
                    world.set_message("Wrong answer. Try again.");
                    events.push(GameEvent::RiddleWrong);
                }
            }
        }
        Action::Cancel => {
            world.riddle = None;
            world.set_message("You step back from the door.");
            events.push(GameEvent::RiddleDismissed);
        }
        // Movement and interaction are blocked while answering
        Action::Move(_) | Action::Interact => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Monsters
// ══════════════════════════════════════════════════════════════

fn resolve_monsters(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !world.monster_clock.tick() { return; }
    ai::wander(&world.grid, &mut world.monsters, &mut world.rng);
    events.push(GameEvent::MonstersStepped);
}

/// End the session if a monster shares the player's cell.
fn resolve_collision(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let kind = match ai::monster_at(&world.monsters, world.player.pos) {
        Some(m) => m.kind,
        None => return false,
    };
    world.phase = Phase::Slain(kind);
    world.riddle = None;
    world.set_message(&format!("You were slain by a {kind}! Game Over."));
    events.push(GameEvent::PlayerSlain { kind });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::{Chest, Door, Lever, LootKind, Monster, MonsterKind};
    use crate::domain::grid::Grid;
    use crate::domain::rng::GameRng;

    /// Bordered room of floor, w x h.
    fn open_room(w: usize, h: usize) -> Grid {
        let rows: Vec<String> = (0..h)
            .map(|y| {
                (0..w)
                    .map(|x| if x == 0 || y == 0 || x + 1 == w || y + 1 == h { '#' } else { ' ' })
                    .collect()
            })
            .collect();
        let refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        Grid::from_rows(&refs)
    }

    /// World with a slow monster clock so monsters only move when asked.
    fn world_in(grid: Grid, spawn: Pos) -> WorldState {
        let mut speed = GameConfig::default().speed;
        speed.monster_move_interval = 1_000;
        speed.tutorial_read_ticks = 1_000;
        WorldState::new(grid, spawn, speed, GameRng::new(0))
    }

    fn type_answer(world: &mut WorldState, text: &str) {
        for c in text.chars() {
            step(world, Some(Action::Text(c)));
        }
    }

    fn keys(world: &WorldState) -> u32 {
        world.player.inventory.count(LootKind::Key)
    }

    // ── Chest ──

    #[test]
    fn chest_scenario_yields_key_once() {
        let mut w = world_in(open_room(20, 15), Pos::new(5, 5));
        w.chests.push(Chest::new(Pos::new(5, 5), LootKind::Key));

        let events = step(&mut w, Some(Action::Interact));
        assert!(events.contains(&GameEvent::ChestOpened { loot: LootKind::Key }));
        assert_eq!(keys(&w), 1);
        assert!(w.chests[0].opened);
        assert_eq!(w.message, "You found a key!");

        let events = step(&mut w, Some(Action::Interact));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::ChestOpened { .. })));
        assert_eq!(keys(&w), 1);
    }

    #[test]
    fn chest_takes_priority_over_lever() {
        let mut w = world_in(open_room(8, 8), Pos::new(3, 3));
        w.doors.push(Door::new(Pos::new(0, 3)));
        w.chests.push(Chest::new(Pos::new(3, 3), LootKind::Relic));
        w.levers.push(Lever::new(Pos::new(3, 3), 0));

        step(&mut w, Some(Action::Interact));
        assert!(w.chests[0].opened);
        assert!(!w.levers[0].activated);

        // Chest spent: the lever is next in line
        step(&mut w, Some(Action::Interact));
        assert!(w.levers[0].activated);
        assert!(!w.doors[0].locked);
    }

    #[test]
    fn interacting_with_nothing_is_silent() {
        let mut w = world_in(open_room(8, 8), Pos::new(3, 3));
        let events = step(&mut w, Some(Action::Interact));
        assert!(events.is_empty());
        assert!(w.message.is_empty());
    }

    // ── Doors and riddles ──

    #[test]
    fn locked_door_without_key_stays_locked() {
        let mut w = world_in(open_room(8, 8), Pos::new(3, 3));
        w.doors.push(Door::new(Pos::new(3, 3)));

        let events = step(&mut w, Some(Action::Interact));
        assert!(events.contains(&GameEvent::DoorLocked { door: 0 }));
        assert_eq!(w.message, "The door is locked. You need a key.");
        assert!(w.doors[0].locked);
        assert!(w.riddle.is_none());
    }

    #[test]
    fn riddle_scenario_unlocks_and_spends_key() {
        let mut w = world_in(open_room(8, 8), Pos::new(3, 3));
        w.doors.push(Door::new(Pos::new(3, 3)));
        w.player.inventory.add(LootKind::Key);

        let events = step(&mut w, Some(Action::Interact));
        assert!(events.contains(&GameEvent::RiddlePosed { door: 0 }));
        assert_eq!(w.riddle, Some(RiddlePrompt::new(0)));
        assert!(w.doors[0].locked, "door waits for the answer");

        type_answer(&mut w, "Man ");
        let events = step(&mut w, Some(Action::Confirm));
        assert!(events.contains(&GameEvent::RiddleSolved { door: 0 }));
        assert!(!w.doors[0].locked);
        assert_eq!(keys(&w), 0);
        assert!(w.riddle.is_none());
    }

    #[test]
    fn wrong_answer_keeps_prompt_open() {
        let mut w = world_in(open_room(8, 8), Pos::new(3, 3));
        w.doors.push(Door::new(Pos::new(3, 3)));
        w.player.inventory.add(LootKind::Key);
        step(&mut w, Some(Action::Interact));

        type_answer(&mut w, "woman");
        let events = step(&mut w, Some(Action::Confirm));
        assert!(events.contains(&GameEvent::RiddleWrong));
        assert_eq!(w.message, "Wrong answer. Try again.");
        assert!(w.doors[0].locked);
        assert_eq!(keys(&w), 1);
        let prompt = w.riddle.as_ref().unwrap();
        assert!(prompt.answer.is_empty());

        type_answer(&mut w, "MAN");
        step(&mut w, Some(Action::Confirm));
        assert!(!w.doors[0].locked);
    }

    #[test]
    fn door_in_facing_wall_is_reachable() {
        let mut w = world_in(open_room(8, 8), Pos::new(1, 3));
        w.doors.push(Door::new(Pos::new(0, 3)));
        w.player.inventory.add(LootKind::Key);

        // Bump the wall to face it; the move is blocked
        step(&mut w, Some(Action::Move(MoveDir::Left)));
        assert_eq!(w.player.pos, Pos::new(1, 3));
        let events = step(&mut w, Some(Action::Interact));
        assert!(events.contains(&GameEvent::RiddlePosed { door: 0 }));
    }

    #[test]
    fn riddle_blocks_movement_and_interaction() {
        let mut w = world_in(open_room(8, 8), Pos::new(3, 3));
        w.doors.push(Door::new(Pos::new(3, 3)));
        w.chests.push(Chest::new(Pos::new(3, 3), LootKind::Key));
        w.player.inventory.add(LootKind::Key);
        // Chest first, then door
        step(&mut w, Some(Action::Interact));
        step(&mut w, Some(Action::Interact));
        assert!(w.riddle.is_some());

        step(&mut w, Some(Action::Move(MoveDir::Right)));
        assert_eq!(w.player.pos, Pos::new(3, 3));
        let events = step(&mut w, Some(Action::Interact));
        assert!(events.is_empty());
        assert_eq!(keys(&w), 2);
    }

    #[test]
    fn cancel_dismisses_riddle_and_keeps_key() {
        let mut w = world_in(open_room(8, 8), Pos::new(3, 3));
        w.doors.push(Door::new(Pos::new(3, 3)));
        w.player.inventory.add(LootKind::Key);
        step(&mut w, Some(Action::Interact));
        type_answer(&mut w, "ma");

        let events = step(&mut w, Some(Action::Cancel));
        assert!(events.contains(&GameEvent::RiddleDismissed));
        assert!(w.riddle.is_none());
        assert!(w.doors[0].locked);
        assert_eq!(keys(&w), 1);
    }

    #[test]
    fn open_door_reports_without_change() {
        let mut w = world_in(open_room(8, 8), Pos::new(3, 3));
        let mut door = Door::new(Pos::new(3, 3));
        door.locked = false;
        w.doors.push(door);
        w.player.inventory.add(LootKind::Key);

        let events = step(&mut w, Some(Action::Interact));
        assert!(events.contains(&GameEvent::DoorOpen { door: 0 }));
        assert_eq!(w.message, "The door is open!");
        assert!(w.riddle.is_none());
        assert_eq!(keys(&w), 1);
    }

    // ── Levers ──

    #[test]
    fn lever_unlocks_bound_door_once() {
        let mut w = world_in(open_room(8, 8), Pos::new(2, 2));
        w.doors.push(Door::new(Pos::new(0, 4)));
        w.doors.push(Door::new(Pos::new(7, 4)));
        w.levers.push(Lever::new(Pos::new(2, 2), 1));

        let events = step(&mut w, Some(Action::Interact));
        assert!(events.contains(&GameEvent::LeverPulled { lever: 0, door: 1 }));
        assert!(w.doors[0].locked);
        assert!(!w.doors[1].locked);
        assert_eq!(w.message, "You hear a door unlock in the distance.");

        let events = step(&mut w, Some(Action::Interact));
        assert!(events.is_empty());
    }

    // ── Movement ──

    #[test]
    fn movement_respects_walls() {
        let grid = Grid::from_rows(&[
            "#####",
            "#  ##",
            "#####",
        ]);
        let mut w = world_in(grid, Pos::new(1, 1));
        let events = step(&mut w, Some(Action::Move(MoveDir::Right)));
        assert_eq!(events, vec![GameEvent::PlayerMoved { to: Pos::new(2, 1) }, GameEvent::TutorialAdvanced { step: 1 }]);
        step(&mut w, Some(Action::Move(MoveDir::Right)));
        assert_eq!(w.player.pos, Pos::new(2, 1));
        assert_eq!(w.player.facing, MoveDir::Right);
    }

    // ── Tutorial ──

    #[test]
    fn tutorial_follows_gameplay() {
        let mut w = world_in(open_room(8, 8), Pos::new(2, 2));
        w.chests.push(Chest::new(Pos::new(3, 2), LootKind::Key));

        // Opening the chest before moving does not skip step 0
        w.chests.push(Chest::new(Pos::new(2, 2), LootKind::Relic));
        step(&mut w, Some(Action::Interact));
        assert_eq!(w.tutorial.cursor(), 0);

        step(&mut w, Some(Action::Move(MoveDir::Right)));
        assert_eq!(w.tutorial.cursor(), 1);
        step(&mut w, Some(Action::Interact));
        assert_eq!(w.tutorial.cursor(), 2);
    }

    // ── Monsters and collision ──

    #[test]
    fn walking_into_monster_is_fatal() {
        let mut w = world_in(open_room(8, 8), Pos::new(2, 2));
        w.monsters.push(Monster::new(Pos::new(3, 2), MonsterKind::Skeleton));

        let events = step(&mut w, Some(Action::Move(MoveDir::Right)));
        assert!(events.contains(&GameEvent::PlayerSlain { kind: MonsterKind::Skeleton }));
        assert_eq!(w.phase, Phase::Slain(MonsterKind::Skeleton));
        assert_eq!(w.message, "You were slain by a skeleton! Game Over.");
        assert!(w.is_over());

        // Terminal: nothing moves afterwards
        assert!(step(&mut w, Some(Action::Move(MoveDir::Left))).is_empty());
        assert_eq!(w.player.pos, Pos::new(3, 2));
    }

    #[test]
    fn wandering_monster_eventually_reaches_player() {
        // One-cell corridor: the vampire's only open move is onto the player
        let grid = Grid::from_rows(&[
            "####",
            "#  #",
            "####",
        ]);
        let mut w = world_in(grid, Pos::new(2, 1));
        w.monster_clock = ai::MonsterClock::new(1);
        w.monsters.push(Monster::new(Pos::new(1, 1), MonsterKind::Vampire));

        let mut slain = false;
        for _ in 0..200 {
            let events = step(&mut w, None);
            if events.contains(&GameEvent::PlayerSlain { kind: MonsterKind::Vampire }) {
                slain = true;
                break;
            }
            assert!(events.contains(&GameEvent::MonstersStepped));
        }
        assert!(slain);
        assert!(w.message.contains("vampire"));
    }

    #[test]
    fn monsters_wait_for_their_cadence() {
        let mut w = world_in(open_room(8, 8), Pos::new(1, 1));
        w.monster_clock = ai::MonsterClock::new(15);
        w.monsters.push(Monster::new(Pos::new(5, 5), MonsterKind::Ghost));

        for _ in 0..14 {
            assert!(!step(&mut w, None).contains(&GameEvent::MonstersStepped));
        }
        assert!(step(&mut w, None).contains(&GameEvent::MonstersStepped));
    }

    #[test]
    fn message_timer_clears_line() {
        let mut w = world_in(open_room(8, 8), Pos::new(3, 3));
        w.speed.message_ticks = 2;
        w.doors.push(Door::new(Pos::new(3, 3)));
        step(&mut w, Some(Action::Interact));
        assert!(!w.message.is_empty());
        step(&mut w, None);
        step(&mut w, None);
        assert!(w.message.is_empty());
    }
}
