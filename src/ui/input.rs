/// Keyboard input.
///
/// Each frame drains every pending terminal event. Presses are queued raw
/// and classified into commands only when they are applied, because the
/// meaning depends on whether the riddle prompt is open at that moment:
/// while it is, printable keys are answer text and movement keys type
/// letters instead of walking.
///
/// Release events are ignored, so holding a key relies on the terminal's
/// auto-repeat (Press/Repeat) for repeated steps.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::{Action, MoveDir};
use super::gamepad::{classify_pad, PadPress};

/// What a key press asks the game to do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyCommand {
    Act(Action),
    Quit,
}

/// A press from either device, waiting in the action queue.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Press {
    Key(KeyEvent),
    Pad(PadPress),
}

impl Press {
    pub fn classify(&self, riddle_open: bool) -> Option<KeyCommand> {
        match self {
            Press::Key(key) => classify_key(key, riddle_open),
            Press::Pad(pad) => classify_pad(*pad, riddle_open),
        }
    }
}

pub struct InputState {
    /// Key presses collected during the most recent drain, in arrival order.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { raw_events: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind != KeyEventKind::Release {
                    self.raw_events.push(key);
                }
            }
        }
    }

    /// This frame's presses, in arrival order.
    pub fn presses(&self) -> impl Iterator<Item = Press> + '_ {
        self.raw_events.iter().copied().map(Press::Key)
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(is_ctrl_c)
    }
}

fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL)
        && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
}

/// Map one key press to a command. Ctrl+C is handled by the caller.
pub fn classify_key(key: &KeyEvent, riddle_open: bool) -> Option<KeyCommand> {
    if is_ctrl_c(key) { return None; }

    if riddle_open {
        let action = match key.code {
            KeyCode::Enter => Action::Confirm,
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Esc => Action::Cancel,
            KeyCode::Char(c) => Action::Text(c),
            _ => return None,
        };
        return Some(KeyCommand::Act(action));
    }

    let cmd = match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => KeyCommand::Act(Action::Move(MoveDir::Left)),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => KeyCommand::Act(Action::Move(MoveDir::Right)),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => KeyCommand::Act(Action::Move(MoveDir::Up)),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => KeyCommand::Act(Action::Move(MoveDir::Down)),
        KeyCode::Char(' ') | KeyCode::Char('e') | KeyCode::Char('E') => KeyCommand::Act(Action::Interact),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyCommand::Quit,
        _ => return None,
    };
    Some(cmd)
}
