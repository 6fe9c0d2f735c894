/// Tutorial overlay: a cursor over a fixed list of instructions.
///
/// Each step names the trigger that completes it. A trigger only moves the
/// cursor when the cursor currently sits on that step, so doing things out
/// of order never skips ahead. Read-only steps complete after they have
/// been on screen long enough. The cursor never goes back and stops at
/// `STEPS.len()`, which hides the overlay.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Trigger {
    Moved,
    ChestOpened,
    LockedDoorWithKey,
    LeverPulled,
    RiddleSolved,
    /// Shown for the configured number of frames.
    Read,
}

pub struct Step {
    pub text: &'static str,
    pub trigger: Trigger,
}

pub const STEPS: [Step; 8] = [
    Step { text: "Use arrow keys to move.", trigger: Trigger::Moved },
    Step { text: "Walk to a chest (brown) and press SPACE to open.", trigger: Trigger::ChestOpened },
    Step { text: "Pick up a key or relic from a chest.", trigger: Trigger::Read },
    Step { text: "Find a locked door (dark) and press SPACE to unlock if you have a key.", trigger: Trigger::LockedDoorWithKey },
    Step { text: "Look for levers (gold) and press SPACE to activate.", trigger: Trigger::LeverPulled },
    Step { text: "Avoid monsters! If you touch one, you die.", trigger: Trigger::Read },
    Step { text: "Solve riddles when prompted at doors.", trigger: Trigger::RiddleSolved },
    Step { text: "Good luck exploring the gothic dungeon!", trigger: Trigger::Read },
];

#[derive(Clone, Debug, Default)]
pub struct Tutorial {
    cursor: usize,
    shown_ticks: u32,
}

impl Tutorial {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Instruction currently on screen, if the tutorial is still running.
    pub fn current(&self) -> Option<&'static str> {
        STEPS.get(self.cursor).map(|s| s.text)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= STEPS.len()
    }

    /// Report a gameplay trigger. Returns the new cursor if it advanced.
    pub fn notify(&mut self, trigger: Trigger) -> Option<usize> {
        let step = STEPS.get(self.cursor)?;
        if step.trigger != trigger {
            return None;
        }
        Some(self.advance())
    }

    /// Count one frame on the current step; completes `Read` steps after
    /// `read_ticks` frames. Returns the new cursor if it advanced.
    pub fn tick(&mut self, read_ticks: u32) -> Option<usize> {
        let step = STEPS.get(self.cursor)?;
        self.shown_ticks = self.shown_ticks.saturating_add(1);
        if step.trigger == Trigger::Read && self.shown_ticks >= read_ticks {
            return Some(self.advance());
        }
        None
    }

    fn advance(&mut self) -> usize {
        self.cursor = (self.cursor + 1).min(STEPS.len());
        self.shown_ticks = 0;
        self.cursor
    }
}
