/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Move (one step per press)
///   A                     →  Interact
///   Start                 →  Submit riddle answer
///   Select                →  Dismiss riddle / Quit
///
/// Without the `gamepad` feature the tracker never reports a press.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use log::info;

use crate::config::GamepadConfig;
use crate::domain::entity::{Action, MoveDir};
use super::input::KeyCommand;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South        => Some(Btn::A),
            Button::East         => Some(Btn::B),
            Button::West         => Some(Btn::X),
            Button::North        => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start        => Some(Btn::Start),
            Button::Select       => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Clone, Debug, PartialEq)]
struct ActionMap {
    interact: Vec<Btn>,
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl ActionMap {
    /// Empty or unrecognised lists keep the default.
    fn apply(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let it = parse_list(&cfg.interact);
        if !it.is_empty() { self.interact = it; }
        let cf = parse_list(&cfg.confirm);
        if !cf.is_empty() { self.confirm = cf; }
        let ca = parse_list(&cfg.cancel);
        if !ca.is_empty() { self.cancel = ca; }
    }
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            interact: vec![Btn::A],
            confirm:  vec![Btn::Start],
            cancel:   vec![Btn::Select],
        }
    }
}

/// One gamepad press after button mapping, still independent of the
/// riddle prompt. See `classify_pad`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PadPress {
    Dir(MoveDir),
    Interact,
    Confirm,
    Cancel,
}

/// Edge presses collected during one frame.
#[derive(Clone, Debug, Default)]
struct Presses {
    buttons: [bool; BTN_COUNT],
    dir: Option<MoveDir>,
}

impl Presses {
    fn any(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize])
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    presses: Presses,

    // Stick position, turned into edge presses on crossing the deadzone
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_dir: Option<MoveDir>,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(_) => (None, false),
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            presses: Presses::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            stick_dir: None,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map.apply(cfg);
    }

    pub fn update(&mut self) {
        self.presses = Presses::default();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    /// This frame's presses resolved to logical roles, in a fixed order.
    pub fn presses(&self) -> Vec<PadPress> {
        pad_presses(&self.presses, &self.action_map)
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press_button(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    info!("gamepad disconnected");
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }

        // Stick acts like a D-pad: one step each time it leaves the center
        let dir = stick_direction(self.stick_x, self.stick_y);
        if dir.is_some() && dir != self.stick_dir && self.presses.dir.is_none() {
            self.presses.dir = dir;
        }
        self.stick_dir = dir;
    }

    #[cfg(feature = "gamepad")]
    fn press_button(&mut self, gilrs_btn: Button) {
        let dir = match gilrs_btn {
            Button::DPadUp    => Some(MoveDir::Up),
            Button::DPadDown  => Some(MoveDir::Down),
            Button::DPadLeft  => Some(MoveDir::Left),
            Button::DPadRight => Some(MoveDir::Right),
            _ => None,
        };
        if dir.is_some() {
            self.presses.dir = dir;
            return;
        }
        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.presses.buttons[btn as usize] = true;
        }
    }
}

/// Dominant stick axis outside the deadzone. Stick Y grows upward.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_direction(x: f32, y: f32) -> Option<MoveDir> {
    if x.abs() <= STICK_DEADZONE && y.abs() <= STICK_DEADZONE {
        return None;
    }
    if x.abs() >= y.abs() {
        Some(if x < 0.0 { MoveDir::Left } else { MoveDir::Right })
    } else {
        Some(if y > 0.0 { MoveDir::Up } else { MoveDir::Down })
    }
}

fn pad_presses(p: &Presses, map: &ActionMap) -> Vec<PadPress> {
    let mut out = Vec::new();
    if let Some(dir) = p.dir { out.push(PadPress::Dir(dir)); }
    if p.any(&map.interact) { out.push(PadPress::Interact); }
    if p.any(&map.confirm) { out.push(PadPress::Confirm); }
    if p.any(&map.cancel) { out.push(PadPress::Cancel); }
    out
}

/// Map one pad press to a command in the keyboard vocabulary.
pub fn classify_pad(press: PadPress, riddle_open: bool) -> Option<KeyCommand> {
    if riddle_open {
        // No on-screen keyboard: a pad can only submit or back out
        return match press {
            PadPress::Confirm => Some(KeyCommand::Act(Action::Confirm)),
            PadPress::Cancel => Some(KeyCommand::Act(Action::Cancel)),
            _ => None,
        };
    }
    match press {
        PadPress::Dir(dir) => Some(KeyCommand::Act(Action::Move(dir))),
        PadPress::Interact => Some(KeyCommand::Act(Action::Interact)),
        PadPress::Confirm => None,
        PadPress::Cancel => Some(KeyCommand::Quit),
    }
}
