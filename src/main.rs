/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn, LevelFilter};

use config::GameConfig;
use domain::entity::LootKind;
use sim::event::GameEvent;
use sim::level;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KeyCommand, Press};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const LOG_FILE: &str = "gothic-crawler.log";

/// Presses beyond this many pending are dropped.
const MAX_QUEUED_PRESSES: usize = 16;

fn main() {
    init_logging();
    let config = GameConfig::load();

    let mut world = match level::generate_world(&config) {
        Ok(w) => w,
        Err(e) => {
            error!("world generation failed: {e}");
            eprintln!("Could not build the dungeon: {e}");
            std::process::exit(1);
        }
    };

    let sound = start_audio(&config);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    if let Some(sfx) = &sound {
        sfx.play_sword();
    }

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop stopped: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    match world.phase {
        Phase::Slain(kind) => println!("You were slain by a {kind}. Game Over."),
        Phase::Playing => println!("You leave the crypt alive."),
    }
    let inv = &world.player.inventory;
    println!(
        "Keys: {} | Relics: {}",
        inv.count(LootKind::Key),
        inv.count(LootKind::Relic),
    );
}

/// Log to a file so records never land on the game screen.
/// Filter comes from RUST_LOG, defaulting to info.
fn init_logging() {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder.parse_env(env_logger::Env::default());

    match OpenOptions::new().create(true).append(true).open(LOG_FILE) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            // Only warnings reach stderr while the screen is in raw mode
            builder.filter_level(LevelFilter::Warn);
            builder.target(env_logger::Target::Stderr);
        }
    }
    // A logger may already be installed (tests); ignore
    let _ = builder.try_init();
}

/// Audio is optional: any failure leaves the game silent.
fn start_audio(config: &GameConfig) -> Option<SoundEngine> {
    if !config.audio.enabled {
        info!("audio disabled in config");
        return None;
    }
    match SoundEngine::new() {
        Ok(mut sfx) => {
            sfx.load_sword(&config.audio.sfx);
            sfx.start_music(&config.audio.music);
            Some(sfx)
        }
        Err(e) => {
            warn!("running without sound: {e}");
            None
        }
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad detected");
    }

    let frame = Duration::from_millis(config.speed.frame_ms);
    let mut pending: VecDeque<Press> = VecDeque::with_capacity(MAX_QUEUED_PRESSES);

    loop {
        let frame_start = Instant::now();
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            info!("quit via ctrl+c");
            break;
        }
        queue_presses(kb.presses().chain(gp.presses().into_iter().map(Press::Pad)), &mut pending);

        // One action per frame; the rest wait their turn
        let action = match next_command(world, &mut pending) {
            Some(KeyCommand::Quit) => {
                info!("quit at tick {}", world.tick);
                break;
            }
            Some(KeyCommand::Act(action)) => Some(action),
            None => None,
        };
        let events = step::step(world, action);
        for event in &events {
            debug!("{event:?}");
        }
        process_sound_events(sound, &events);

        renderer.render(world)?;

        if let Phase::Slain(kind) = world.phase {
            info!("slain by a {kind} at tick {}", world.tick);
            std::thread::sleep(Duration::from_millis(config.speed.slain_linger_ms));
            break;
        }

        if let Some(rest) = frame.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    Ok(())
}

fn queue_presses(presses: impl Iterator<Item = Press>, pending: &mut VecDeque<Press>) {
    for press in presses {
        if pending.len() < MAX_QUEUED_PRESSES {
            pending.push_back(press);
        } else {
            debug!("dropped {press:?}: queue full");
        }
    }
}

/// Pop presses until one means something right now. A press is read
/// against the current riddle state, not the one it arrived under.
fn next_command(world: &WorldState, pending: &mut VecDeque<Press>) -> Option<KeyCommand> {
    let riddle_open = world.riddle.is_some();
    while let Some(press) = pending.pop_front() {
        if let Some(cmd) = press.classify(riddle_open) {
            return Some(cmd);
        }
    }
    None
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::ChestOpened { .. } => sfx.play_chest(),
            GameEvent::DoorLocked { .. } => sfx.play_locked(),
            GameEvent::RiddlePosed { .. } => sfx.play_riddle(),
            GameEvent::RiddleSolved { .. } => sfx.play_solved(),
            GameEvent::RiddleWrong => sfx.play_wrong(),
            GameEvent::LeverPulled { .. } => sfx.play_lever(),
            GameEvent::PlayerSlain { .. } => sfx.play_slain(),
            _ => {}
        }
    }
}
