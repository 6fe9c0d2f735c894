/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete; with no
/// file at all the game plays exactly like the classic 20x15 dungeon.

use log::{info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Smallest accepted dungeon side: border + inset-2 monster region.
pub const MIN_SIDE: usize = 5;
/// Largest accepted side; the map is drawn unscrolled, two columns per tile.
pub const MAX_SIDE: usize = 128;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub dungeon: DungeonConfig,
    pub speed: SpeedConfig,
    pub audio: AudioConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct DungeonConfig {
    pub width: usize,
    pub height: usize,
    pub chests: usize,
    pub doors: usize,
    pub levers: usize,
    pub monsters: usize,
    pub torches: usize,
    pub placement_attempts: usize,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub frame_ms: u64,
    pub monster_move_interval: u32,
    pub message_ticks: u32,        // 0 = message stays until replaced
    pub tutorial_read_ticks: u32,
    pub slain_linger_ms: u64,
}

#[derive(Clone, Debug)]
pub struct AudioConfig {
    pub enabled: bool,
    pub sfx: PathBuf,
    pub music: PathBuf,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub interact: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    dungeon: TomlDungeon,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlDungeon {
    #[serde(default = "default_width")]
    width: usize,
    #[serde(default = "default_height")]
    height: usize,
    #[serde(default = "default_chests")]
    chests: usize,
    #[serde(default = "default_doors")]
    doors: usize,
    #[serde(default = "default_levers")]
    levers: usize,
    #[serde(default = "default_monsters")]
    monsters: usize,
    #[serde(default = "default_torches")]
    torches: usize,
    #[serde(default = "default_placement_attempts")]
    placement_attempts: usize,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_monster_interval")]
    monster_move_interval: u32,
    #[serde(default)]
    message_ticks: u32,
    #[serde(default = "default_tutorial_read")]
    tutorial_read_ticks: u32,
    #[serde(default = "default_slain_linger")]
    slain_linger_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_audio_enabled")]
    enabled: bool,
    #[serde(default = "default_sfx")]
    sfx: String,
    #[serde(default = "default_music")]
    music: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_interact")]
    interact: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

// ── Defaults ──

fn default_width() -> usize { 20 }     // 640px / 32px tiles
fn default_height() -> usize { 15 }    // 480px / 32px tiles
fn default_chests() -> usize { 4 }
fn default_doors() -> usize { 2 }
fn default_levers() -> usize { 2 }
fn default_monsters() -> usize { 4 }
fn default_torches() -> usize { 6 }
fn default_placement_attempts() -> usize { 1000 }

fn default_frame_ms() -> u64 { 16 }            // ~60 FPS
fn default_monster_interval() -> u32 { 15 }    // 4 monster steps per second
fn default_tutorial_read() -> u32 { 240 }      // 4s at 60 FPS
fn default_slain_linger() -> u64 { 1500 }

fn default_audio_enabled() -> bool { true }
fn default_sfx() -> String { "asset/sfx/sword_attack.wav".into() }
fn default_music() -> String { "asset/music/gothic-candlelight-gothic-mystery-soundtrack-1987.mp3".into() }

fn default_interact() -> Vec<String> { vec!["A".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlDungeon {
    fn default() -> Self {
        TomlDungeon {
            width: default_width(),
            height: default_height(),
            chests: default_chests(),
            doors: default_doors(),
            levers: default_levers(),
            monsters: default_monsters(),
            torches: default_torches(),
            placement_attempts: default_placement_attempts(),
            seed: None,
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            frame_ms: default_frame_ms(),
            monster_move_interval: default_monster_interval(),
            message_ticks: 0,
            tutorial_read_ticks: default_tutorial_read(),
            slain_linger_ms: default_slain_linger(),
        }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio {
            enabled: default_audio_enabled(),
            sfx: default_sfx(),
            music: default_music(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            interact: default_interact(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config text directly (no file lookup). Asset paths stay relative.
    #[cfg(test)]
    fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(cfg, &[]))
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let width = clamp_side("width", cfg.dungeon.width);
        let height = clamp_side("height", cfg.dungeon.height);

        GameConfig {
            dungeon: DungeonConfig {
                width,
                height,
                chests: cfg.dungeon.chests,
                doors: cfg.dungeon.doors,
                levers: cfg.dungeon.levers,
                monsters: cfg.dungeon.monsters,
                torches: cfg.dungeon.torches,
                placement_attempts: cfg.dungeon.placement_attempts.max(1),
                seed: cfg.dungeon.seed,
            },
            speed: SpeedConfig {
                frame_ms: cfg.speed.frame_ms,
                monster_move_interval: cfg.speed.monster_move_interval.max(1),
                message_ticks: cfg.speed.message_ticks,
                tutorial_read_ticks: cfg.speed.tutorial_read_ticks,
                slain_linger_ms: cfg.speed.slain_linger_ms,
            },
            audio: AudioConfig {
                enabled: cfg.audio.enabled,
                sfx: resolve_asset(&cfg.audio.sfx, search_dirs),
                music: resolve_asset(&cfg.audio.music, search_dirs),
            },
            gamepad: GamepadConfig {
                interact: cfg.gamepad.interact,
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
            },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &[])
    }
}

fn clamp_side(name: &str, value: usize) -> usize {
    if value < MIN_SIDE {
        warn!("dungeon {name} {value} is below {MIN_SIDE}; using {MIN_SIDE}");
        MIN_SIDE
    } else if value > MAX_SIDE {
        warn!("dungeon {name} {value} is above {MAX_SIDE}; using {MAX_SIDE}");
        MAX_SIDE
    } else {
        value
    }
}

/// Absolute paths are kept; relative ones are looked up in the candidate
/// dirs, defaulting to CWD-relative.
fn resolve_asset(path: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(p))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| p.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    info!("loaded {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    warn!("config.toml parse error: {e}; using default settings");
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                warn!("could not read {}: {e}", path.display());
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_dungeon() {
        let cfg = GameConfig::default();
        assert_eq!((cfg.dungeon.width, cfg.dungeon.height), (20, 15));
        assert_eq!(cfg.dungeon.chests, 4);
        assert_eq!(cfg.dungeon.doors, 2);
        assert_eq!(cfg.dungeon.levers, 2);
        assert_eq!(cfg.dungeon.monsters, 4);
        assert_eq!(cfg.speed.monster_move_interval, 15);
        assert_eq!(cfg.dungeon.seed, None);
        assert_eq!(cfg.gamepad.interact, vec!["A".to_string()]);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = GameConfig::from_toml_str("[dungeon]\nseed = 42\nmonsters = 0\n\n[speed]\nframe_ms = 33\n").unwrap();
        assert_eq!(cfg.dungeon.seed, Some(42));
        assert_eq!(cfg.dungeon.monsters, 0);
        assert_eq!(cfg.dungeon.width, 20);
        assert_eq!(cfg.speed.frame_ms, 33);
        assert_eq!(cfg.speed.tutorial_read_ticks, 240);
        assert!(cfg.audio.enabled);
    }

    #[test]
    fn undersized_values_are_clamped() {
        let cfg = GameConfig::from_toml_str(
            "[dungeon]\nwidth = 2\nheight = 0\nplacement_attempts = 0\n[speed]\nmonster_move_interval = 0\n",
        ).unwrap();
        assert_eq!(cfg.dungeon.width, MIN_SIDE);
        assert_eq!(cfg.dungeon.height, MIN_SIDE);
        assert_eq!(cfg.dungeon.placement_attempts, 1);
        assert_eq!(cfg.speed.monster_move_interval, 1);
    }

    #[test]
    fn oversized_values_are_clamped() {
        let cfg = GameConfig::from_toml_str(
            "[dungeon]\nwidth = 1000000\nheight = 4000\n",
        ).unwrap();
        assert_eq!(cfg.dungeon.width, MAX_SIDE);
        assert_eq!(cfg.dungeon.height, MAX_SIDE);
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(GameConfig::from_toml_str("[dungeon\nwidth = ").is_err());
    }

    #[test]
    fn relative_asset_without_candidates_stays_relative() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.audio.sfx, PathBuf::from("asset/sfx/sword_attack.wav"));
    }
}
