/// Error types.
///
/// Gameplay never fails: blocked moves, empty interactions and wrong
/// answers are messages. Only asset loading and world generation report
/// errors, and only generation is fatal.

use thiserror::Error;

/// Sound or music asset could not be used. Always non-fatal.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("no audio output device")]
    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    NoOutput,
}

/// World generation failed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GenError {
    #[error("a {width}x{height} dungeon has no floor for the player to stand on")]
    NoFloor { width: usize, height: usize },
}
