/// Sound engine: procedural effects plus file-backed sword cue and music.
///
/// Interaction cues are generated as in-memory WAV buffers at init time,
/// so they never depend on files. The sword cue and the background track
/// come from the configured asset paths; a missing or undecodable file is
/// logged and that sound stays silent.
///
/// Playback is fire-and-forget (non-blocking) via rodio's Sink. Compile
/// without the "sound" feature to disable audio entirely (the stub
/// SoundEngine does nothing).

use std::path::Path;
use std::sync::Arc;

use crate::error::AssetError;

/// Read an audio asset into memory. Empty files are rejected up front.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
pub fn load_asset(path: &Path) -> Result<Arc<Vec<u8>>, AssetError> {
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io { path: display.clone(), source })?;
    if bytes.is_empty() {
        return Err(AssetError::Decode { path: display, reason: "file is empty".into() });
    }
    Ok(Arc::new(bytes))
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;

    use log::{info, warn};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use super::load_asset;
    use crate::error::AssetError;

    const SAMPLE_RATE: u32 = 22050;
    const MUSIC_VOLUME: f32 = 0.4;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_sword: Option<Arc<Vec<u8>>>,
        sfx_chest: Arc<Vec<u8>>,
        sfx_lever: Arc<Vec<u8>>,
        sfx_locked: Arc<Vec<u8>>,
        sfx_riddle: Arc<Vec<u8>>,
        sfx_solved: Arc<Vec<u8>>,
        sfx_wrong: Arc<Vec<u8>>,
        sfx_slain: Arc<Vec<u8>>,
        _music: Option<Sink>,
    }

    impl SoundEngine {
        pub fn new() -> Result<Self, AssetError> {
            let (stream, handle) = OutputStream::try_default().map_err(|_| AssetError::NoOutput)?;

            // ── Generate all sound buffers ──
            Ok(SoundEngine {
                _stream: stream,
                handle,
                sfx_sword: None,
                sfx_chest: Arc::new(make_wav(&gen_chest())),
                sfx_lever: Arc::new(make_wav(&gen_lever())),
                sfx_locked: Arc::new(make_wav(&gen_locked())),
                sfx_riddle: Arc::new(make_wav(&gen_riddle())),
                sfx_solved: Arc::new(make_wav(&gen_solved())),
                sfx_wrong: Arc::new(make_wav(&gen_wrong())),
                sfx_slain: Arc::new(make_wav(&gen_slain())),
                _music: None,
            })
        }

        /// Load the sword cue. On failure the cue stays silent.
        pub fn load_sword(&mut self, path: &Path) {
            match load_asset(path).and_then(|buf| check_decodes(path, buf)) {
                Ok(buf) => self.sfx_sword = Some(buf),
                Err(e) => warn!("sword sound unavailable: {e}"),
            }
        }

        /// Start the background track on an endless loop.
        pub fn start_music(&mut self, path: &Path) {
            match self.try_start_music(path) {
                Ok(sink) => {
                    info!("playing music {}", path.display());
                    self._music = Some(sink);
                }
                Err(e) => warn!("music unavailable: {e}"),
            }
        }

        fn try_start_music(&self, path: &Path) -> Result<Sink, AssetError> {
            let buf = load_asset(path)?;
            let src = Decoder::new(Cursor::new(buf.as_ref().clone())).map_err(|e| AssetError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            let sink = Sink::try_new(&self.handle).map_err(|_| AssetError::NoOutput)?;
            sink.set_volume(MUSIC_VOLUME);
            sink.append(src.repeat_infinite());
            Ok(sink)
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_sword(&self) {
            if let Some(buf) = &self.sfx_sword { self.play(buf); }
        }
        pub fn play_chest(&self) { self.play(&self.sfx_chest); }
        pub fn play_lever(&self) { self.play(&self.sfx_lever); }
        pub fn play_locked(&self) { self.play(&self.sfx_locked); }
        pub fn play_riddle(&self) { self.play(&self.sfx_riddle); }
        pub fn play_solved(&self) { self.play(&self.sfx_solved); }
        pub fn play_wrong(&self) { self.play(&self.sfx_wrong); }
        pub fn play_slain(&self) { self.play(&self.sfx_slain); }
    }

    fn check_decodes(path: &Path, buf: Arc<Vec<u8>>) -> Result<Arc<Vec<u8>>, AssetError> {
        Decoder::new(Cursor::new(buf.as_ref().clone())).map_err(|e| AssetError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(buf)
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn tone(freq: f32, t: f32) -> f32 {
        (t * freq * 2.0 * std::f32::consts::PI).sin()
    }

    /// Play `notes` back to back, each `note_dur` seconds, with a decaying envelope.
    fn gen_notes(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = tone(freq, t) * 0.7 + tone(freq * 3.0, t) * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Chest: bright ascending arpeggio
    fn gen_chest() -> Vec<f32> {
        gen_notes(&[784.0, 988.0, 1175.0], 0.05, 0.25)
    }

    /// Lever: mechanical clunk, noise over a low tone
    fn gen_lever() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.14) as usize;
        let mut rng: u32 = 4242;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(1.5);
                (tone(110.0, ti) * 0.5 + noise * 0.5) * env * 0.35
            })
            .collect()
    }

    /// Locked door: two dull low knocks
    fn gen_locked() -> Vec<f32> {
        let mut samples = gen_notes(&[150.0], 0.06, 0.35);
        samples.extend(std::iter::repeat(0.0).take((SAMPLE_RATE as f32 * 0.05) as usize));
        samples.extend(gen_notes(&[130.0], 0.08, 0.35));
        samples
    }

    /// Riddle posed: eerie minor wobble
    fn gen_riddle() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.4) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let vibrato = 1.0 + (ti * 6.0 * 2.0 * std::f32::consts::PI).sin() * 0.02;
                let env = (t * 8.0).min(1.0) * (1.0 - t);
                (tone(330.0 * vibrato, ti) * 0.6 + tone(392.0 * vibrato, ti) * 0.4) * env * 0.25
            })
            .collect()
    }

    /// Riddle solved: triumphant rising fanfare
    fn gen_solved() -> Vec<f32> {
        gen_notes(&[523.0, 659.0, 784.0, 1047.0], 0.09, 0.3)
    }

    /// Wrong answer: short falling buzz
    fn gen_wrong() -> Vec<f32> {
        gen_notes(&[311.0, 233.0], 0.09, 0.3)
    }

    /// Slain: sad descending tone with a final fade
    fn gen_slain() -> Vec<f32> {
        let mut samples = gen_notes(&[440.0, 370.0, 311.0, 261.0], 0.14, 0.3);
        let total = samples.len();
        let fade_len = total / 4;
        for (i, s) in samples.iter_mut().enumerate().skip(total - fade_len) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Result<Self, AssetError> { Ok(SoundEngine) }
    pub fn load_sword(&mut self, _path: &Path) {}
    pub fn start_music(&mut self, _path: &Path) {}
    pub fn play_sword(&self) {}
    pub fn play_chest(&self) {}
    pub fn play_lever(&self) {}
    pub fn play_locked(&self) {}
    pub fn play_riddle(&self) {}
    pub fn play_solved(&self) {}
    pub fn play_wrong(&self) {}
    pub fn play_slain(&self) {}
}
