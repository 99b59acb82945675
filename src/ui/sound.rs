/// Sound engine: named effect cues and looped background music via rodio.
///
/// Each cue is loaded from `<sounds_dir>/<cue>.wav` when present and
/// decodable; otherwise a procedural 8-bit tone is generated in memory.
/// Background tracks come from `bg_music.wav` / `bg_music_funny.wav`;
/// a missing track is logged and skipped.
///
/// Playback is fire-and-forget (non-blocking). Load or playback failures
/// are logged and never stop the game.
///
/// Compile without the "sound" feature to disable audio entirely (the
/// stub SoundEngine does nothing).

/// Named one-shot effects.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Cue {
    Bouncepad,
    GoldCollect,
    LevelCompleted,
    LoseLife,
    GameWon,
    GameLost,
}

impl Cue {
    pub const ALL: [Cue; 6] = [
        Cue::Bouncepad,
        Cue::GoldCollect,
        Cue::LevelCompleted,
        Cue::LoseLife,
        Cue::GameWon,
        Cue::GameLost,
    ];

    /// Asset file stem under the sounds directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            Cue::Bouncepad => "bouncepad",
            Cue::GoldCollect => "gold_collect",
            Cue::LevelCompleted => "level_completed",
            Cue::LoseLife => "lose_life",
            Cue::GameWon => "game_won",
            Cue::GameLost => "game_lost",
        }
    }
}

/// Background track selection (keys 1/2/3).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Music {
    Main,
    Funny,
    Off,
}

impl Music {
    pub fn file_stem(self) -> Option<&'static str> {
        match self {
            Music::Main => Some("bg_music"),
            Music::Funny => Some("bg_music_funny"),
            Music::Off => None,
        }
    }

    pub fn volume(self) -> f32 {
        match self {
            Music::Funny => 0.3,
            _ => 0.5,
        }
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::{BufReader, Cursor};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use rodio::decoder::LoopedDecoder;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::{Cue, Music};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        cues: HashMap<Cue, Arc<Vec<u8>>>,
        sounds_dir: PathBuf,
        music: RefCell<Option<Sink>>,
        current: Cell<Music>,
    }

    impl SoundEngine {
        pub fn new(sounds_dir: &Path) -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output: {e}; sound disabled");
                    return None;
                }
            };

            let cues = Cue::ALL
                .iter()
                .map(|&cue| (cue, Arc::new(load_or_synth(sounds_dir, cue))))
                .collect();

            Some(SoundEngine {
                _stream: stream,
                handle,
                cues,
                sounds_dir: sounds_dir.to_path_buf(),
                music: RefCell::new(None),
                current: Cell::new(Music::Off),
            })
        }

        pub fn play(&self, cue: Cue) {
            let Some(buf) = self.cues.get(&cue) else { return };
            match Sink::try_new(&self.handle) {
                Ok(sink) => {
                    let cursor = Cursor::new(buf.as_ref().clone());
                    match Decoder::new(cursor) {
                        Ok(src) => {
                            sink.append(src);
                            sink.detach(); // fire-and-forget
                        }
                        Err(e) => log::warn!("cannot decode {}: {e}", cue.file_stem()),
                    }
                }
                Err(e) => log::warn!("cannot play {}: {e}", cue.file_stem()),
            }
        }

        /// Switch background track. Re-selecting the current one is a no-op.
        pub fn play_music(&self, choice: Music) {
            if self.current.get() == choice {
                return;
            }
            self.stop_music();
            self.current.set(choice);

            let Some(stem) = choice.file_stem() else { return };
            let path = self.sounds_dir.join(format!("{stem}.wav"));
            let track = match open_track(&path) {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("{e}; music skipped");
                    return;
                }
            };
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("cannot start music: {e}");
                    return;
                }
            };
            sink.set_volume(choice.volume());
            sink.append(track);
            *self.music.borrow_mut() = Some(sink);
        }

        pub fn stop_music(&self) {
            if let Some(sink) = self.music.borrow_mut().take() {
                sink.stop();
            }
        }
    }

    /// Endless decoder over a background track file.
    fn open_track(path: &Path) -> Result<LoopedDecoder<BufReader<File>>, String> {
        let file = File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
        Decoder::new_looped(BufReader::new(file)).map_err(|e| format!("{}: {e}", path.display()))
    }

    /// File bytes if they decode, else a generated tone.
    fn load_or_synth(dir: &Path, cue: Cue) -> Vec<u8> {
        let path = dir.join(format!("{}.wav", cue.file_stem()));
        match std::fs::read(&path) {
            Ok(bytes) if Decoder::new(Cursor::new(bytes.clone())).is_ok() => {
                log::debug!("loaded {}", path.display());
                bytes
            }
            Ok(_) => {
                log::warn!("{} is not a playable WAV; using generated sound", path.display());
                make_wav(&synth(cue))
            }
            Err(e) => {
                log::warn!("{}: {e}; using generated sound", path.display());
                make_wav(&synth(cue))
            }
        }
    }

    fn synth(cue: Cue) -> Vec<f32> {
        match cue {
            Cue::Bouncepad => gen_boing(),
            Cue::GoldCollect => gen_pickup(),
            Cue::LevelCompleted => gen_fanfare(&[523.0, 659.0, 784.0, 1047.0], 0.1),
            Cue::LoseLife => gen_descend(&[440.0, 370.0, 311.0, 261.0], 0.12),
            Cue::GameWon => gen_fanfare(&[523.0, 659.0, 784.0, 1047.0, 1319.0, 1568.0], 0.12),
            Cue::GameLost => gen_descend(&[392.0, 330.0, 262.0, 196.0, 131.0], 0.2),
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn tone(freq: f32, t: f32) -> f32 {
        (t * freq * 2.0 * std::f32::consts::PI).sin()
    }

    /// Gold pickup: quick ascending arpeggio C6→E6→G6
    fn gen_pickup() -> Vec<f32> {
        let notes = [1047.0_f32, 1319.0, 1568.0];
        let note_dur = 0.045;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = tone(freq, t) * 0.7 + tone(freq * 3.0, t) * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Bouncepad: rising sweep with a wobble
    fn gen_boing() -> Vec<f32> {
        let duration = 0.25;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let wobble = (t * 40.0).sin() * 30.0;
                let freq = 150.0 + t * 500.0 + wobble;
                phase += freq / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.7);
                (phase * 2.0 * std::f32::consts::PI).sin() * env * 0.3
            })
            .collect()
    }

    /// Ascending fanfare with a sustained final note
    fn gen_fanfare(notes: &[f32], note_dur: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = tone(freq, t) * 0.6 + tone(freq * 2.0, t) * 0.3 + tone(freq * 3.0, t) * 0.1;
                samples.push(wave * env * 0.3);
            }
        }
        if let Some(&last) = notes.last() {
            let n = (SAMPLE_RATE as f32 * 0.25) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                samples.push(tone(last, t) * env * 0.3);
            }
        }
        samples
    }

    /// Sad descending line with a tail fade
    fn gen_descend(notes: &[f32], note_dur: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                samples.push(tone(freq, t) * env * 0.3);
            }
        }
        let total = samples.len();
        let fade_len = total / 4;
        for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
            *s *= (fade_len - k) as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

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
    pub fn new(_sounds_dir: &std::path::Path) -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: Cue) {}
    pub fn play_music(&self, _choice: Music) {}
    pub fn stop_music(&self) {}
}
