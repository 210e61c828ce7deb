/// Sound engine: procedural chiptune-style audio via rodio.
///
/// Sound effects are generated as in-memory WAV buffers at init time and
/// played fire-and-forget. Background music is a short looping motif per
/// map track, held on a dedicated sink that is replaced when the hero
/// changes maps.
///
/// Compiled without the "sound" feature, the stub engine does nothing
/// and the game runs silent.

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

    const SAMPLE_RATE: u32 = 22050;

    /// (frequency Hz, duration s) — 0.0 Hz is a rest.
    type Note = (f32, f32);

    const CASTLE_THEME: [Note; 8] = [
        (262.0, 0.30), (330.0, 0.30), (392.0, 0.30), (523.0, 0.45),
        (392.0, 0.30), (330.0, 0.30), (262.0, 0.45), (0.0, 0.60),
    ];
    const FIELD_THEME: [Note; 8] = [
        (392.0, 0.22), (440.0, 0.22), (494.0, 0.22), (587.0, 0.33),
        (494.0, 0.22), (440.0, 0.22), (392.0, 0.33), (0.0, 0.45),
    ];
    const CAVE_THEME: [Note; 8] = [
        (220.0, 0.40), (175.0, 0.40), (196.0, 0.40), (165.0, 0.60),
        (220.0, 0.40), (233.0, 0.40), (196.0, 0.60), (0.0, 0.80),
    ];
    const VILLAGE_THEME: [Note; 8] = [
        (523.0, 0.20), (587.0, 0.20), (659.0, 0.20), (784.0, 0.30),
        (659.0, 0.20), (587.0, 0.20), (523.0, 0.30), (0.0, 0.40),
    ];

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_treasure: Arc<Vec<u8>>,
        sfx_door: Arc<Vec<u8>>,
        sfx_step: Arc<Vec<u8>>,
        sfx_die: Arc<Vec<u8>>,
        sfx_fanfare: Arc<Vec<u8>>,
        music: Option<Sink>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_treasure: Arc::new(wav_bytes(&gen_treasure())),
                sfx_door: Arc::new(wav_bytes(&gen_door())),
                sfx_step: Arc::new(wav_bytes(&gen_step())),
                sfx_die: Arc::new(wav_bytes(&gen_die())),
                sfx_fanfare: Arc::new(wav_bytes(&gen_fanfare())),
                music: None,
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_treasure(&self) {
            self.play(&self.sfx_treasure);
        }
        pub fn play_door(&self) {
            self.play(&self.sfx_door);
        }
        pub fn play_step(&self) {
            self.play(&self.sfx_step);
        }
        pub fn play_die(&self) {
            self.play(&self.sfx_die);
        }
        pub fn play_fanfare(&self) {
            self.play(&self.sfx_fanfare);
        }

        /// Switch the looping background motif. Unknown tracks stop the
        /// music rather than erroring.
        pub fn play_music(&mut self, track: &str) {
            if let Some(old) = self.music.take() {
                old.stop();
            }
            let theme: &[Note] = match track {
                "castle" => &CASTLE_THEME,
                "field" => &FIELD_THEME,
                "cave" => &CAVE_THEME,
                "village" => &VILLAGE_THEME,
                _ => return,
            };
            let buf = wav_bytes(&gen_melody(theme, 0.12));
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(buf)) {
                    sink.append(src.repeat_infinite());
                    self.music = Some(sink);
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// One note: sine fundamental + a touch of second harmonic, with a
    /// soft decay envelope. freq 0.0 renders silence.
    fn tone(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                if freq == 0.0 {
                    return 0.0;
                }
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(1.5);
                let wave = (t * freq * std::f32::consts::TAU).sin() * 0.8
                    + (t * freq * 2.0 * std::f32::consts::TAU).sin() * 0.2;
                wave * env * volume
            })
            .collect()
    }

    fn gen_melody(notes: &[Note], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in notes {
            samples.extend(tone(freq, dur, volume));
        }
        samples
    }

    /// Treasure: quick ascending sparkle E6 → G6 → C7
    fn gen_treasure() -> Vec<f32> {
        gen_melody(&[(1319.0, 0.05), (1568.0, 0.05), (2093.0, 0.12)], 0.25)
    }

    /// Door: low descending thunk
    fn gen_door() -> Vec<f32> {
        let duration = 0.14;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 180.0 - t * 90.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.7);
                (ti * freq * std::f32::consts::TAU).sin() * env * 0.35
            })
            .collect()
    }

    /// Step: tiny click when warping between maps
    fn gen_step() -> Vec<f32> {
        tone(500.0, 0.03, 0.2)
    }

    /// Death: slow falling minor line A4 → F4 → D4 → A3
    fn gen_die() -> Vec<f32> {
        gen_melody(
            &[(440.0, 0.15), (349.0, 0.15), (294.0, 0.15), (220.0, 0.35)],
            0.3,
        )
    }

    /// Victory: rising fanfare with a held top note
    fn gen_fanfare() -> Vec<f32> {
        gen_melody(
            &[(523.0, 0.12), (659.0, 0.12), (784.0, 0.12), (1047.0, 0.40)],
            0.3,
        )
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a 16-bit mono buffer
    // ════════════════════════════════════════════════════════════

    fn wav_bytes(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let data_len = (samples.len() * 2) as u32;

        let mut buf = Vec::with_capacity(44 + data_len as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_len).to_le_bytes());
        buf.extend_from_slice(b"WAVEfmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&(SAMPLE_RATE * CHANNELS as u32 * BITS as u32 / 8).to_le_bytes());
        buf.extend_from_slice(&(CHANNELS * BITS / 8).to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_len.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> {
        Some(SoundEngine)
    }
    pub fn play_treasure(&self) {}
    pub fn play_door(&self) {}
    pub fn play_step(&self) {}
    pub fn play_die(&self) {}
    pub fn play_fanfare(&self) {}
    pub fn play_music(&mut self, _track: &str) {}
}
