/// Menu sounds, synthesized once at startup and played through rodio.
///
/// Without the "sound" feature `SoundEngine` is a stub whose `play` does
/// nothing, so callers never need their own cfg gates.

/// Every sound the menus can make.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuSound {
    /// Picker cycled right.
    ToggleOn,
    /// Picker cycled left.
    ToggleOff,
    Move,
    Confirm,
    Back,
    Delete,
    Begin,
}

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const SOUND_COUNT: usize = 7;

impl MenuSound {
    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    const ALL: [MenuSound; SOUND_COUNT] = [
        MenuSound::ToggleOn,
        MenuSound::ToggleOff,
        MenuSound::Move,
        MenuSound::Confirm,
        MenuSound::Back,
        MenuSound::Delete,
        MenuSound::Begin,
    ];
}

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::{MenuSound, SOUND_COUNT};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        /// Encoded WAV per sound, indexed by `MenuSound as usize`.
        clips: [Arc<[u8]>; SOUND_COUNT],
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(error = %e, "no audio output, menu sounds disabled");
                    return None;
                }
            };
            let clips = MenuSound::ALL.map(|sound| Arc::<[u8]>::from(encode_wav(&synth(sound))));
            Some(SoundEngine { _stream: stream, handle, clips })
        }

        /// Fire and forget.
        pub fn play(&self, sound: MenuSound) {
            let Ok(sink) = Sink::try_new(&self.handle) else {
                return;
            };
            let clip = Arc::clone(&self.clips[sound as usize]);
            if let Ok(source) = Decoder::new(Cursor::new(clip)) {
                sink.append(source);
                sink.detach();
            }
        }
    }

    pub(super) fn synth(sound: MenuSound) -> Vec<f32> {
        match sound {
            MenuSound::ToggleOn => glide(520.0, 880.0, 0.06),
            MenuSound::ToggleOff => glide(880.0, 520.0, 0.06),
            MenuSound::Move => tone(660.0, 0.03, 0.2),
            MenuSound::Confirm => chime(&[784.0, 1047.0], 0.05),
            MenuSound::Back => chime(&[523.0, 392.0], 0.05),
            MenuSound::Delete => crunch(0.18),
            MenuSound::Begin => chime(&[523.0, 659.0, 784.0, 1047.0], 0.08),
        }
    }

    fn sample_count(seconds: f32) -> usize {
        (SAMPLE_RATE as f32 * seconds) as usize
    }

    /// Sine with a linear fade.
    fn tone(freq: f32, seconds: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(seconds);
        (0..n)
            .map(|i| {
                let fade = 1.0 - i as f32 / n as f32;
                (i as f32 / SAMPLE_RATE as f32 * freq * TAU).sin() * fade * volume
            })
            .collect()
    }

    /// Sine sliding from `from` to `to` Hz.
    pub(super) fn glide(from: f32, to: f32, seconds: f32) -> Vec<f32> {
        let n = sample_count(seconds);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let progress = i as f32 / n as f32;
                phase += (from + (to - from) * progress) / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - progress).sqrt() * 0.25
            })
            .collect()
    }

    /// Short notes in sequence, each with a third harmonic.
    fn chime(notes: &[f32], note_seconds: f32) -> Vec<f32> {
        let n = sample_count(note_seconds);
        notes
            .iter()
            .flat_map(|&freq| {
                (0..n).map(move |i| {
                    let t = i as f32 / SAMPLE_RATE as f32;
                    let fade = 1.0 - (i as f32 / n as f32).sqrt();
                    let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                    wave * fade * 0.25
                })
            })
            .collect()
    }

    /// Falling tone mixed with LCG noise.
    fn crunch(seconds: f32) -> Vec<f32> {
        let n = sample_count(seconds);
        let mut seed: u32 = 0x2545_f491;
        (0..n)
            .map(|i| {
                let progress = i as f32 / n as f32;
                let freq = 400.0 - 250.0 * progress;
                let tone = (i as f32 / SAMPLE_RATE as f32 * freq * TAU).sin();
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let noise = seed as f32 / u32::MAX as f32 * 2.0 - 1.0;
                (tone + noise) * 0.5 * (1.0 - progress).powf(0.8) * 0.3
            })
            .collect()
    }

    /// 16-bit mono PCM in a RIFF container.
    pub(super) fn encode_wav(samples: &[f32]) -> Vec<u8> {
        const HEADER_LEN: u32 = 44;
        let data_len = samples.len() as u32 * 2;

        let mut out = Vec::with_capacity((HEADER_LEN + data_len) as usize);
        let mut put = |bytes: &[u8]| out.extend_from_slice(bytes);
        put(b"RIFF");
        put(&(HEADER_LEN - 8 + data_len).to_le_bytes());
        put(b"WAVEfmt ");
        put(&16u32.to_le_bytes());
        put(&1u16.to_le_bytes());
        put(&1u16.to_le_bytes());
        put(&SAMPLE_RATE.to_le_bytes());
        put(&(SAMPLE_RATE * 2).to_le_bytes());
        put(&2u16.to_le_bytes());
        put(&16u16.to_le_bytes());
        put(b"data");
        put(&data_len.to_le_bytes());

        out.extend(
            samples
                .iter()
                .flat_map(|s| ((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).to_le_bytes()),
        );
        out
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> {
        Some(SoundEngine)
    }

    pub fn play(&self, _sound: MenuSound) {}
}
