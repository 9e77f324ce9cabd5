//! Four-voice MML synthesizer
//!
//! `SynthEngine::play_slice` is called once per output tick. Each call runs
//! every channel for `FRAME_SIZE` samples, pulling new notes from the MML
//! parser as old ones expire, then mixes the voices into the sink.

pub mod channel;
pub mod envelope;
pub mod event;
pub mod mml;
pub mod note;
pub mod volume;
pub mod waveform;

use crate::error::{Error, Result};
use crate::loader::MmlSource;
use crate::sink::{wait_ready, AudioSink, StereoFrame};
use channel::{Channel, MmlText};
use event::NoteEvent;

/// Number of voices
pub const CHANNEL_COUNT: usize = 4;

/// Output sample rate (Hz)
pub const SAMPLE_RATE: u32 = 48000;

/// Samples generated per channel per tick
pub const FRAME_SIZE: usize = 1200;

/// Driver ticks per second of audio
pub const TICKS_PER_SECOND: u32 = SAMPLE_RATE / FRAME_SIZE as u32;

/// Output samples per minute, the base of all note lengths
pub const SAMPLES_PER_MINUTE: u32 = SAMPLE_RATE * 60;

/// Maximum MML program length per channel (bytes)
pub const MAX_MML_LEN: usize = 512;

/// Programs loaded at power-on
pub const DEFAULT_MML: [&str; CHANNEL_COUNT] = [
    "r16",
    "t120l8v8x25q6r16",
    "t60l4v15x12@4o1cego2cego3cego4cego5cego6cego7cegr2.",
    "t60r",
];

/// Main synthesizer state
pub struct SynthEngine {
    channels: [Channel; CHANNEL_COUNT],
    /// Ticks still to be dropped
    skip_frames: u32,
    /// Per-channel sample buffers for the current tick
    pcm: Box<[[i16; FRAME_SIZE]; CHANNEL_COUNT]>,
    /// Mixed output of the last rendered tick
    mixed: Vec<StereoFrame>,
}

impl SynthEngine {
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|i| Channel::with_mml(DEFAULT_MML[i])),
            skip_frames: 0,
            pcm: Box::new([[0; FRAME_SIZE]; CHANNEL_COUNT]),
            mixed: Vec::with_capacity(FRAME_SIZE),
        }
    }

    /// Create an engine with every channel playing `programs[i]`
    pub fn with_programs(programs: [&str; CHANNEL_COUNT]) -> Self {
        let mut engine = Self::new();
        for (ch, text) in engine.channels.iter_mut().zip(programs) {
            ch.set_mml(text);
        }
        engine
    }

    /// Replace one channel's program and restart it
    pub fn attach_mml(&mut self, channel: usize, text: &str) -> Result<()> {
        let ch = self
            .channels
            .get_mut(channel)
            .ok_or(Error::InvalidChannel(channel))?;
        if MmlText::would_truncate(text) {
            tracing::warn!(
                "MML for channel {} is {} bytes, truncated to {}",
                channel,
                text.len(),
                MAX_MML_LEN
            );
        }
        ch.set_mml(text);
        Ok(())
    }

    /// Attach every program present in `source`; other channels keep theirs
    pub fn load_source(&mut self, source: &MmlSource) -> Result<()> {
        for (i, text) in source.programs().enumerate() {
            self.attach_mml(i, text)?;
        }
        Ok(())
    }

    pub fn channel(&self, idx: usize) -> Option<&Channel> {
        self.channels.get(idx)
    }

    pub fn channels(&self) -> &[Channel; CHANNEL_COUNT] {
        &self.channels
    }

    /// Drop the next `count` ticks without producing audio
    pub fn skip_frames(&mut self, count: u32) {
        self.skip_frames = self.skip_frames.saturating_add(count);
    }

    pub fn pending_skips(&self) -> u32 {
        self.skip_frames
    }

    /// Rewind every channel to the start of its program
    pub fn reset(&mut self) {
        for ch in &mut self.channels {
            ch.reset();
        }
        self.skip_frames = 0;
    }

    /// Produce one tick of audio and push it to `sink`
    ///
    /// Blocks on the sink's busy status before every frame. Returns the
    /// number of frames sent, 0 when the tick was skipped.
    pub fn play_slice<S: AudioSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let volume = sink.volume();
        if !self.render(volume) {
            return Ok(0);
        }

        for &frame in &self.mixed {
            wait_ready(sink);
            sink.send_frame(frame)?;
        }
        Ok(self.mixed.len())
    }

    /// Produce one tick of audio without a sink
    ///
    /// Returns an empty slice when the tick was skipped.
    pub fn render_slice(&mut self, volume: u8) -> &[StereoFrame] {
        if !self.render(volume) {
            return &[];
        }
        &self.mixed
    }

    fn render(&mut self, volume: u8) -> bool {
        waveform::wavetables();
        self.mixed.clear();

        if self.skip_frames > 0 {
            self.skip_frames -= 1;
            tracing::trace!("Tick skipped, {} left", self.skip_frames);
            return false;
        }

        for (idx, (ch, buf)) in self.channels.iter_mut().zip(self.pcm.iter_mut()).enumerate() {
            run_channel(idx, ch, buf, volume);
        }

        // Voices are mono, so left and right carry the same mix
        for i in 0..FRAME_SIZE {
            let sum: i32 = self.pcm.iter().map(|buf| buf[i] as i32).sum();
            let mixed = (sum >> 2) as i16;
            self.mixed.push(StereoFrame::mono(mixed));
        }
        true
    }
}

impl Default for SynthEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one channel for a tick, filling `buf`
fn run_channel(idx: usize, ch: &mut Channel, buf: &mut [i16; FRAME_SIZE], volume: u8) {
    ch.frame_pos += 1;
    envelope::process_envelope(ch);
    envelope::process_pitch(ch);

    for sample in buf.iter_mut() {
        *sample = if ch.is_sounding() {
            volume::scale(waveform::generate(ch), ch.int_vol, volume)
        } else {
            0
        };

        if ch.len > 0 {
            ch.slice_pos += 1;
            if ch.slice_pos < ch.len {
                continue;
            }
        }

        let event = ch.advance();
        log_note(idx, ch, &event);
    }
}

fn log_note(idx: usize, ch: &Channel, event: &NoteEvent) {
    tracing::debug!(
        channel = idx,
        mml_pos = ch.mml_pos,
        fr_value = ch.fr_value,
        len = event.length,
        tied = event.tied,
        "note"
    );
}
