//! Channel state management

use super::note::note_length;
use super::MAX_MML_LEN;

/// Rest marker for `fr_value`
pub const NO_TONE: i32 = i32::MAX;

/// Power-on tempo (t)
pub const DEFAULT_TEMPO: u32 = 120;
/// Power-on default note length (l)
pub const DEFAULT_KEY_LEN: u32 = 4;
/// Power-on stored octave
pub const DEFAULT_OCTAVE: u8 = 4;
/// Power-on volume (v)
pub const DEFAULT_VOLUME: u8 = 15;
/// Power-on gate rate (q)
pub const DEFAULT_TONE_RATE: u8 = 8;
/// Power-on PWM duty percentage (x)
pub const DEFAULT_PWM_RATE: u8 = 50;

/// Fixed-capacity MML program text
///
/// Input longer than `MAX_MML_LEN` bytes is cut at the nearest char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MmlText {
    text: String,
}

impl MmlText {
    pub fn new(text: &str) -> Self {
        let mut end = text.len().min(MAX_MML_LEN);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        Self {
            text: text[..end].to_string(),
        }
    }

    /// Whether `text` would be cut when stored
    pub fn would_truncate(text: &str) -> bool {
        text.len() > MAX_MML_LEN
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// One voice: MML cursor plus oscillator, envelope and pitch state
#[derive(Debug, Clone)]
pub struct Channel {
    /// Program text, replayed cyclically
    pub mml: MmlText,
    /// Cursor into `mml`
    pub mml_pos: usize,
    /// Oscillator period in samples (`NO_TONE` for a rest, 0 before the first note)
    pub fr_value: i32,
    /// Pitch offset added to `fr_value`
    pub fr_tune: i32,
    /// Phase counter within the current period
    pub fr_counter: i32,
    /// Current note duration in samples
    pub len: u32,
    /// Samples elapsed in the current note
    pub slice_pos: u32,
    /// Driver ticks elapsed in the current note
    pub frame_pos: u32,
    /// Cached samples per default-length note
    pub def_len: u32,
    /// Default length denominator (l)
    pub def_keylen: u32,
    /// Tempo in beats per minute (t)
    pub tempo: u32,
    /// Stored octave, 0-7
    pub octave: u8,
    /// Target volume (v), 0-15
    pub local_vol: u8,
    /// Current, possibly decaying, volume
    pub int_vol: u8,
    /// Gate length in eighths of the note (q), 1-8
    pub tone_rate: u8,
    /// PWM duty percentage (x), 1-99
    pub pwm_rate: u8,
    /// Envelope shape (s)
    pub env_no: u8,
    /// Envelope step length in ticks (m), at least 1
    pub env_len: u32,
    /// Timbre (@)
    pub tone_no: u32,
    /// Pitch modulation shape (p)
    pub pitch_no: u8,
    /// Pitch modulation depth (h)
    pub tune_depth: i32,
    /// Bind the next note to the current one
    pub tie: bool,
}

impl Channel {
    pub fn with_mml(text: &str) -> Self {
        Self {
            mml: MmlText::new(text),
            mml_pos: 0,
            fr_value: 0,
            fr_tune: 0,
            fr_counter: 0,
            len: 0,
            slice_pos: 0,
            frame_pos: 0,
            def_len: note_length(DEFAULT_TEMPO, DEFAULT_KEY_LEN),
            def_keylen: DEFAULT_KEY_LEN,
            tempo: DEFAULT_TEMPO,
            octave: DEFAULT_OCTAVE,
            local_vol: DEFAULT_VOLUME,
            int_vol: DEFAULT_VOLUME,
            tone_rate: DEFAULT_TONE_RATE,
            pwm_rate: DEFAULT_PWM_RATE,
            env_no: 0,
            env_len: 1,
            tone_no: 0,
            pitch_no: 0,
            tune_depth: 0,
            tie: false,
        }
    }

    /// Replace the program and restart playback from its beginning
    pub fn set_mml(&mut self, text: &str) {
        *self = Self::with_mml(text);
    }

    /// Rewind to power-on state, keeping the loaded program
    pub fn reset(&mut self) {
        let mml = std::mem::take(&mut self.mml);
        *self = Self::with_mml("");
        self.mml = mml;
    }

    /// Whether the channel is currently resting
    pub fn is_resting(&self) -> bool {
        self.fr_value == NO_TONE
    }

    /// Whether the oscillator produces samples this tick
    pub fn is_sounding(&self) -> bool {
        self.fr_value != 0 && self.fr_value != NO_TONE
    }

    /// Whether the current note has run out
    pub fn note_expired(&self) -> bool {
        self.slice_pos >= self.len
    }

    /// Effective oscillator period, never below one sample
    pub fn period(&self) -> i32 {
        self.fr_value.saturating_add(self.fr_tune).max(1)
    }

    /// Recompute the cached default note length from tempo and `l`
    pub(crate) fn update_def_len(&mut self) {
        self.def_len = note_length(self.tempo, self.def_keylen);
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::with_mml("")
    }
}
