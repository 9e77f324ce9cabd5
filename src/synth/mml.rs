//! MML token consumer
//!
//! Each call to [`Channel::advance`] applies commands until a note or rest
//! starts, then returns. The program loops forever: the cursor wraps to the
//! beginning when it reaches the end of the text.

use super::channel::{
    Channel, DEFAULT_KEY_LEN, DEFAULT_OCTAVE, DEFAULT_PWM_RATE, DEFAULT_TEMPO, DEFAULT_VOLUME,
    NO_TONE,
};
use super::event::NoteEvent;
use super::note::{frequency_of, note_index, note_length, period_for, MAX_OCTAVE};
use super::volume::MAX_VOLUME;

impl Channel {
    /// Consume commands up to and including the next note or rest
    ///
    /// A program holding no note or rest at all starts a default-length rest
    /// once the cursor has wrapped twice.
    pub fn advance(&mut self) -> NoteEvent {
        let mut wraps = 0;
        loop {
            if self.mml_pos >= self.mml.len() {
                self.mml_pos = 0;
                wraps += 1;
                if wraps > 1 {
                    return self.start_note(None);
                }
                continue;
            }

            let b = self.mml.as_bytes()[self.mml_pos].to_ascii_lowercase();
            self.mml_pos += 1;

            match b {
                b'&' => self.tie = true,
                b'q' => {
                    if let Some(n) = self.read_num() {
                        if (1..=8).contains(&n) {
                            self.tone_rate = n as u8;
                        }
                    }
                }
                b'v' => {
                    let n = self.read_num().unwrap_or(DEFAULT_VOLUME as u32);
                    self.local_vol = n.min(MAX_VOLUME as u32) as u8;
                }
                b'o' => {
                    self.octave = match self.read_num() {
                        Some(n) => n.saturating_sub(1).min(MAX_OCTAVE as u32) as u8,
                        None => DEFAULT_OCTAVE,
                    };
                }
                b'>' => {
                    if self.octave < MAX_OCTAVE {
                        self.octave += 1;
                    }
                }
                b'<' => self.octave = self.octave.saturating_sub(1),
                b'x' => {
                    let n = self.read_num().unwrap_or(DEFAULT_PWM_RATE as u32);
                    self.pwm_rate = n.clamp(1, 99) as u8;
                }
                b's' => self.env_no = self.read_num().unwrap_or(0).min(u8::MAX as u32) as u8,
                b'm' => self.env_len = self.read_num().unwrap_or(1).max(1),
                b'@' => self.tone_no = self.read_num().unwrap_or(0),
                b'p' => self.pitch_no = self.read_num().unwrap_or(0).min(u8::MAX as u32) as u8,
                b'h' => self.tune_depth = self.read_num().unwrap_or(0).min(i32::MAX as u32) as i32,
                b't' => {
                    self.tempo = self.read_num().filter(|&n| n > 0).unwrap_or(DEFAULT_TEMPO);
                    self.update_def_len();
                }
                b'l' => {
                    self.def_keylen = self.read_num().filter(|&n| n > 0).unwrap_or(DEFAULT_KEY_LEN);
                    self.update_def_len();
                }
                b'r' => return self.start_note(None),
                b'a'..=b'g' => {
                    let accidental = self.read_accidental();
                    let period = note_index(b, self.octave, accidental).map(period_for);
                    return self.start_note(period);
                }
                _ => {
                    // Stray digits, dots, whitespace and unknown letters
                }
            }
        }
    }

    /// Read a decimal digit run at the cursor
    ///
    /// Returns `None` when no digit follows. Values saturate at `u32::MAX`.
    fn read_num(&mut self) -> Option<u32> {
        let bytes = self.mml.as_bytes();
        let start = self.mml_pos;
        let mut value = 0u32;
        while self.mml_pos < bytes.len() && bytes[self.mml_pos].is_ascii_digit() {
            let d = (bytes[self.mml_pos] - b'0') as u32;
            value = value.saturating_mul(10).saturating_add(d);
            self.mml_pos += 1;
        }
        (self.mml_pos > start).then_some(value)
    }

    fn read_accidental(&mut self) -> i32 {
        match self.mml.as_bytes().get(self.mml_pos) {
            Some(b'#') | Some(b'+') => {
                self.mml_pos += 1;
                1
            }
            Some(b'-') => {
                self.mml_pos += 1;
                -1
            }
            _ => 0,
        }
    }

    /// Start (or tie onto) a note; `None` means a rest
    fn start_note(&mut self, period: Option<i32>) -> NoteEvent {
        let note_len = match self.read_num() {
            Some(n) if n > 0 => note_length(self.tempo, n),
            _ => self.def_len,
        };

        self.fr_value = period.unwrap_or(NO_TONE);
        if period.is_some() && !self.tie {
            self.int_vol = self.local_vol;
        }

        let tied = self.tie;
        let mut added = note_len;
        if self.tie {
            self.len = self.len.saturating_add(note_len);
            self.tie = false;
        } else {
            self.len = note_len;
            self.slice_pos = 0;
            self.frame_pos = 0;
            self.fr_counter = 0;
            self.fr_tune = 0;
        }

        if self.mml.as_bytes().get(self.mml_pos) == Some(&b'.') {
            self.len = self.len.saturating_add(note_len / 2);
            added += note_len / 2;
            self.mml_pos += 1;
        }

        NoteEvent {
            period,
            frequency: period.map(frequency_of),
            length: self.len,
            added,
            tied,
            octave: self.octave,
            volume: self.int_vol,
            tone: self.tone_no,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_before_note() {
        let mut ch = Channel::with_mml("t60l8v7x25q6s2m3@4p1h5c");
        let ev = ch.advance();
        assert_eq!(ch.tempo, 60);
        assert_eq!(ch.def_keylen, 8);
        assert_eq!(ch.local_vol, 7);
        assert_eq!(ch.int_vol, 7);
        assert_eq!(ch.pwm_rate, 25);
        assert_eq!(ch.tone_rate, 6);
        assert_eq!(ch.env_no, 2);
        assert_eq!(ch.env_len, 3);
        assert_eq!(ch.tone_no, 4);
        assert_eq!(ch.pitch_no, 1);
        assert_eq!(ch.tune_depth, 5);
        assert_eq!(ev.length, 24000);
        assert_eq!(ch.mml_pos, ch.mml.len());
    }

    #[test]
    fn test_uppercase_commands() {
        let mut ch = Channel::with_mml("T60L8O3C");
        let ev = ch.advance();
        assert_eq!(ch.tempo, 60);
        assert_eq!(ch.octave, 2);
        assert_eq!(ev.period, Some(period_for(24)));
    }

    #[test]
    fn test_accidentals() {
        let mut ch = Channel::with_mml("c#d+e-");
        assert_eq!(ch.advance().period, Some(period_for(49)));
        assert_eq!(ch.advance().period, Some(period_for(51)));
        assert_eq!(ch.advance().period, Some(period_for(51)));
    }

    #[test]
    fn test_explicit_and_dotted_length() {
        let mut ch = Channel::with_mml("c8c4.r");
        assert_eq!(ch.advance().length, 12000);
        assert_eq!(ch.advance().length, 36000);
        let rest = ch.advance();
        assert!(rest.is_rest());
        assert_eq!(rest.length, 24000);
        assert!(ch.is_resting());
    }

    #[test]
    fn test_zero_length_uses_default() {
        let mut ch = Channel::with_mml("l8c0");
        assert_eq!(ch.advance().length, 12000);
    }

    #[test]
    fn test_missing_digits_use_defaults() {
        let mut ch = Channel::with_mml("t60l8v3o2x10c t l v o x c");
        ch.advance();
        assert_eq!(ch.tempo, 60);
        ch.advance();
        assert_eq!(ch.tempo, DEFAULT_TEMPO);
        assert_eq!(ch.def_keylen, DEFAULT_KEY_LEN);
        assert_eq!(ch.local_vol, DEFAULT_VOLUME);
        assert_eq!(ch.octave, DEFAULT_OCTAVE);
        assert_eq!(ch.pwm_rate, DEFAULT_PWM_RATE);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let mut ch = Channel::with_mml("v99x0q9m0o0c");
        ch.advance();
        assert_eq!(ch.local_vol, 15);
        assert_eq!(ch.pwm_rate, 1);
        assert_eq!(ch.tone_rate, 8);
        assert_eq!(ch.env_len, 1);
        assert_eq!(ch.octave, 0);
    }

    #[test]
    fn test_out_of_range_note_is_rest() {
        let mut ch = Channel::with_mml("o1c-");
        let ev = ch.advance();
        assert!(ev.is_rest());
        assert_eq!(ch.fr_value, NO_TONE);
        assert_eq!(ev.length, 24000);
    }

    #[test]
    fn test_junk_skipped() {
        let mut ch = Channel::with_mml("  123 . ; z c");
        let ev = ch.advance();
        assert_eq!(ev.period, Some(period_for(48)));
    }

    #[test]
    fn test_rest_keeps_volume() {
        let mut ch = Channel::with_mml("v9cv3r");
        ch.advance();
        ch.int_vol = 4;
        ch.advance();
        assert_eq!(ch.int_vol, 4);
        assert_eq!(ch.local_vol, 3);
    }

    #[test]
    fn test_command_only_program_rests() {
        let mut ch = Channel::with_mml("t60v4");
        let ev = ch.advance();
        assert!(ev.is_rest());
        assert_eq!(ch.tempo, 60);
        assert_eq!(ev.length, 48000);
    }

    #[test]
    fn test_empty_program_rests() {
        let mut ch = Channel::with_mml("");
        let ev = ch.advance();
        assert!(ev.is_rest());
        assert_eq!(ev.length, ch.def_len);
        assert_eq!(ch.mml_pos, 0);
    }
}
