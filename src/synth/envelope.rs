//! Per-tick volume envelope and pitch modulation

use super::channel::Channel;

/// Ticks after note start before pitch modulation kicks in
pub const PITCH_ONSET: u32 = 8;

/// Volume envelope shapes (s)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    Flat,
    /// Decay to 75% of the channel volume, one step per tick
    Soft,
    /// Decay to 50% of the channel volume, two steps per tick
    Hard,
    /// Decay to silence, one step every `env_len` ticks
    Fade,
}

impl EnvelopeShape {
    pub fn from_number(env_no: u8) -> Self {
        match env_no {
            1 => Self::Soft,
            2 => Self::Hard,
            3 => Self::Fade,
            _ => Self::Flat,
        }
    }
}

/// Pitch modulation shapes (p)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchShape {
    None,
    Vibrato,
    /// Period grows, pitch falls (synth drum)
    Drum,
    /// Period shrinks, pitch rises
    Sweep,
}

impl PitchShape {
    pub fn from_number(pitch_no: u8) -> Self {
        match pitch_no {
            1 => Self::Vibrato,
            2 => Self::Drum,
            3 => Self::Sweep,
            _ => Self::None,
        }
    }
}

/// Whether a stepped modulator fires on this tick
fn on_step(ch: &Channel) -> bool {
    ch.env_len <= 1 || ch.frame_pos % ch.env_len == 0
}

/// Apply the volume envelope for one tick
pub fn process_envelope(ch: &mut Channel) {
    if ch.frame_pos == 0 {
        return;
    }

    let local = ch.local_vol as u32;
    match EnvelopeShape::from_number(ch.env_no) {
        EnvelopeShape::Flat => {}
        EnvelopeShape::Soft => {
            if ch.int_vol as u32 * 4 > local * 3 {
                ch.int_vol -= 1;
            }
        }
        EnvelopeShape::Hard => {
            if ch.int_vol as u32 * 2 > local {
                ch.int_vol = ch.int_vol.saturating_sub(2);
            }
        }
        EnvelopeShape::Fade => {
            if on_step(ch) {
                ch.int_vol = ch.int_vol.saturating_sub(1);
            }
        }
    }
}

/// Apply pitch modulation for one tick
pub fn process_pitch(ch: &mut Channel) {
    if ch.frame_pos < PITCH_ONSET {
        return;
    }

    match PitchShape::from_number(ch.pitch_no) {
        PitchShape::None => {}
        PitchShape::Vibrato => {
            let half = (ch.frame_pos - PITCH_ONSET) / ch.env_len.max(1);
            ch.fr_tune = if half % 2 == 0 {
                ch.tune_depth
            } else {
                -ch.tune_depth
            };
        }
        PitchShape::Drum => {
            if on_step(ch) {
                ch.fr_tune = ch.fr_tune.saturating_add(ch.tune_depth);
            }
        }
        PitchShape::Sweep => {
            if on_step(ch) {
                ch.fr_tune = ch.fr_tune.saturating_sub(ch.tune_depth);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(env_no: u8, pitch_no: u8) -> Channel {
        let mut ch = Channel::with_mml("");
        ch.env_no = env_no;
        ch.pitch_no = pitch_no;
        ch
    }

    fn run_envelope(ch: &mut Channel, ticks: u32) {
        for _ in 0..ticks {
            ch.frame_pos += 1;
            process_envelope(ch);
        }
    }

    fn run_pitch(ch: &mut Channel, ticks: u32) -> Vec<i32> {
        (0..ticks)
            .map(|_| {
                ch.frame_pos += 1;
                process_pitch(ch);
                ch.fr_tune
            })
            .collect()
    }

    #[test]
    fn test_first_tick_skipped() {
        let mut ch = channel(3, 0);
        process_envelope(&mut ch);
        assert_eq!(ch.int_vol, 15);
    }

    #[test]
    fn test_soft_decay_stops_at_75_percent() {
        let mut ch = channel(1, 0);
        run_envelope(&mut ch, 2);
        assert_eq!(ch.int_vol, 13);
        run_envelope(&mut ch, 20);
        // 15 * 0.75 = 11.25
        assert_eq!(ch.int_vol, 11);
    }

    #[test]
    fn test_hard_decay_stops_at_half() {
        let mut ch = channel(2, 0);
        run_envelope(&mut ch, 20);
        // 15 -> 13 -> 11 -> 9 -> 7
        assert_eq!(ch.int_vol, 7);
    }

    #[test]
    fn test_hard_decay_floors_at_zero() {
        let mut ch = channel(2, 0);
        ch.local_vol = 0;
        ch.int_vol = 1;
        run_envelope(&mut ch, 1);
        assert_eq!(ch.int_vol, 0);
    }

    #[test]
    fn test_fade_steps_every_env_len() {
        let mut ch = channel(3, 0);
        ch.env_len = 4;
        run_envelope(&mut ch, 8);
        assert_eq!(ch.int_vol, 13);
        run_envelope(&mut ch, 100);
        assert_eq!(ch.int_vol, 0);
    }

    #[test]
    fn test_vibrato_alternates() {
        let mut ch = channel(0, 1);
        ch.tune_depth = 3;
        let tunes = run_pitch(&mut ch, 12);
        assert_eq!(&tunes[..7], &[0; 7]);
        assert_eq!(&tunes[7..], &[3, -3, 3, -3, 3]);
    }

    #[test]
    fn test_vibrato_half_period() {
        let mut ch = channel(0, 1);
        ch.tune_depth = 2;
        ch.env_len = 2;
        let tunes = run_pitch(&mut ch, 14);
        assert_eq!(&tunes[7..], &[2, 2, -2, -2, 2, 2, -2]);
    }

    #[test]
    fn test_drum_and_sweep_monotonic() {
        let mut drum = channel(0, 2);
        drum.tune_depth = 5;
        let up = run_pitch(&mut drum, 10);
        assert_eq!(up[9], 15);
        assert!(up.windows(2).all(|w| w[0] <= w[1]));

        let mut sweep = channel(0, 3);
        sweep.tune_depth = 5;
        sweep.env_len = 2;
        let down = run_pitch(&mut sweep, 12);
        // fires on ticks 8, 10, 12
        assert_eq!(down[11], -15);
        assert!(down.windows(2).all(|w| w[0] >= w[1]));
    }
}
