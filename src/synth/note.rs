//! Note pitch and length calculations

use super::{SAMPLES_PER_MINUTE, SAMPLE_RATE};

/// Number of keys in the frequency table (7 octaves)
pub const NOTE_COUNT: usize = 84;

/// Highest stored octave
pub const MAX_OCTAVE: u8 = 7;

/// Semitone offset of each letter, in `c d e f g a b` order
pub const SCALE_OFFSETS: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Chromatic frequencies (Hz) from C1 to B7
pub const FREQ_TABLE: [f32; NOTE_COUNT] = [
    32.7, 34.7, 36.7, 38.9, 41.2, 43.7, 46.3, 49.0, 51.9, 55.0, 58.3, 61.7,
    65.4, 69.3, 73.4, 77.8, 82.4, 87.3, 92.5, 98.0, 103.8, 110.0, 116.5, 123.5,
    130.8, 138.6, 146.8, 155.6, 164.8, 174.6, 185.0, 196.0, 207.7, 220.0, 233.1, 246.9,
    261.6, 277.2, 293.7, 311.1, 329.6, 349.2, 370.0, 392.0, 415.3, 440.0, 466.2, 493.9,
    523.3, 554.4, 587.3, 622.3, 659.3, 698.5, 740.0, 784.0, 830.6, 880.0, 932.3, 987.8,
    1046.5, 1108.7, 1174.7, 1244.5, 1318.5, 1396.9, 1480.0, 1568.0, 1661.2, 1760.0, 1864.7, 1975.5,
    2093.0, 2217.5, 2349.3, 2489.0, 2637.0, 2793.8, 2960.0, 3136.0, 3322.4, 3520.0, 3729.3, 3951.1,
];

/// Position of a note letter within the octave
///
/// Accepts lowercase `a`-`g`; anything else yields `None`.
pub fn scale_offset(letter: u8) -> Option<i32> {
    match letter {
        b'c'..=b'g' => Some(SCALE_OFFSETS[(letter - b'c') as usize]),
        b'a' | b'b' => Some(SCALE_OFFSETS[(letter - b'a') as usize + 5]),
        _ => None,
    }
}

/// Resolve a letter, stored octave and accidental (-1, 0, +1) to a table index
///
/// Returns `None` when the result falls outside the table.
pub fn note_index(letter: u8, octave: u8, accidental: i32) -> Option<usize> {
    let offset = scale_offset(letter)?;
    let idx = offset + octave as i32 * 12 + accidental;
    if (0..NOTE_COUNT as i32).contains(&idx) {
        Some(idx as usize)
    } else {
        None
    }
}

/// Oscillator period in output samples for a table index
pub fn period_for(idx: usize) -> i32 {
    (SAMPLE_RATE as f32 / FREQ_TABLE[idx]) as i32
}

/// Frequency in Hz for a period, the inverse of `period_for`
pub fn frequency_of(period: i32) -> f32 {
    if period <= 0 {
        0.0
    } else {
        SAMPLE_RATE as f32 / period as f32
    }
}

/// Calculate note length in samples
/// tempo: BPM
/// key_len: note value (4 = quarter, 8 = eighth, etc.)
pub fn note_length(tempo: u32, key_len: u32) -> u32 {
    if tempo == 0 || key_len == 0 {
        return 1;
    }
    let len = SAMPLES_PER_MINUTE as f64 / tempo as f64 * 4.0 / key_len as f64;
    (len.round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_note_at_120() {
        assert_eq!(note_length(120, 4), 24000);
    }

    #[test]
    fn test_eighth_note_at_60() {
        assert_eq!(note_length(60, 8), 24000);
    }

    #[test]
    fn test_whole_note_at_120() {
        assert_eq!(note_length(120, 1), 96000);
    }

    #[test]
    fn test_degenerate_length() {
        assert_eq!(note_length(0, 4), 1);
        assert_eq!(note_length(120, 0), 1);
        assert_eq!(note_length(u32::MAX, 64), 1);
    }

    #[test]
    fn test_scale_offsets() {
        assert_eq!(scale_offset(b'c'), Some(0));
        assert_eq!(scale_offset(b'f'), Some(5));
        assert_eq!(scale_offset(b'a'), Some(9));
        assert_eq!(scale_offset(b'b'), Some(11));
        assert_eq!(scale_offset(b'h'), None);
    }

    #[test]
    fn test_note_index_range() {
        assert_eq!(note_index(b'a', 4, 0), Some(57));
        assert_eq!(note_index(b'c', 0, -1), None);
        assert_eq!(note_index(b'b', 6, 1), None);
        assert_eq!(note_index(b'b', 6, 0), Some(83));
    }

    #[test]
    fn test_a4_period() {
        // 48000 / 440 = 109.09
        assert_eq!(period_for(45), 109);
        assert_eq!(period_for(57), 54);
    }
}
