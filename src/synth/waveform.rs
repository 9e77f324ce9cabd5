//! Waveform generation: native PWM square and wavetable voices

use super::channel::Channel;
use std::sync::OnceLock;

/// First `@` number that selects a wavetable
pub const FIRST_TABLE_TONE: u32 = 3;

/// Number of wavetables (`@3` through `@10`)
pub const TABLE_TONE_COUNT: usize = 8;

/// Entries per wavetable
pub const TABLE_SIZE: usize = 256;

/// Full-scale positive PWM sample
pub const PWM_HIGH: i16 = 0x7FFF;

/// Seed for the noise table LFSR
const LFSR_SEED: u16 = 0xACE1;

/// Timbre selected by the `@` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Native square wave with note gate and PWM duty
    Pwm,
    /// Lookup into one of the wavetables
    Table(usize),
}

impl Tone {
    pub fn from_number(tone_no: u32) -> Self {
        match tone_no.checked_sub(FIRST_TABLE_TONE) {
            Some(idx) if (idx as usize) < TABLE_TONE_COUNT => Self::Table(idx as usize),
            _ => Self::Pwm,
        }
    }

    /// Human-readable name for listings
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pwm => "pwm",
            Self::Table(0) => "triangle",
            Self::Table(1) => "sine",
            Self::Table(2) => "saw",
            Self::Table(_) => "noise",
        }
    }
}

/// Precomputed wavetables, shared read-only by every channel
pub struct Wavetables {
    tables: [[i8; TABLE_SIZE]; TABLE_TONE_COUNT],
}

impl Wavetables {
    fn new() -> Self {
        let mut tables = [[0i8; TABLE_SIZE]; TABLE_TONE_COUNT];
        for (n, table) in tables.iter_mut().enumerate() {
            match n {
                0 => fill_triangle(table),
                1 => fill_sine(table),
                2 => fill_saw(table),
                _ => fill_noise(table, LFSR_SEED.rotate_left(n as u32)),
            }
        }
        Self { tables }
    }

    pub fn table(&self, idx: usize) -> &[i8; TABLE_SIZE] {
        &self.tables[idx]
    }
}

static WAVETABLES: OnceLock<Wavetables> = OnceLock::new();

/// Wavetables, built on first access
pub fn wavetables() -> &'static Wavetables {
    WAVETABLES.get_or_init(|| {
        tracing::debug!("Generating {} wavetables", TABLE_TONE_COUNT);
        Wavetables::new()
    })
}

fn fill_triangle(table: &mut [i8; TABLE_SIZE]) {
    for (i, v) in table.iter_mut().enumerate() {
        let i = i as i32;
        *v = if i < 128 { i * 2 - 128 } else { 383 - i * 2 } as i8;
    }
}

fn fill_sine(table: &mut [i8; TABLE_SIZE]) {
    for (i, v) in table.iter_mut().enumerate() {
        let phase = 2.0 * std::f32::consts::PI * i as f32 / TABLE_SIZE as f32;
        *v = (phase.sin() * 127.0) as i8;
    }
}

fn fill_saw(table: &mut [i8; TABLE_SIZE]) {
    for (i, v) in table.iter_mut().enumerate() {
        *v = (i as i32 - 128) as i8;
    }
}

/// Galois LFSR noise, taps at bits 16, 14, 13, 11
fn fill_noise(table: &mut [i8; TABLE_SIZE], seed: u16) {
    let mut lfsr = seed.max(1);
    for v in table.iter_mut() {
        for _ in 0..8 {
            let bit = lfsr & 1;
            lfsr >>= 1;
            if bit == 1 {
                lfsr ^= 0xB400;
            }
        }
        *v = lfsr as u8 as i8;
    }
}

/// Next raw sample for a sounding channel, advancing its phase counter
pub fn generate(ch: &mut Channel) -> i16 {
    match Tone::from_number(ch.tone_no) {
        Tone::Pwm => pwm_sample(ch),
        Tone::Table(idx) => table_sample(ch, wavetables().table(idx)),
    }
}

/// Square wave gated to the first `tone_rate/8` of the note
fn pwm_sample(ch: &mut Channel) -> i16 {
    let period = ch.period();
    let tone_dur = ch.len as u64 * ch.tone_rate as u64 / 8;

    let data = if tone_dur < ch.slice_pos as u64 {
        0
    } else {
        let pwm_dur = period as i64 * (100 - ch.pwm_rate as i64) / 100;
        if (ch.fr_counter as i64) < pwm_dur {
            0
        } else {
            PWM_HIGH
        }
    };

    step_phase(ch, period);
    data
}

fn table_sample(ch: &mut Channel, table: &[i8; TABLE_SIZE]) -> i16 {
    let period = ch.period();
    let pos = (TABLE_SIZE as i64 * ch.fr_counter.max(0) as i64 / period as i64)
        .min(TABLE_SIZE as i64 - 1);
    let data = (table[pos as usize] as i16) << 8;

    step_phase(ch, period);
    data
}

fn step_phase(ch: &mut Channel, period: i32) {
    ch.fr_counter += 1;
    if ch.fr_counter >= period {
        ch.fr_counter = 0;
    }
}
