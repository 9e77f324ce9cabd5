//! Note events reported by the MML parser

use serde::Serialize;

/// A note or rest started (or extended by a tie) on one channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteEvent {
    /// Oscillator period in samples (`None` for a rest)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<i32>,
    /// Pitch in Hz derived from the period
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f32>,
    /// Total note duration in samples after this event
    pub length: u32,
    /// Length added by this event (differs from `length` when tied)
    pub added: u32,
    /// Whether the event extended the previous note instead of restarting
    #[serde(skip_serializing_if = "is_false")]
    pub tied: bool,
    /// Stored octave at the time of the event
    pub octave: u8,
    /// Channel volume latched for the note
    pub volume: u8,
    /// Timbre number (@)
    pub tone: u32,
}

impl NoteEvent {
    pub fn is_rest(&self) -> bool {
        self.period.is_none()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
