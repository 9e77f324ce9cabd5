//! JSON note traces
//!
//! Steps each channel's parser without rendering audio and records the
//! notes it would play, with their start times in samples.

use crate::loader::MmlSource;
use crate::synth::channel::Channel;
use crate::synth::event::NoteEvent;
use crate::synth::{CHANNEL_COUNT, DEFAULT_MML, SAMPLE_RATE};
use serde::Serialize;

/// Top-level JSON structure for a trace
#[derive(Debug, Clone, Serialize)]
pub struct TraceJson {
    /// Output sample rate (Hz)
    pub sample_rate: u32,
    /// One entry per channel
    pub channels: Vec<ChannelTrace>,
}

/// Notes played by one channel
#[derive(Debug, Clone, Serialize)]
pub struct ChannelTrace {
    pub channel: usize,
    /// The program that was traced
    pub mml: String,
    pub notes: Vec<TracedNote>,
}

/// A note event with its position in the output stream
#[derive(Debug, Clone, Serialize)]
pub struct TracedNote {
    /// Start time in samples
    pub start: u64,
    #[serde(flatten)]
    pub event: NoteEvent,
}

/// Trace the first `count` note events of every channel
///
/// Channels without a line in `source` trace their default program.
pub fn trace_source(source: &MmlSource, count: usize) -> TraceJson {
    let channels = (0..CHANNEL_COUNT)
        .map(|i| {
            let mml = source.get(i).unwrap_or(DEFAULT_MML[i]);
            trace_channel(i, mml, count)
        })
        .collect();

    TraceJson {
        sample_rate: SAMPLE_RATE,
        channels,
    }
}

/// Trace the first `count` note events of a single program
pub fn trace_channel(channel: usize, mml: &str, count: usize) -> ChannelTrace {
    let mut ch = Channel::with_mml(mml);
    let mut notes = Vec::with_capacity(count);
    let mut time = 0u64;
    let mut note_start = 0u64;

    for _ in 0..count {
        let event = ch.advance();
        if !event.tied {
            note_start = time;
        }
        time += event.added as u64;
        // The next event comes once this note has run out
        ch.slice_pos = ch.len;
        notes.push(TracedNote {
            start: note_start,
            event,
        });
    }

    ChannelTrace {
        channel,
        mml: ch.mml.as_str().to_string(),
        notes,
    }
}
