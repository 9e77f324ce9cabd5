//! In-memory sink with a simulated FIFO busy flag

use super::{AudioSink, StereoFrame, BUSY_MASK};
use crate::error::Result;
use crate::synth::volume::MasterVolume;

/// Collects frames in a `Vec`
///
/// With `busy_polls` set, every frame is preceded by that many busy status
/// reads, the way a full hardware FIFO drains.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub frames: Vec<StereoFrame>,
    volume: MasterVolume,
    busy_polls: u32,
    pending_busy: u32,
    /// Total status reads that reported busy
    pub busy_reads: u64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volume(volume: i32) -> Self {
        Self {
            volume: MasterVolume::new(volume),
            ..Self::default()
        }
    }

    /// Report busy this many times before each accepted frame
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self.pending_busy = polls;
        self
    }

    pub fn left(&self) -> impl Iterator<Item = i16> + '_ {
        self.frames.iter().map(|f| f.left())
    }

    pub fn right(&self) -> impl Iterator<Item = i16> + '_ {
        self.frames.iter().map(|f| f.right())
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl AudioSink for MemorySink {
    fn send_frame(&mut self, frame: StereoFrame) -> Result<()> {
        self.frames.push(frame);
        self.pending_busy = self.busy_polls;
        Ok(())
    }

    fn query_busy(&mut self) -> u32 {
        if self.pending_busy > 0 {
            self.pending_busy -= 1;
            self.busy_reads += 1;
            BUSY_MASK
        } else {
            0
        }
    }

    fn volume(&self) -> u8 {
        self.volume.get()
    }

    fn set_volume(&mut self, volume: i32) {
        self.volume.set(volume);
    }
}
