//! Raw PCM stream sink

use super::{AudioSink, StereoFrame};
use crate::error::Result;
use crate::synth::volume::MasterVolume;
use std::io::{BufWriter, Write};

/// Interleaved little-endian signed 16-bit stereo, left first
///
/// Suitable for `aplay -f S16_LE -r 48000 -c 2`.
pub struct PcmSink<W: Write> {
    out: BufWriter<W>,
    volume: MasterVolume,
    frames_written: u64,
}

impl<W: Write> PcmSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
            volume: MasterVolume::default(),
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Flush buffered data and hand back the writer
    pub fn finish(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|e| crate::Error::Io(e.into_error()))
    }
}

impl<W: Write> AudioSink for PcmSink<W> {
    fn send_frame(&mut self, frame: StereoFrame) -> Result<()> {
        self.out.write_all(&frame.left().to_le_bytes())?;
        self.out.write_all(&frame.right().to_le_bytes())?;
        self.frames_written += 1;
        Ok(())
    }

    fn volume(&self) -> u8 {
        self.volume.get()
    }

    fn set_volume(&mut self, volume: i32) {
        self.volume.set(volume);
    }
}
