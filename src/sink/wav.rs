//! WAV file sink

use super::{AudioSink, StereoFrame};
use crate::error::Result;
use crate::synth::volume::MasterVolume;
use crate::synth::SAMPLE_RATE;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Writes 48 kHz 16-bit stereo WAV
pub struct WavSink {
    writer: hound::WavWriter<BufWriter<File>>,
    volume: MasterVolume,
}

impl WavSink {
    pub fn create(path: &Path) -> Result<Self> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(path, spec)?;
        Ok(Self {
            writer,
            volume: MasterVolume::default(),
        })
    }

    /// Number of stereo frames written so far
    pub fn frames_written(&self) -> u32 {
        self.writer.duration()
    }

    /// Patch the header and close the file
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }
}

impl AudioSink for WavSink {
    fn send_frame(&mut self, frame: StereoFrame) -> Result<()> {
        self.writer.write_sample(frame.left())?;
        self.writer.write_sample(frame.right())?;
        Ok(())
    }

    fn volume(&self) -> u8 {
        self.volume.get()
    }

    fn set_volume(&mut self, volume: i32) {
        self.volume.set(volume);
    }
}
