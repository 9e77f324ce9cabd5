//! Audio output sinks

pub mod memory;
pub mod pcm;
pub mod wav;

pub use memory::MemorySink;
pub use pcm::PcmSink;
pub use wav::WavSink;

use crate::error::Result;

/// Status bits that mean the sink cannot take another frame
pub const BUSY_MASK: u32 = 0xC;

/// One stereo sample packed as `{left:16, right:16}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StereoFrame(pub u32);

impl StereoFrame {
    pub fn new(left: i16, right: i16) -> Self {
        Self(((left as u16 as u32) << 16) | right as u16 as u32)
    }

    pub fn mono(sample: i16) -> Self {
        Self::new(sample, sample)
    }

    pub fn left(&self) -> i16 {
        (self.0 >> 16) as u16 as i16
    }

    pub fn right(&self) -> i16 {
        self.0 as u16 as i16
    }
}

/// Destination for synthesized stereo frames
pub trait AudioSink {
    /// Enqueue one stereo frame
    fn send_frame(&mut self, frame: StereoFrame) -> Result<()>;

    /// Non-blocking status read; bits in `BUSY_MASK` mean "not ready"
    fn query_busy(&mut self) -> u32 {
        0
    }

    /// Master attenuation index (0-15)
    fn volume(&self) -> u8;

    /// Set the master attenuation index, clamped to 0-15
    fn set_volume(&mut self, volume: i32);
}

/// Spin until the sink is ready to accept a frame
///
/// There is no timeout: a sink that never clears its busy bits hangs the caller.
pub fn wait_ready<S: AudioSink + ?Sized>(sink: &mut S) {
    while sink.query_busy() & BUSY_MASK != 0 {
        std::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_packing() {
        let frame = StereoFrame::new(-1, 0x1234);
        assert_eq!(frame.0, 0xFFFF_1234);
        assert_eq!(frame.left(), -1);
        assert_eq!(frame.right(), 0x1234);
        assert_eq!(StereoFrame::mono(0x7FFF).0, 0x7FFF_7FFF);
    }
}
