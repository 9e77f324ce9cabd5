//! Volume curve and master attenuation

/// Highest volume index
pub const MAX_VOLUME: u8 = 15;

/// Nonlinear attenuation curve, out of 256
pub const VOLUME_CURVE: [i32; 16] = [
    0, 1, 4, 9, 16, 25, 36, 49, 64, 81, 100, 121, 144, 169, 204, 256,
];

/// Scale a raw sample by a channel volume and the master volume
///
/// Both indices are clamped to the curve; the product truncates toward zero.
pub fn scale(sample: i16, channel_vol: u8, master_vol: u8) -> i16 {
    let c = VOLUME_CURVE[channel_vol.min(MAX_VOLUME) as usize];
    let m = VOLUME_CURVE[master_vol.min(MAX_VOLUME) as usize];
    (sample as i32 * c * m / 65536) as i16
}

/// Global output attenuation index (0-15)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterVolume(u8);

impl MasterVolume {
    pub const DEFAULT: u8 = 4;

    pub fn new(value: i32) -> Self {
        Self(value.clamp(0, MAX_VOLUME as i32) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn set(&mut self, value: i32) {
        *self = Self::new(value);
    }

    pub fn up(&mut self) {
        self.set(self.0 as i32 + 1);
    }

    pub fn down(&mut self) {
        self.set(self.0 as i32 - 1);
    }
}

impl Default for MasterVolume {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_monotonic() {
        assert_eq!(VOLUME_CURVE[0], 0);
        assert!(VOLUME_CURVE.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(VOLUME_CURVE[15], 256);
    }

    #[test]
    fn test_full_scale_passthrough() {
        assert_eq!(scale(0x7FFF, 15, 15), 0x7FFF);
        assert_eq!(scale(-0x7F00, 15, 15), -0x7F00);
    }

    #[test]
    fn test_silent_indices() {
        assert_eq!(scale(0x7FFF, 0, 15), 0);
        assert_eq!(scale(0x7FFF, 15, 0), 0);
    }

    #[test]
    fn test_half_curve() {
        // 144/256 * 64/256
        assert_eq!(scale(0x7FFF, 12, 8), (0x7FFF * 144 * 64 / 65536) as i16);
    }

    #[test]
    fn test_master_volume_clamp() {
        let mut vol = MasterVolume::new(20);
        assert_eq!(vol.get(), 15);
        vol.up();
        assert_eq!(vol.get(), 15);
        vol.set(-3);
        assert_eq!(vol.get(), 0);
        vol.down();
        assert_eq!(vol.get(), 0);
        assert_eq!(MasterVolume::default().get(), 4);
    }
}
