//! Frame slot geometry shared by the encoder and decoder.

use std::ops::Range;

use super::error::{WamError, WamResult};
use super::types::{
    Header, HEADER_SIZE, MAX_CHANNEL_COUNT, MAX_FREQUENCY_RANGE, MAX_SUB_SCALES,
    MIN_FREQUENCY_RANGE,
};

/// Channel count and transform sizes that fix the byte layout of a stream.
///
/// Each (frame, channel) slot holds, in order:
///
/// | bytes                  | content                                   |
/// |------------------------|-------------------------------------------|
/// | 4                      | master scale, big-endian u32              |
/// | ceil(sub_scales / 2)   | 4-bit sub-band scale codes                |
/// | (N / 32) * 4           | selection bitmap, big-endian u32 words    |
/// | ceil(table_size / 2)   | 4-bit coefficient codes, ascending index  |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub channel_count: usize,
    pub frequency_range: usize,
    pub frequency_table_size: usize,
}

impl FrameLayout {
    /// checked layout for new encoder parameters
    pub fn new(
        channel_count: u32,
        frequency_range: u32,
        frequency_table_size: u32,
    ) -> WamResult<Self> {
        check_sizes(channel_count, frequency_range, frequency_table_size)
            .map_err(WamError::Parameter)?;
        Ok(Self::unchecked(
            channel_count,
            frequency_range,
            frequency_table_size,
        ))
    }

    /// checked layout for a parsed header
    pub fn from_header(header: &Header) -> WamResult<Self> {
        check_sizes(
            header.channel_count,
            header.frequency_range,
            header.frequency_table_size,
        )
        .map_err(WamError::Format)?;
        Ok(Self::unchecked(
            header.channel_count,
            header.frequency_range,
            header.frequency_table_size,
        ))
    }

    fn unchecked(channel_count: u32, frequency_range: u32, frequency_table_size: u32) -> Self {
        FrameLayout {
            channel_count: channel_count as usize,
            frequency_range: frequency_range as usize,
            frequency_table_size: frequency_table_size as usize,
        }
    }

    /// number of octave sub-bands, min(8, log2 N)
    pub fn sub_scale_count(&self) -> usize {
        (self.frequency_range.trailing_zeros() as usize).min(MAX_SUB_SCALES)
    }

    /// Coefficient indices covered by sub-band `band`.
    ///
    /// The top band is the upper half of the spectrum and every band below
    /// it halves; band 0 also takes everything under its upper edge.
    pub fn band_range(&self, band: usize) -> Range<usize> {
        let count = self.sub_scale_count();
        let hi = self.frequency_range >> (count - 1 - band);
        let lo = if band == 0 { 0 } else { hi / 2 };
        lo..hi
    }

    pub fn flag_words(&self) -> usize {
        self.frequency_range / 32
    }

    /// offset of the sub-scale nibbles inside a slot
    pub fn sub_scales_offset(&self) -> usize {
        4
    }

    /// offset of the bitmap inside a slot
    pub fn flags_offset(&self) -> usize {
        self.sub_scales_offset() + (self.sub_scale_count() + 1) / 2
    }

    /// offset of the coefficient nibbles inside a slot
    pub fn coefficients_offset(&self) -> usize {
        self.flags_offset() + self.flag_words() * 4
    }

    /// bytes per (frame, channel) slot
    pub fn stride(&self) -> usize {
        self.coefficients_offset() + (self.frequency_table_size + 1) / 2
    }

    /// absolute offset of the slot for (frame, channel)
    pub fn frame_offset(&self, frame: usize, channel: usize) -> usize {
        HEADER_SIZE + self.stride() * (self.channel_count * frame + channel)
    }

    /// total stream size holding `frame_count` frames, None on overflow
    pub fn stream_size(&self, frame_count: usize) -> Option<usize> {
        self.stride()
            .checked_mul(self.channel_count)?
            .checked_mul(frame_count)?
            .checked_add(HEADER_SIZE)
    }
}

fn check_sizes(
    channel_count: u32,
    frequency_range: u32,
    frequency_table_size: u32,
) -> Result<(), String> {
    if channel_count == 0 || channel_count > MAX_CHANNEL_COUNT {
        return Err(format!(
            "channel count must be in 1..={}, got {}",
            MAX_CHANNEL_COUNT, channel_count
        ));
    }
    if !frequency_range.is_power_of_two()
        || !(MIN_FREQUENCY_RANGE..=MAX_FREQUENCY_RANGE).contains(&frequency_range)
    {
        return Err(format!(
            "frequency range must be a power of two in {}..={}, got {}",
            MIN_FREQUENCY_RANGE, MAX_FREQUENCY_RANGE, frequency_range
        ));
    }
    if frequency_table_size == 0 || frequency_table_size > frequency_range {
        return Err(format!(
            "frequency table size must be in 1..={}, got {}",
            frequency_range, frequency_table_size
        ));
    }
    if frequency_table_size % 2 != 0 {
        return Err(format!(
            "frequency table size must be even, got {}",
            frequency_table_size
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_for_1024() {
        let layout = FrameLayout::new(1, 1024, 256).unwrap();
        assert_eq!(layout.sub_scale_count(), 8);
        assert_eq!(layout.band_range(0), 0..8);
        assert_eq!(layout.band_range(1), 8..16);
        assert_eq!(layout.band_range(5), 128..256);
        assert_eq!(layout.band_range(7), 512..1024);
    }

    #[test]
    fn test_bands_narrow_for_small_ranges() {
        let layout = FrameLayout::new(1, 32, 8).unwrap();
        assert_eq!(layout.sub_scale_count(), 5);
        let bands: Vec<_> = (0..5).map(|b| layout.band_range(b)).collect();
        assert_eq!(bands, vec![0..2, 2..4, 4..8, 8..16, 16..32]);
    }

    #[test]
    fn test_stride_and_offsets() {
        let layout = FrameLayout::new(2, 1024, 256).unwrap();
        assert_eq!(layout.flags_offset(), 8);
        assert_eq!(layout.coefficients_offset(), 8 + 128);
        assert_eq!(layout.stride(), 264);
        assert_eq!(layout.frame_offset(0, 0), 40);
        assert_eq!(layout.frame_offset(1, 1), 40 + 264 * 3);
        assert_eq!(layout.stream_size(2), Some(40 + 264 * 4));
    }

    #[test]
    fn test_odd_sub_scale_count_rounds_up() {
        let layout = FrameLayout::new(1, 32, 2).unwrap();
        // 5 codes need 3 bytes
        assert_eq!(layout.flags_offset(), 7);
        assert_eq!(layout.stride(), 7 + 4 + 1);
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(matches!(
            FrameLayout::new(0, 1024, 256),
            Err(WamError::Parameter(_))
        ));
        assert!(FrameLayout::new(1, 1000, 256).is_err());
        assert!(FrameLayout::new(1, 16, 8).is_err());
        assert!(FrameLayout::new(1, 1 << 17, 256).is_err());
        assert!(FrameLayout::new(65, 1024, 256).is_err());
        assert!(FrameLayout::new(1, 1024, 0).is_err());
        assert!(FrameLayout::new(1, 1024, 2048).is_err());
        assert!(FrameLayout::new(1, 1024, 255).is_err());
    }
}
