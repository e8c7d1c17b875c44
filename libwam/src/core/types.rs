//! format constants and header type for WAM/SMD0

use serde::{Deserialize, Serialize};

// constants

/// Magic number "WAM0"
pub const MAGIC: u32 = 0x5741_4d30;

/// payload type "SMD0"
pub const FILE_TYPE_SMD0: u32 = 0x534d_4430;

/// the only payload version there is
pub const VERSION: u32 = 0;

/// fixed header size, frame slots start right after it
pub const HEADER_SIZE: usize = 40;

/// header field byte offsets (every field is a big-endian u32)
pub mod offsets {
    pub const MAGIC: usize = 0;
    pub const DATA_SIZE: usize = 4;
    pub const FILE_TYPE: usize = 8;
    pub const VERSION: usize = 12;
    pub const SAMPLING_RATE: usize = 16;
    pub const CHANNEL_COUNT: usize = 20;
    pub const SAMPLE_COUNT: usize = 24;
    pub const FREQUENCY_RANGE: usize = 28;
    pub const FREQUENCY_TABLE_SIZE: usize = 32;
    pub const FRAME_COUNT: usize = 36;
}

/// smallest frequency range a stream may use (one bitmap word)
pub const MIN_FREQUENCY_RANGE: u32 = 32;

/// largest frequency range accepted, bounds per-channel state
pub const MAX_FREQUENCY_RANGE: u32 = 1 << 16;

/// most channels a stream may carry
pub const MAX_CHANNEL_COUNT: u32 = 64;

/// at most this many octave sub-bands carry a scale code
pub const MAX_SUB_SCALES: usize = 8;

/// default MDCT half-block size
pub const DEFAULT_FREQUENCY_RANGE: u32 = 1024;

/// default coefficient table size for a given frequency range
pub fn default_table_size(frequency_range: u32) -> u32 {
    frequency_range >> 2
}

// types

/// the 40-byte stream header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    /// bytes of header + frames in use
    pub data_size: u32,
    pub file_type: u32,
    pub version: u32,
    /// samples per second
    pub sampling_rate: u32,
    pub channel_count: u32,
    /// decodable samples per channel
    pub sample_count: u32,
    /// MDCT half-block size (N)
    pub frequency_range: u32,
    /// max coefficients transmitted per frame per channel
    pub frequency_table_size: u32,
    pub frame_count: u32,
}

impl Header {
    /// header for a fresh SMD0 stream with no frames yet
    pub fn new(
        sampling_rate: u32,
        channel_count: u32,
        frequency_range: u32,
        frequency_table_size: u32,
    ) -> Self {
        Header {
            data_size: HEADER_SIZE as u32,
            file_type: FILE_TYPE_SMD0,
            version: VERSION,
            sampling_rate,
            channel_count,
            sample_count: 0,
            frequency_range,
            frequency_table_size,
            frame_count: 0,
        }
    }

    /// playback length of one pass in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sampling_rate == 0 {
            return 0.0;
        }
        self.sample_count as f64 / self.sampling_rate as f64
    }
}

/// summary of an encoded stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub channels: u32,
    pub sample_count: u32,
    pub frequency_range: u32,
    pub frequency_table_size: u32,
    pub frame_count: u32,
    pub data_size: u32,
    pub duration_secs: f64,
    /// 16-bit PCM size divided by encoded size
    pub compression_ratio: f64,
}

impl From<&Header> for StreamInfo {
    fn from(header: &Header) -> Self {
        let pcm_bytes = header.sample_count as f64 * header.channel_count as f64 * 2.0;
        let compression_ratio = if header.data_size > 0 {
            pcm_bytes / header.data_size as f64
        } else {
            0.0
        };

        StreamInfo {
            sample_rate: header.sampling_rate,
            channels: header.channel_count,
            sample_count: header.sample_count,
            frequency_range: header.frequency_range,
            frequency_table_size: header.frequency_table_size,
            frame_count: header.frame_count,
            data_size: header.data_size,
            duration_secs: header.duration_secs(),
            compression_ratio,
        }
    }
}
