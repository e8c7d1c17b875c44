//! rewam - Audio format converter library
//!
//! Converts common audio formats to and from WAM/SMD0 streams.
//! It works on native targets and can be compiled to WebAssembly.
//!

pub mod audio;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm;

use anyhow::{Context, Result};
use log::{debug, info};

pub use libwam_audio::{FrameInfo, StreamInfo};

/// Information about a WAM stream
#[derive(Debug, Clone, serde::Serialize)]
pub struct WamInfo {
    pub version: u32,
    pub sample_rate: u32,
    pub channels: u32,
    pub frequency_range: u32,
    pub frequency_table_size: u32,
    pub frame_count: u32,
    pub sample_count: u32,
    pub duration_secs: f64,
    pub file_size: usize,
    pub compression_ratio: f64,
}

/// Get information about a WAM stream
pub fn get_wam_info(data: &[u8]) -> Result<WamInfo> {
    let header = libwam_audio::Reader::new()
        .read_header(data)
        .map_err(|e| anyhow::anyhow!("Failed to read WAM stream: {}", e))?;
    let stream = StreamInfo::from(&header);

    Ok(WamInfo {
        version: header.version,
        sample_rate: stream.sample_rate,
        channels: stream.channels,
        frequency_range: stream.frequency_range,
        frequency_table_size: stream.frequency_table_size,
        frame_count: stream.frame_count,
        sample_count: stream.sample_count,
        duration_secs: stream.duration_secs,
        file_size: data.len(),
        compression_ratio: stream.compression_ratio,
    })
}

/// Validate a WAM stream
///
/// Checks the header and then decodes every frame once, so a stream that
/// passes will also play.
pub fn validate_wam(data: &[u8]) -> Result<bool> {
    if !libwam_audio::is_wam_data(data) {
        return Ok(false);
    }
    match libwam_audio::decode_interleaved(data) {
        Ok(samples) => Ok(samples.iter().all(|s| s.is_finite())),
        Err(e) => {
            debug!("stream rejected: {}", e);
            Ok(false)
        }
    }
}

/// Encoding options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Coefficients per channel per frame (block size N)
    pub frequency_range: u32,
    /// Coefficients kept per frame, `None` for a quarter of the range
    pub frequency_table_size: Option<u32>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            frequency_range: libwam_audio::DEFAULT_FREQUENCY_RANGE,
            frequency_table_size: None,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block size; must be a power of two
    pub fn with_frequency_range(mut self, frequency_range: u32) -> Self {
        self.frequency_range = frequency_range;
        self
    }

    /// Set how many coefficients each frame keeps
    pub fn with_table_size(mut self, frequency_table_size: u32) -> Self {
        self.frequency_table_size = Some(frequency_table_size);
        self
    }

    /// Table size after applying the default
    pub fn table_size(&self) -> u32 {
        self.frequency_table_size
            .unwrap_or_else(|| libwam_audio::default_table_size(self.frequency_range))
    }
}

/// Information about a decoded audio file
#[derive(Debug, Clone)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_secs: f32,
}

/// Encode audio file bytes to a WAM stream
///
/// # Arguments
/// * `audio_bytes` - Raw bytes of an audio file (MP3, WAV, FLAC, OGG, etc.)
/// * `options` - Encoding options
///
/// # Returns
/// Raw bytes of the WAM stream
pub fn encode_from_audio(audio_bytes: &[u8], options: EncodeOptions) -> Result<Vec<u8>> {
    let source = audio::read_audio_from_bytes(audio_bytes).context("Failed to read audio file")?;

    encode_from_samples(&source.samples, source.sample_rate, source.channels, options)
}

/// Encode raw audio samples to a WAM stream
///
/// One block of silence is appended so the last input block has a partner
/// frame to overlap with; `decode_to_samples` gives back at least as many
/// samples as went in.
///
/// # Arguments
/// * `samples` - Interleaved f32 samples in range [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz
/// * `channels` - Number of channels
/// * `options` - Encoding options
pub fn encode_from_samples(
    samples: &[f32],
    sample_rate: u32,
    channels: usize,
    options: EncodeOptions,
) -> Result<Vec<u8>> {
    if channels == 0 {
        anyhow::bail!("Channel count must be greater than 0");
    }
    let block = options.frequency_range as usize * channels;
    let mut padded = Vec::with_capacity(samples.len() + block);
    padded.extend_from_slice(samples);
    padded.resize(samples.len() + block, 0.0);

    info!(
        "encoding {} samples/channel at {} Hz, N={} T={}",
        samples.len() / channels,
        sample_rate,
        options.frequency_range,
        options.table_size()
    );

    libwam_audio::encode_interleaved(
        &padded,
        sample_rate,
        channels as u32,
        options.frequency_range,
        options.table_size(),
    )
    .map_err(|e| anyhow::anyhow!("Encoding failed: {}", e))
}

/// Decode a WAM stream to raw samples
///
/// The decoder's one block of lead-in is dropped, so sample 0 of the result
/// lines up with sample 0 of the encoder input.
///
/// # Returns
/// Tuple of (samples, sample_rate, channels) where samples are interleaved f32
pub fn decode_to_samples(wam_bytes: &[u8]) -> Result<(Vec<f32>, u32, usize)> {
    let header = libwam_audio::Reader::new()
        .read_header(wam_bytes)
        .map_err(|e| anyhow::anyhow!("Invalid WAM stream: {}", e))?;
    let channels = header.channel_count as usize;

    let mut samples = libwam_audio::decode_interleaved(wam_bytes)
        .map_err(|e| anyhow::anyhow!("Decoding failed: {}", e))?;

    let lead_in = (header.frequency_range as usize * channels).min(samples.len());
    samples.drain(..lead_in);

    Ok((samples, header.sampling_rate, channels))
}

/// Decode a WAM stream to WAV format
pub fn decode_to_wav(wam_bytes: &[u8]) -> Result<Vec<u8>> {
    let (samples, sample_rate, channels) = decode_to_samples(wam_bytes)?;

    audio::write_wav_to_bytes(&samples, sample_rate, channels).context("Failed to write WAV data")
}

/// Decoded contents of one (frame, channel) slot
pub fn inspect_frame(wam_bytes: &[u8], frame: usize, channel: usize) -> Result<FrameInfo> {
    let decoder = libwam_audio::Decoder::new(wam_bytes)
        .map_err(|e| anyhow::anyhow!("Invalid WAM stream: {}", e))?;
    decoder
        .frame_info(frame, channel)
        .map_err(|e| anyhow::anyhow!("Cannot inspect frame: {}", e))
}

/// Get information about an audio file
///
/// # Arguments
/// * `audio_bytes` - Raw bytes of an audio file (MP3, WAV, FLAC, OGG, etc.)
pub fn get_audio_info(audio_bytes: &[u8]) -> Result<AudioInfo> {
    let source = audio::read_audio_from_bytes(audio_bytes).context("Failed to read audio file")?;

    Ok(AudioInfo {
        sample_rate: source.sample_rate,
        channels: source.channels,
        duration_secs: source.duration_secs(),
    })
}
