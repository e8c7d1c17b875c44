#![allow(clippy::needless_range_loop)]

use wasm_bindgen::prelude::*;

pub mod codec;
pub mod core;
pub mod streaming;
pub mod transform;

mod reader;
mod writer;

pub use codec::{decode_interleaved, encode_planar, Decoder, Encoder, FrameInfo};
pub use core::{
    default_table_size, FrameLayout, Header, StreamInfo, WamError, WamResult,
    DEFAULT_FREQUENCY_RANGE, FILE_TYPE_SMD0, HEADER_SIZE, MAGIC, VERSION,
};
pub use reader::{is_wam_data, Reader};
pub use streaming::{encode_interleaved, StreamingDecoder, StreamingEncoder};
pub use writer::Writer;

// audio info for the info() function

/// info about a wam stream
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct AudioInfo {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u32,
    /// Samples per channel in one pass
    pub sample_count: u32,
    /// MDCT half-block size
    pub frequency_range: u32,
    /// Coefficients transmitted per frame per channel, at most
    pub frequency_table_size: u32,
    /// Total number of frames
    pub frame_count: u32,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Stream size in bytes
    pub file_size: usize,
    /// Compression ratio (16-bit PCM / compressed)
    pub compression_ratio: f64,
}

// result helpers

/// turn an error into js
fn to_js_err(e: WamError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn table_size_or_default(frequency_range: u32, frequency_table_size: Option<u32>) -> u32 {
    frequency_table_size.unwrap_or_else(|| default_table_size(frequency_range))
}

fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels.max(1);
    let mut planar = vec![Vec::with_capacity(frames); channels];
    for chunk in samples.chunks_exact(channels.max(1)) {
        for (channel, &s) in planar.iter_mut().zip(chunk) {
            channel.push(s);
        }
    }
    planar
}

// api functions

/// encode samples to wam
///
/// # Arguments
/// * `samples` - Interleaved audio samples (f32, -1.0 to 1.0)
/// * `sample_rate` - Sample rate in Hz (e.g., 44100)
/// * `channels` - Number of channels
/// * `frequency_range` - MDCT half-block size, power of two (default 1024)
/// * `frequency_table_size` - Coefficients kept per frame (default range / 4)
///
/// # Returns
/// WAM stream as byte array
#[wasm_bindgen]
pub fn encode(
    samples: &[f32],
    sample_rate: u32,
    channels: u32,
    frequency_range: Option<u32>,
    frequency_table_size: Option<u32>,
) -> Result<Vec<u8>, JsValue> {
    let range = frequency_range.unwrap_or(DEFAULT_FREQUENCY_RANGE);
    encode_interleaved(
        samples,
        sample_rate,
        channels,
        range,
        table_size_or_default(range, frequency_table_size),
    )
    .map_err(to_js_err)
}

/// encode samples to wam, calling `callback(progress)` after every frame
///
/// Progress runs from 0 to 1. Meant for workers that report back to a UI.
#[wasm_bindgen]
pub fn encode_with_progress(
    samples: &[f32],
    sample_rate: u32,
    channels: u32,
    frequency_range: Option<u32>,
    frequency_table_size: Option<u32>,
    callback: &js_sys::Function,
) -> Result<Vec<u8>, JsValue> {
    if channels == 0 {
        return Err(to_js_err(WamError::Parameter(
            "channel count must be greater than 0".to_string(),
        )));
    }
    let range = frequency_range.unwrap_or(DEFAULT_FREQUENCY_RANGE);
    let planar = deinterleave(samples, channels as usize);

    let mut callback_error = None;
    let bytes = encode_planar(
        sample_rate,
        range,
        table_size_or_default(range, frequency_table_size),
        &planar,
        |progress| {
            if callback_error.is_none() {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_f64(progress as f64))
                {
                    callback_error = Some(e);
                }
            }
        },
    )
    .map_err(to_js_err)?;

    match callback_error {
        Some(e) => Err(e),
        None => Ok(bytes),
    }
}

/// decode wam to samples
///
/// Returns one pass of interleaved samples lined up with the encoder input.
#[wasm_bindgen]
pub fn decode(data: &[u8]) -> Result<Vec<f32>, JsValue> {
    decode_interleaved(data).map_err(to_js_err)
}

/// check the magic without validating the rest
#[wasm_bindgen]
pub fn is_wam(data: &[u8]) -> bool {
    is_wam_data(data)
}

/// get info about a wam stream
#[wasm_bindgen]
pub fn info(data: &[u8]) -> Result<AudioInfo, JsValue> {
    let header = Reader::new().read_header(data).map_err(to_js_err)?;
    let stream = StreamInfo::from(&header);

    Ok(AudioInfo {
        sample_rate: stream.sample_rate,
        channels: stream.channels,
        sample_count: stream.sample_count,
        frequency_range: stream.frequency_range,
        frequency_table_size: stream.frequency_table_size,
        frame_count: stream.frame_count,
        duration_secs: stream.duration_secs,
        file_size: data.len(),
        compression_ratio: stream.compression_ratio,
    })
}

/// stream info as a plain js object
#[wasm_bindgen]
pub fn get_stream_info(data: &[u8]) -> Result<JsValue, JsValue> {
    let header = Reader::new().read_header(data).map_err(to_js_err)?;
    serde_wasm_bindgen::to_value(&StreamInfo::from(&header))
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// playback decoder

/// looping decoder for playback, pulls planar blocks of any size
#[wasm_bindgen]
pub struct WasmDecoder {
    inner: Decoder<Vec<u8>>,
}

#[wasm_bindgen]
impl WasmDecoder {
    #[wasm_bindgen(constructor)]
    pub fn new(data: Vec<u8>) -> Result<WasmDecoder, JsValue> {
        let inner = Decoder::new(data).map_err(to_js_err)?;
        Ok(WasmDecoder { inner })
    }

    #[wasm_bindgen(getter)]
    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    #[wasm_bindgen(getter)]
    pub fn channel_count(&self) -> u32 {
        self.inner.channel_count()
    }

    #[wasm_bindgen(getter)]
    pub fn frequency_range(&self) -> u32 {
        self.inner.frequency_range()
    }

    #[wasm_bindgen(getter)]
    pub fn frame_count(&self) -> u32 {
        self.inner.frame_count()
    }

    #[wasm_bindgen(getter)]
    pub fn current_frame(&self) -> usize {
        self.inner.current_frame()
    }

    /// Decode `length` samples per channel.
    ///
    /// Channels come back one after another: `[ch0 x length, ch1 x length, ...]`.
    #[wasm_bindgen]
    pub fn read(&mut self, length: usize) -> Result<Vec<f32>, JsValue> {
        if length == 0 {
            return Ok(Vec::new());
        }
        let channels = self.inner.channel_count() as usize;
        let mut out = vec![0.0f32; channels * length];
        {
            let mut planar: Vec<&mut [f32]> = out.chunks_mut(length).collect();
            self.inner
                .read(&mut planar, 0, length)
                .map_err(to_js_err)?;
        }
        Ok(out)
    }

    /// decode exactly one frame, same layout as `read`
    #[wasm_bindgen]
    pub fn read_frame(&mut self) -> Result<Vec<f32>, JsValue> {
        let n = self.inner.frequency_range() as usize;
        let channels = self.inner.channel_count() as usize;
        let mut out = vec![0.0f32; channels * n];
        {
            let mut planar: Vec<&mut [f32]> = out.chunks_mut(n).collect();
            self.inner
                .read_frame(&mut planar, 0, n)
                .map_err(to_js_err)?;
        }
        Ok(out)
    }

    /// jump to a frame boundary
    #[wasm_bindgen]
    pub fn seek_frame(&mut self, index: usize) {
        self.inner.seek_frame(index);
    }

    /// stream info as a plain js object
    #[wasm_bindgen]
    pub fn get_info(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.info())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}
