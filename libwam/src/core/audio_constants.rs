//! PCM scaling shared by encoder and decoder

/// unit-range samples are scaled by this before analysis (2^16 - 1)
pub const PCM_SCALE: f64 = 65535.0;

/// Overlap-add of the windowed IMDCT output carries half the input energy,
/// so the decoder divides by PCM_SCALE / 2 to land back in unit range.
pub const DECODE_GAIN: f64 = 2.0 / PCM_SCALE;

/// Convert a unit-range f32 sample into the analysis range (NaN becomes silence)
#[inline]
pub fn f32_to_pcm(sample: f32) -> f64 {
    if sample.is_nan() {
        return 0.0;
    }
    f64::from(sample.clamp(-1.0, 1.0)) * PCM_SCALE
}

/// Convert an overlap-added value back to a unit-range f32 sample
#[inline]
pub fn pcm_to_f32(value: f64) -> f32 {
    (value * DECODE_GAIN) as f32
}
