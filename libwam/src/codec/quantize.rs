//! Logarithmic scale codes and the 4-bit coefficient quantizer.
//!
//! A sub-band scale code `s` stands for the gain `2^(-s/2)` relative to the
//! frame's master scale. A coefficient code is a sign bit plus a 3-bit
//! exponent `m`, decoded as `sign * 2^(-m - s/2) * master`.

/// largest sub-band scale code; also used for silent bands
pub const MAX_SUB_SCALE: u8 = 15;

/// sign bit of a coefficient code
pub const SIGN_BIT: u8 = 0x8;

/// largest coefficient exponent
pub const MAX_EXPONENT: u8 = 7;

// Master scales are stored rounded up, so a frame's peak lands a hair
// under one unit of exponent; snap it back onto code 0.
const EXPONENT_SNAP: f64 = 1.0 / 256.0;

/// half-step log2 code of `band_peak / master`, clamped to 0..=15
pub fn sub_scale_code(band_peak: f64, master: f64) -> u8 {
    if band_peak <= 0.0 || master <= 0.0 {
        return MAX_SUB_SCALE;
    }
    let code = (-2.0 * (band_peak / master).log2()).floor();
    code.clamp(0.0, MAX_SUB_SCALE as f64) as u8
}

/// linear gain of a sub-band scale code
#[inline]
pub fn sub_scale_gain(code: u8) -> f64 {
    (-(code as f64) / 2.0).exp2()
}

/// relative magnitude below which a coefficient is never transmitted
#[inline]
pub fn noise_floor(code: u8) -> f64 {
    (-7.0 - code as f64 / 2.0).exp2()
}

/// Log-domain weight of a coefficient for selection, in `[1, 8]`.
///
/// Zero when the frame is silent or the coefficient sits under the noise
/// floor of its band.
pub fn coefficient_power(value: f64, master: f64, sub_scale: u8) -> f64 {
    if master <= 0.0 {
        return 0.0;
    }
    let relative = value.abs() / master;
    if relative <= 0.0 || relative < noise_floor(sub_scale) {
        return 0.0;
    }
    8.0 + (relative / sub_scale_gain(sub_scale)).log2()
}

/// 4-bit code for `value` in a band with scale `sub_scale`
pub fn quantize(value: f64, master: f64, sub_scale: u8) -> u8 {
    let normalized = value.abs() / (master * sub_scale_gain(sub_scale));
    let exponent = (-normalized.log2()).min(MAX_EXPONENT as f64);
    let magnitude = (exponent - EXPONENT_SNAP).ceil().max(0.0) as u8;
    if value < 0.0 {
        SIGN_BIT | magnitude
    } else {
        magnitude
    }
}

/// coefficient value for a 4-bit code
pub fn dequantize(code: u8, sub_scale: u8, master: f64) -> f64 {
    let exponent = -((code & MAX_EXPONENT) as f64) - sub_scale as f64 / 2.0;
    let magnitude = exponent.exp2() * master;
    if code & SIGN_BIT != 0 {
        -magnitude
    } else {
        magnitude
    }
}
