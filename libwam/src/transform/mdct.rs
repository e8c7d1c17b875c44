//! MDCT / IMDCT after Mu-Huo Cheng and Yu-Hsin Hsu, built on [`dct_ii`].
//!
//! `mdct` computes the direct sum
//!
//! ```text
//! X[k] = sum_{i < 2n} s[i] * cos(pi / n * (i + 1/2 + n/2) * (k + 1/2))
//! ```
//!
//! in O(n log n). `imdct` maps back to a 2n block scaled by `1 / n`, so
//! windowed overlap-add of consecutive blocks reconstructs the input at half
//! amplitude.

use std::f64::consts::PI;

use super::dct::dct_ii;

/// Forward MDCT: reads `samples[..2n]`, writes `frequencies[..n]`.
pub fn mdct(n: usize, samples: &[f64], frequencies: &mut [f64]) {
    let ns1 = n - 1;
    let nd2 = n >> 1;
    let nm3d4 = n + nd2;
    let nm3d4s1 = nm3d4 - 1;

    // fold the quarter-blocks
    for i in 0..nd2 {
        frequencies[i] = samples[nm3d4 + i] + samples[nm3d4s1 - i];
        frequencies[nd2 + i] = samples[i] - samples[ns1 - i];
    }

    let rad = PI / (n << 2) as f64;
    for (i, f) in frequencies.iter_mut().enumerate().take(n) {
        let cs = 2.0 * (rad * ((i << 1) + 1) as f64).cos();
        if i < nd2 {
            *f /= -cs;
        } else {
            *f /= cs;
        }
    }

    dct_ii(n, frequencies);

    for i in 0..ns1 {
        frequencies[i] += frequencies[i + 1];
    }
}

/// Inverse MDCT: reads `frequencies[..n]`, writes `samples[..2n]`.
///
/// `frequencies` is used as working space and holds garbage afterwards.
/// Use [`Mdct::synthesize`] to keep the coefficients intact.
pub fn imdct(n: usize, samples: &mut [f64], frequencies: &mut [f64]) {
    let rad = PI / (n << 2) as f64;
    for (i, f) in frequencies.iter_mut().enumerate().take(n) {
        *f *= 2.0 * (rad * ((i << 1) + 1) as f64).cos();
    }

    dct_ii(n, frequencies);

    // difference equations
    let nh = n >> 1;
    frequencies[0] *= 0.5;
    for i in 0..nh {
        frequencies[i] = -frequencies[i];
        frequencies[i + 1] += frequencies[i];
    }
    for j in (nh + 1)..n {
        frequencies[j] -= frequencies[j - 1];
    }

    let scale = 1.0 / n as f64;
    for f in frequencies.iter_mut().take(n) {
        *f *= scale;
    }

    // unfold into the 2n block
    let ns1 = n - 1;
    let nd2 = n >> 1;
    let nm3d4 = n + nd2;
    let nm3d4s1 = nm3d4 - 1;
    for i in 0..nd2 {
        samples[i] = frequencies[nd2 + i];
        samples[ns1 - i] = -samples[i];
        samples[nm3d4s1 - i] = frequencies[i];
        samples[nm3d4 + i] = frequencies[i];
    }
}

/// Symmetric 2n-point window `sin(pi/2 * sin^2(pi * i / (2n - 1)))`.
pub fn vorbis_window(n: usize) -> Vec<f64> {
    let len = 2 * n;
    let mut window = vec![0.0; len];
    let denom = (len - 1) as f64;
    for i in 0..n {
        let s = (PI * i as f64 / denom).sin();
        let w = (PI / 2.0 * s * s).sin();
        window[i] = w;
        window[len - 1 - i] = w;
    }
    window
}

/// Windowed MDCT of one fixed size with its own working buffers.
#[derive(Debug, Clone)]
pub struct Mdct {
    n: usize,
    window: Vec<f64>,
    /// windowed analysis block (2n)
    block: Vec<f64>,
    /// IMDCT working copy of the coefficients (n)
    scratch: Vec<f64>,
}

impl Mdct {
    /// `n` must be a power of two
    pub fn new(n: usize) -> Self {
        debug_assert!(n.is_power_of_two());
        Mdct {
            n,
            window: vorbis_window(n),
            block: vec![0.0; 2 * n],
            scratch: vec![0.0; n],
        }
    }

    /// number of coefficients per block
    pub fn size(&self) -> usize {
        self.n
    }

    pub fn window(&self) -> &[f64] {
        &self.window
    }

    /// window `block` (2n samples) and transform it into `coefficients` (n)
    pub fn analyze(&mut self, block: &[f64], coefficients: &mut [f64]) {
        for ((dst, &s), &w) in self.block.iter_mut().zip(block).zip(&self.window) {
            *dst = s * w;
        }
        mdct(self.n, &self.block, coefficients);
    }

    /// inverse transform `coefficients` (n) and window the result into `block` (2n)
    pub fn synthesize(&mut self, coefficients: &[f64], block: &mut [f64]) {
        self.scratch.copy_from_slice(&coefficients[..self.n]);
        imdct(self.n, block, &mut self.scratch);
        for (s, &w) in block.iter_mut().zip(&self.window) {
            *s *= w;
        }
    }
}
