//! DCT-II / DCT-III after Byeong Gi Lee's recursive butterfly.
//!
//! Both transforms run in place on `x[..n]`. `dct_ii` is the unnormalized
//! type-II transform
//!
//! ```text
//! X[k] = sum_i x[i] * cos(pi * k * (2i + 1) / 2n)
//! ```
//!
//! and `dct_iii` inverts it up to a factor: `dct_iii(dct_ii(x)) == (n / 2) * x`.

use std::f64::consts::PI;

/// bit-reversal style reorder shared by both directions
fn swap_elements(n: usize, x: &mut [f64]) {
    let nh = n >> 1;
    let nh1 = nh + 1;
    let nq = n >> 2;
    let mut j = 0;
    let mut i = 0;
    while i < nh {
        x.swap(i + nh, j + 1);
        if i < j {
            x.swap(i + nh1, j + nh1);
            x.swap(i, j);
        }

        // increment j as a bit-reversed counter
        let mut k = nq;
        loop {
            j ^= k;
            if j >= k {
                break;
            }
            k >>= 1;
        }
        i += 2;
    }
}

/// Unnormalized DCT-II of `x[..n]`, in place.
pub fn dct_ii(n: usize, x: &mut [f64]) {
    // butterflies
    let mut rad = PI / (n << 1) as f64;
    let mut m = n;
    while m > 1 {
        let mh = m >> 1;
        for i in 0..mh {
            let cs = 2.0 * (rad * ((i << 1) + 1) as f64).cos();
            let mut j = i;
            let mut k = (m - 1) - i;
            while j < n {
                let x0 = x[j];
                let x1 = x[k];
                x[j] = x0 + x1;
                x[k] = (x0 - x1) * cs;
                j += m;
                k += m;
            }
        }
        rad *= 2.0;
        m = mh;
    }

    swap_elements(n, x);

    // difference equations
    let mut m = n;
    while m > 2 {
        let mh = m >> 1;
        let mq = mh >> 1;
        for i in (mq + mh)..m {
            x[i] = -x[i] - x[i - mh];
            let mut xt = x[i];
            let mut j = i + mh;
            while j < n {
                let k = j + mh;
                x[j] -= xt;
                xt = x[j];
                x[k] = -x[k] - xt;
                xt = x[k];
                j += m;
            }
        }
        m = mh;
    }

    for v in x.iter_mut().take(n).skip(1) {
        *v *= 0.5;
    }
}

/// DCT-III of `x[..n]`, in place. Undoes `dct_ii` up to a factor of `n / 2`.
pub fn dct_iii(n: usize, x: &mut [f64]) {
    x[0] *= 0.5;

    // difference equations, in reverse
    let (mut m, mut mh, mut mq) = (4, 2, 1);
    while m <= n {
        for i in (n - mq)..n {
            let mut j = i;
            while m < j {
                let k = j - mh;
                x[j] = -x[j] - x[k];
                j = k - mh;
                x[k] += x[j];
            }
            x[j] = -x[j] - x[j - mh];
        }
        mq = mh;
        mh = m;
        m <<= 1;
    }

    swap_elements(n, x);

    // butterflies
    let mut rad = PI / 2.0;
    let (mut m, mut mh) = (2, 1);
    while m <= n {
        rad *= 0.5;
        for i in 0..mh {
            let cs = 2.0 * (rad * ((i << 1) + 1) as f64).cos();
            let mut j = i;
            let mut k = (m - 1) - i;
            while j < n {
                let x0 = x[j];
                let x1 = x[k] / cs;
                x[j] = x0 + x1;
                x[k] = x0 - x1;
                j += m;
                k += m;
            }
        }
        mh = m;
        m <<= 1;
    }
}
