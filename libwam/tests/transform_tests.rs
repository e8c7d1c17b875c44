#[cfg(test)]
mod transform_tests {
    use libwam_audio::transform::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f64::consts::PI;

    fn random_vec(rng: &mut StdRng, len: usize) -> Vec<f64> {
        (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }

    fn direct_dct_ii(x: &[f64]) -> Vec<f64> {
        let n = x.len();
        (0..n)
            .map(|k| {
                x.iter()
                    .enumerate()
                    .map(|(i, &v)| v * (PI * k as f64 * (2 * i + 1) as f64 / (2 * n) as f64).cos())
                    .sum()
            })
            .collect()
    }

    fn direct_mdct(samples: &[f64]) -> Vec<f64> {
        let n = samples.len() / 2;
        (0..n)
            .map(|k| {
                samples
                    .iter()
                    .enumerate()
                    .map(|(i, &s)| {
                        s * (PI / n as f64 * (i as f64 + 0.5 + n as f64 / 2.0) * (k as f64 + 0.5))
                            .cos()
                    })
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_dct_ii_matches_direct_sum() {
        let mut rng = StdRng::seed_from_u64(1);
        for log_n in 0..=8 {
            let n = 1 << log_n;
            let x = random_vec(&mut rng, n);
            let expected = direct_dct_ii(&x);

            let mut fast = x.clone();
            dct_ii(n, &mut fast);

            for k in 0..n {
                assert!(
                    (fast[k] - expected[k]).abs() < 1e-9 * n as f64,
                    "n={} k={}: {} vs {}",
                    n,
                    k,
                    fast[k],
                    expected[k]
                );
            }
        }
    }

    #[test]
    fn test_dct_iii_inverts_dct_ii_up_to_half_length() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..25 {
            let n = 1usize << rng.gen_range(1..=11);
            let x = random_vec(&mut rng, n);

            let mut y = x.clone();
            dct_ii(n, &mut y);
            dct_iii(n, &mut y);

            let factor = n as f64 / 2.0;
            for i in 0..n {
                assert!(
                    (y[i] - factor * x[i]).abs() < 1e-9 * n as f64,
                    "n={} i={}",
                    n,
                    i
                );
            }
        }
    }

    #[test]
    fn test_mdct_matches_direct_sum() {
        let mut rng = StdRng::seed_from_u64(3);
        for n in [4usize, 8, 32, 128] {
            let samples = random_vec(&mut rng, 2 * n);
            let expected = direct_mdct(&samples);

            let mut frequencies = vec![0.0; n];
            mdct(n, &samples, &mut frequencies);

            for k in 0..n {
                assert!(
                    (frequencies[k] - expected[k]).abs() < 1e-9 * n as f64,
                    "n={} k={}",
                    n,
                    k
                );
            }
        }
    }

    #[test]
    fn test_window_shape() {
        let n = 256;
        let window = vorbis_window(n);
        assert_eq!(window.len(), 2 * n);
        assert_eq!(window[0], 0.0);
        for i in 0..n {
            assert_eq!(window[i], window[2 * n - 1 - i]);
            assert!((0.0..=1.0).contains(&window[i]));
            // close to power-complementary
            let sum = window[i] * window[i] + window[i + n] * window[i + n];
            assert!((sum - 1.0).abs() < 0.01, "i={} sum={}", i, sum);
        }
    }

    #[test]
    fn test_windowed_overlap_add_reconstructs_at_half_gain() {
        let n = 256;
        let frames = 6;
        let mut rng = StdRng::seed_from_u64(4);
        let signal = random_vec(&mut rng, n * frames);

        let mut transform = Mdct::new(n);
        let mut previous_input = vec![0.0; n];
        let mut previous_output = vec![0.0; n];
        let mut block = vec![0.0; 2 * n];
        let mut coefficients = vec![0.0; n];
        let mut synthesized = vec![0.0; 2 * n];
        let mut output = Vec::new();

        for f in 0..frames {
            let current = &signal[f * n..(f + 1) * n];
            block[..n].copy_from_slice(&previous_input);
            block[n..].copy_from_slice(current);
            previous_input.copy_from_slice(current);

            transform.analyze(&block, &mut coefficients);
            transform.synthesize(&coefficients, &mut synthesized);

            for i in 0..n {
                output.push(previous_output[i] + synthesized[i]);
            }
            previous_output.copy_from_slice(&synthesized[n..]);
        }

        // output lags by one frame
        for i in 0..n * (frames - 1) {
            let restored = 2.0 * output[n + i];
            assert!(
                (restored - signal[i]).abs() < 0.01,
                "sample {}: {} vs {}",
                i,
                restored,
                signal[i]
            );
        }
    }

    #[test]
    fn test_synthesize_keeps_coefficients() {
        let n = 64;
        let mut rng = StdRng::seed_from_u64(5);
        let coefficients = random_vec(&mut rng, n);
        let copy = coefficients.clone();

        let mut transform = Mdct::new(n);
        let mut block = vec![0.0; 2 * n];
        transform.synthesize(&coefficients, &mut block);

        assert_eq!(coefficients, copy);
        assert!(block.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_imdct_matches_synthesize_before_windowing() {
        let n = 32;
        let mut rng = StdRng::seed_from_u64(6);
        let coefficients = random_vec(&mut rng, n);

        let mut scratch = coefficients.clone();
        let mut raw = vec![0.0; 2 * n];
        imdct(n, &mut raw, &mut scratch);

        let mut transform = Mdct::new(n);
        let mut windowed = vec![0.0; 2 * n];
        transform.synthesize(&coefficients, &mut windowed);

        for i in 0..2 * n {
            assert!((windowed[i] - raw[i] * transform.window()[i]).abs() < 1e-12);
        }
    }
}
