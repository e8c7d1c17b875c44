//! Energy-proportional choice of which coefficients to transmit.

use crate::core::nibble::set_flag;

/// Flag at most `table_size` coefficients in `flags` and return how many.
///
/// Each pass splits the remaining log-domain power into `table_size` equal
/// shares. Sweeping from the top of the spectrum down, every time the
/// running sum fills a share the strongest coefficient seen in that stretch
/// is picked and its power zeroed. Passes repeat until the table is full or
/// no power is left, so loud regions get dense coverage and quiet regions
/// still get some.
///
/// Zeroed coefficients never win a stretch, and on equal power the first one
/// met in the sweep (the higher index) is kept.
pub fn select_coefficients(powers: &mut [f64], table_size: usize, flags: &mut [u32]) -> usize {
    flags.fill(0);
    let mut selected = 0;

    while selected < table_size {
        let total: f64 = powers.iter().sum();
        if total <= 0.0 {
            break;
        }
        let threshold = total / table_size as f64;

        let mut running = 0.0;
        let mut tracked: Option<usize> = None;
        let mut tracked_power = 0.0;
        let mut picked = false;

        for k in (0..powers.len()).rev() {
            if selected >= table_size {
                break;
            }
            let power = powers[k];
            running += power;
            if power > tracked_power {
                tracked_power = power;
                tracked = Some(k);
            }
            if running >= threshold {
                if let Some(index) = tracked.take() {
                    set_flag(flags, index);
                    powers[index] = 0.0;
                    selected += 1;
                    running = 0.0;
                    tracked_power = 0.0;
                    picked = true;
                }
            }
        }

        // a pass that never filled a share still takes its strongest coefficient
        if !picked {
            if let Some(index) = tracked {
                set_flag(flags, index);
                powers[index] = 0.0;
                selected += 1;
            }
        }
    }

    selected
}
