//! Trailing rolling mean.
//!
//! Lookback: window - 1 (first defined value at index window-1).

/// Trailing mean over `window` values.
///
/// - `window == 0`: smoothing disabled, every value passes through
///   (a window of one is the same thing).
/// - `window > 0`: position `i >= window-1` holds the mean of
///   `values[i+1-window..=i]`; earlier positions are `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window <= 1 {
        return values.iter().copied().map(Some).collect();
    }

    let n = values.len();
    let mut out = vec![None; n];
    if n < window {
        return out;
    }

    // Running sum, re-seeded from the window periodically to bound drift.
    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = Some(sum / window as f64);

    for i in window..n {
        if (i - window + 1) % 1024 == 0 {
            sum = values[i + 1 - window..=i].iter().sum();
        } else {
            sum += values[i] - values[i - window];
        }
        out[i] = Some(sum / window as f64);
    }

    out
}
