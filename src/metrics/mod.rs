//! Derived metrics over a series or study records.
//!
//! Every transform here is stateless: inputs are borrowed, results are new
//! values. Statistics that are mathematically undefined for the given input
//! come back as `None` or `MetricError`, never as NaN or a panic.

use thiserror::Error;

pub mod correlation;
pub mod describe;
pub mod filter;
pub mod rolling;
pub mod standardize;

pub use correlation::{CorrelationMatrix, pearson, years};
pub use describe::{Describe, describe};
pub use filter::filter_range;
pub use rolling::rolling_mean;
pub use standardize::standardize;

/// Why a statistic could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("needs at least {needed} data points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("zero variance")]
    ZeroVariance,
}

/// Arithmetic mean; `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n-1 denominator); `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Whether `spread` is rounding residue relative to the magnitude of `values`.
///
/// Sums of identical values can leave residue (e.g. `1e-17`), which would
/// otherwise turn a constant column into a huge standardized value. The
/// tolerance scales with the largest `|x|` and the sample size, so data that
/// is tiny in absolute terms keeps its variance.
pub(crate) fn is_negligible(spread: f64, values: impl IntoIterator<Item = f64>) -> bool {
    let (n, scale) = values
        .into_iter()
        .fold((0usize, 0.0_f64), |(n, scale), v| (n + 1, scale.max(v.abs())));
    spread <= f64::EPSILON * scale * (n as f64 + 16.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_uses_n_minus_one() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // Population std is 2.0; sample std is sqrt(32/7).
        let s = sample_std(&v).unwrap();
        assert!((s - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(mean(&v), Some(5.0));
    }

    #[test]
    fn degenerate_inputs_are_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn negligible_spread_is_relative_to_magnitude() {
        let tiny = [0.0, 1e-16, 2e-16, 3e-16];
        assert!(!is_negligible(sample_std(&tiny).unwrap(), tiny));
        assert!(is_negligible(0.0, [0.0, 0.0]));
        assert!(is_negligible(1e-12, [1e6, 1e6]));
        assert!(!is_negligible(1e-6, [1.0, 1.0]));
    }
}
