//! Z-score standardization.

use super::{MetricError, is_negligible, mean, sample_std};

/// `(x - mean) / std` for every value, using the sample standard deviation.
///
/// Constant input has no defined scale and returns `ZeroVariance` instead of
/// a vector of infinities or NaNs.
pub fn standardize(values: &[f64]) -> Result<Vec<f64>, MetricError> {
    let (Some(m), Some(s)) = (mean(values), sample_std(values)) else {
        return Err(MetricError::InsufficientData {
            needed: 2,
            got: values.len(),
        });
    };
    if !s.is_finite() || is_negligible(s, values.iter().copied()) {
        return Err(MetricError::ZeroVariance);
    }
    Ok(values.iter().map(|v| (v - m) / s).collect())
}
