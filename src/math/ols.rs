//! Least-squares trend lines.
//!
//! Trend overlays solve the two-parameter problem
//!
//! ```text
//! minimize Σ (y_i - (a + b x_i))^2
//! ```
//!
//! Implementation choices:
//! - The design matrix `[1, x]` is solved with SVD, which copes with tall
//!   matrices and reports ill-conditioned systems instead of panicking.
//! - If the SVD solve rejects the system at every tolerance, the closed-form
//!   normal-equation solution is used so the chart still gets a line.
//! - Degenerate inputs (fewer than two points, no spread in x) are reported as
//!   `MetricError` rather than producing a NaN slope.

use nalgebra::{DMatrix, DVector};

use crate::metrics::MetricError;

/// Fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; `None` when y has no variance.
    pub r_squared: Option<f64>,
    /// Number of finite pairs used.
    pub n: usize,
    /// `(x, fitted y)` at every used x, sorted by x (ready for a line overlay).
    pub fitted: Vec<(f64, f64)>,
}

impl Trend {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Ordinary least squares of `y ~ x` over the finite pairs in `points`.
pub fn linear_trend(points: &[(f64, f64)]) -> Result<Trend, MetricError> {
    let mut pairs: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let n = pairs.len();
    if n < 2 {
        return Err(MetricError::InsufficientData { needed: 2, got: n });
    }

    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let sxx: f64 = pairs.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    if crate::metrics::is_negligible((sxx / n as f64).sqrt(), pairs.iter().map(|p| p.0)) {
        return Err(MetricError::ZeroVariance);
    }

    // Center x so the SVD sees a well-conditioned matrix even for
    // calendar-year predictors (x around 2000 with a spread of a few years).
    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { pairs[i].0 - mean_x });
    let rhs = DVector::from_iterator(n, pairs.iter().map(|p| p.1));

    let (intercept_c, slope) = match solve_least_squares(&design, &rhs) {
        Some(beta) => (beta[0], beta[1]),
        None => {
            log::debug!("SVD trend solve rejected; using closed-form fit");
            closed_form(&pairs, mean_x, sxx)
        }
    };
    let intercept = intercept_c - slope * mean_x;

    let mean_y = rhs.mean();
    let ss_tot: f64 = pairs.iter().map(|p| (p.1 - mean_y).powi(2)).sum();
    let ss_res: f64 = pairs
        .iter()
        .map(|p| (p.1 - (intercept + slope * p.0)).powi(2))
        .sum();
    let r_squared = if crate::metrics::is_negligible((ss_tot / n as f64).sqrt(), pairs.iter().map(|p| p.1)) {
        None
    } else {
        Some((1.0 - ss_res / ss_tot).clamp(0.0, 1.0))
    };

    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let fitted = pairs.iter().map(|p| (p.0, intercept + slope * p.0)).collect();

    Ok(Trend {
        slope,
        intercept,
        r_squared,
        n,
        fitted,
    })
}

/// Normal-equation fit with centered x; returns `(intercept at mean_x, slope)`.
fn closed_form(pairs: &[(f64, f64)], mean_x: f64, sxx: f64) -> (f64, f64) {
    let n = pairs.len() as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let sxy: f64 = pairs.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
    (mean_y, sxy / sxx)
}
