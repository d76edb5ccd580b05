//! Year extraction and Pearson correlation.

use crate::domain::Series;

use super::is_negligible;

/// Integer calendar year of every observation, in series order.
pub fn years(series: &Series) -> Vec<i32> {
    series.iter().map(|o| o.year()).collect()
}

/// Pearson correlation coefficient of paired samples.
///
/// Pairs where either side is non-finite are skipped. Returns `None` when the
/// inputs differ in length, fewer than two pairs remain, or either side has
/// zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() {
        return None;
    }
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (x, y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if is_negligible((sxx / n).sqrt(), pairs.iter().map(|p| p.0))
        || is_negligible((syy / n).sqrt(), pairs.iter().map(|p| p.1))
    {
        return None;
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    Some(r.clamp(-1.0, 1.0))
}

/// Labelled pairwise correlation matrix; undefined cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Build the matrix for named, equally long columns.
    pub fn from_columns(columns: &[(&str, &[f64])]) -> Self {
        let labels = columns.iter().map(|(name, _)| name.to_string()).collect();
        let cells = columns
            .iter()
            .map(|(_, a)| columns.iter().map(|(_, b)| pearson(a, b)).collect())
            .collect();
        Self { labels, cells }
    }

    /// Matrix for a series' year and value columns.
    pub fn year_value(series: &Series) -> Self {
        let years: Vec<f64> = years(series).into_iter().map(f64::from).collect();
        let values = series.values();
        Self::from_columns(&[("year", years.as_slice()), ("value", values.as_slice())])
    }

    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == row)?;
        let j = self.labels.iter().position(|l| l == col)?;
        self.cells[i][j]
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::Observation;

    #[test]
    fn perfect_positive_and_negative() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let z = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &z).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn undefined_cases_are_none() {
        assert_eq!(pearson(&[1.0], &[2.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
        assert_eq!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[0.1, 0.1, 0.1], &[0.1, 0.1, 0.1]), None);
        assert_eq!(pearson(&[1.0, f64::NAN], &[1.0, 2.0]), None);
    }

    #[test]
    fn tiny_magnitudes_still_correlate() {
        let x = [0.0, 1e-16, 2e-16, 3e-16];
        assert!((pearson(&x, &x).unwrap() - 1.0).abs() < 1e-12);
        let y = [3e-16, 2e-16, 1e-16, 0.0];
        assert!((pearson(&x, &y).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn year_value_matrix() {
        let series: Series = (0..6)
            .map(|i| {
                Observation::new(
                    NaiveDate::from_ymd_opt(2000 + i, 6, 1).unwrap(),
                    10.0 + i as f64 * 0.5,
                )
            })
            .collect();
        let m = CorrelationMatrix::year_value(&series);
        assert_eq!(m.labels, vec!["year", "value"]);
        assert!((m.get("year", "value").unwrap() - 1.0).abs() < 1e-12);
        assert!((m.get("year", "year").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(m.get("year", "nope"), None);
    }

    #[test]
    fn single_year_has_undefined_year_correlation() {
        let series: Series = (1..=3)
            .map(|m| Observation::new(NaiveDate::from_ymd_opt(2020, m, 1).unwrap(), m as f64))
            .collect();
        let m = CorrelationMatrix::year_value(&series);
        assert_eq!(m.get("year", "value"), None);
        assert!(m.get("value", "value").is_some());
    }
}
