//! Descriptive statistics (count, mean, std, min, quartiles, max).

use super::{mean, sample_std};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n-1); `None` below two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    /// Rows in the conventional order, with their usual labels.
    pub fn rows(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("count", Some(self.count as f64)),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

/// Describe the finite values in `values`.
pub fn describe(values: &[f64]) -> Describe {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Describe::default();
    }
    sorted.sort_by(f64::total_cmp);

    Describe {
        count: sorted.len(),
        mean: mean(&sorted),
        std: sample_std(&sorted),
        min: sorted.first().copied(),
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// Quantile of sorted data with linear interpolation between closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() as f64 - 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_matches_textbook_values() {
        let d = describe(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(d.count, 4);
        assert_eq!(d.mean, Some(2.5));
        assert_eq!(d.min, Some(1.0));
        assert_eq!(d.max, Some(4.0));
        assert_eq!(d.q25, Some(1.75));
        assert_eq!(d.median, Some(2.5));
        assert_eq!(d.q75, Some(3.25));
        let std = d.std.unwrap();
        assert!((std - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_no_std() {
        let d = describe(&[7.0]);
        assert_eq!(d.count, 1);
        assert_eq!(d.std, None);
        assert_eq!(d.median, Some(7.0));
    }

    #[test]
    fn empty_input_is_all_none() {
        let d = describe(&[]);
        assert_eq!(d.count, 0);
        assert!(d.rows().iter().skip(1).all(|(_, v)| v.is_none()));
    }

    #[test]
    fn non_finite_values_are_ignored() {
        let d = describe(&[1.0, f64::NAN, 3.0]);
        assert_eq!(d.count, 2);
        assert_eq!(d.mean, Some(2.0));
    }
}
