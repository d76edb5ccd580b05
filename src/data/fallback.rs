//! Synthetic fallback series used when every remote source fails.
//!
//! Shape: month-end dates from January 2000, a single low-frequency sine cycle
//! across the whole series, plus independent Gaussian noise. Length, spacing
//! and amplitude envelope are fixed by `FallbackShape`; only the noise depends
//! on the RNG, so seeding the RNG makes the whole series reproducible.

use std::f64::consts::TAU;

use chrono::{Datelike, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Observation, Series};

/// Default number of monthly periods (20 years).
pub const DEFAULT_PERIODS: usize = 240;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackShape {
    pub start_year: i32,
    /// 1-based month of the first observation.
    pub start_month: u32,
    pub periods: usize,
    pub amplitude: f64,
    /// Total phase covered by the sine from first to last point (radians).
    pub phase_span: f64,
    pub noise_sd: f64,
}

impl Default for FallbackShape {
    fn default() -> Self {
        Self {
            start_year: 2000,
            start_month: 1,
            periods: DEFAULT_PERIODS,
            amplitude: 1.0,
            phase_span: TAU,
            noise_sd: 0.2,
        }
    }
}

impl FallbackShape {
    pub fn with_periods(periods: usize) -> Self {
        Self {
            periods,
            ..Self::default()
        }
    }
}

/// Generate the fallback series with the caller's RNG.
pub fn generate_fallback<R: Rng + ?Sized>(shape: &FallbackShape, rng: &mut R) -> Series {
    // An invalid sigma (negative/NaN) degrades to a noise-free curve rather than failing.
    let noise = Normal::new(0.0, shape.noise_sd).ok();

    let n = shape.periods;
    let mut out = Vec::with_capacity(n);

    for i in 0..n {
        let Some(date) = month_end_offset(shape.start_year, shape.start_month, i) else {
            break;
        };

        // numpy-style linspace: first point at 0, last point at `phase_span`.
        let x = if n > 1 {
            shape.phase_span * i as f64 / (n as f64 - 1.0)
        } else {
            0.0
        };

        let eps = match &noise {
            Some(dist) => dist.sample(&mut *rng),
            None => 0.0,
        };
        out.push(Observation::new(date, shape.amplitude * x.sin() + eps));
    }

    Series::new(out)
}

/// Deterministic fallback series of `periods` months.
pub fn generate_fallback_seeded(periods: usize, seed: u64) -> Series {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_fallback(&FallbackShape::with_periods(periods), &mut rng)
}

/// Last day of the month `offset` months after (`year`, `month`).
fn month_end_offset(year: i32, month: u32, offset: usize) -> Option<NaiveDate> {
    let total = (month.checked_sub(1)? as i64) + offset as i64;
    let y = year as i64 + total.div_euclid(12);
    let m = total.rem_euclid(12) as u32 + 1;
    month_end(i32::try_from(y).ok()?, m)
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.pred_opt()
}

/// True if consecutive dates are exactly one calendar month apart.
pub fn is_monthly(series: &Series) -> bool {
    series.as_slice().windows(2).all(|w| {
        let (a, b) = (w[0].date, w[1].date);
        let months_a = a.year() * 12 + a.month() as i32;
        let months_b = b.year() * 12 + b.month() as i32;
        months_b - months_a == 1
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shape_has_240_month_ends() {
        let series = generate_fallback_seeded(DEFAULT_PERIODS, 7);
        assert_eq!(series.len(), 240);

        let first = series.as_slice()[0].date;
        let last = series.as_slice()[239].date;
        assert_eq!(first, NaiveDate::from_ymd_opt(2000, 1, 31).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2019, 12, 31).unwrap());

        // Leap-year February lands on the 29th.
        assert_eq!(series.as_slice()[1].date, NaiveDate::from_ymd_opt(2000, 2, 29).unwrap());

        assert!(is_monthly(&series));
        assert!(series.as_slice().windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn same_seed_same_series() {
        let a = generate_fallback_seeded(60, 123);
        let b = generate_fallback_seeded(60, 123);
        let c = generate_fallback_seeded(60, 124);
        assert_eq!(a, b);
        assert_ne!(a.values(), c.values());
        assert_eq!(a.dates(), c.dates());
    }

    #[test]
    fn noise_free_shape_is_one_sine_cycle() {
        let shape = FallbackShape {
            noise_sd: 0.0,
            periods: 5,
            ..FallbackShape::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let values = generate_fallback(&shape, &mut rng).values();
        let expected = [0.0, 1.0, 0.0, -1.0, 0.0];
        for (v, e) in values.iter().zip(expected) {
            assert!((v - e).abs() < 1e-9, "got {v}, expected {e}");
        }
    }

    #[test]
    fn envelope_stays_near_amplitude() {
        let series = generate_fallback_seeded(DEFAULT_PERIODS, 42);
        // 1.0 amplitude + 0.2 sigma noise: values beyond +/-2.2 would be a 6-sigma event.
        assert!(series.iter().all(|o| o.value.abs() < 2.2));
    }

    #[test]
    fn zero_and_single_period() {
        assert!(generate_fallback_seeded(0, 1).is_empty());
        let one = generate_fallback_seeded(1, 1);
        assert_eq!(one.len(), 1);
    }
}
