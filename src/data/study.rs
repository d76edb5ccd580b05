//! Synthetic "summer heat vs. math scores" study data.
//!
//! 21 yearly records (2004-2024). Summer temperature rises linearly with a
//! little noise; the math score falls linearly with temperature, plus noise.
//! Everything is driven by a seeded RNG so the dataset is reproducible.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DateRange, UserRecord};

pub const STUDY_FIRST_YEAR: i32 = 2004;
pub const STUDY_YEARS: usize = 21;

/// Baseline summer average temperature (deg C) in the first year.
const BASE_TEMP_C: f64 = 24.0;
/// Warming per year (deg C).
const TEMP_TREND_PER_YEAR: f64 = 0.08;
const TEMP_NOISE_SD: f64 = 0.25;

/// Math score at the baseline temperature.
const BASE_SCORE: f64 = 78.0;
/// Score points lost per deg C above baseline.
const SCORE_PER_DEGREE: f64 = -4.0;
const SCORE_NOISE_SD: f64 = 0.8;

/// Generate the study records for `seed`.
pub fn generate_study_records(seed: u64) -> Vec<UserRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    // Both sigmas are positive constants.
    let temp_noise = Normal::new(0.0, TEMP_NOISE_SD).ok();
    let score_noise = Normal::new(0.0, SCORE_NOISE_SD).ok();

    let mut out = Vec::with_capacity(STUDY_YEARS);
    for i in 0..STUDY_YEARS {
        let year = STUDY_FIRST_YEAR + i as i32;
        let temp_eps = temp_noise.as_ref().map_or(0.0, |d| d.sample(&mut rng));
        let score_eps = score_noise.as_ref().map_or(0.0, |d| d.sample(&mut rng));

        let temp = BASE_TEMP_C + TEMP_TREND_PER_YEAR * i as f64 + temp_eps;
        let score = BASE_SCORE + SCORE_PER_DEGREE * (temp - BASE_TEMP_C) + score_eps;

        out.push(UserRecord {
            year,
            summer_avg_temp_c: round2(temp),
            math_score: round2(score),
        });
    }
    out
}

/// Records whose year falls inside `range` (year granularity).
pub fn filter_records(records: &[UserRecord], range: &DateRange) -> Vec<UserRecord> {
    records
        .iter()
        .filter(|r| range.contains_year(r.year))
        .copied()
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
