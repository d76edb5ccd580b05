//! Property tests for the metric invariants.
//!
//! Uses proptest to verify:
//! 1. Rolling mean: identity for windows 0/1, one defined value at w = N
//! 2. Correlation: a series correlates perfectly with itself
//! 3. Standardization: undefined for constant input, zero mean otherwise
//! 4. Range filter: inclusive bounds, subset of input
//! 5. CSV export re-parses to the same pairs (arbitrary dates, any values)

use chrono::{Duration, NaiveDate};
use climate_dash::data::FetchError;
use climate_dash::data::fallback::generate_fallback_seeded;
use climate_dash::domain::{DateRange, Observation, Series};
use climate_dash::io::export::{read_series_csv, write_series_csv};
use climate_dash::metrics::{MetricError, filter_range, mean, pearson, rolling_mean, standardize};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_values(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1000.0..1000.0_f64, min_len..200)
}

/// Values rescaled by a power of ten, from `1e-20` up to `1e3`.
fn arb_scaled_values(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (arb_values(min_len), -20i32..3).prop_map(|(values, exp)| {
        let scale = 10f64.powi(exp);
        values.into_iter().map(|v| v * scale).collect()
    })
}

fn spread(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max) - values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
}

fn arb_series() -> impl Strategy<Value = Series> {
    prop::collection::vec((0i64..20_000, -50.0..50.0_f64), 0..100).prop_map(|rows| {
        rows.into_iter()
            .map(|(day, v)| Observation::new(base_date() + Duration::days(day), v))
            .collect()
    })
}

// ── 1. Rolling mean ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn rolling_small_windows_are_identity(values in arb_values(0)) {
        for w in [0, 1] {
            let out = rolling_mean(&values, w);
            let expected: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
            prop_assert_eq!(out, expected);
        }
    }

    #[test]
    fn rolling_full_window_defines_only_last(values in arb_values(2)) {
        let n = values.len();
        let out = rolling_mean(&values, n);
        prop_assert_eq!(out.len(), n);
        prop_assert!(out[..n - 1].iter().all(Option::is_none));
        let last = out[n - 1].unwrap();
        let m = mean(&values).unwrap();
        prop_assert!((last - m).abs() <= 1e-9 * m.abs().max(1.0));
    }

    #[test]
    fn rolling_leading_gap_is_window_minus_one(values in arb_values(1), w in 2usize..20) {
        let out = rolling_mean(&values, w);
        let undefined = out.iter().take_while(|v| v.is_none()).count();
        prop_assert_eq!(undefined, (w - 1).min(values.len()));
    }
}

// ── 2. Correlation ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn self_correlation_is_one(values in arb_scaled_values(2)) {
        prop_assume!(spread(&values) > 0.0);
        let r = pearson(&values, &values).unwrap();
        prop_assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_input_has_no_correlation(c in -100.0..100.0_f64, n in 2usize..50, ys in arb_values(50)) {
        let xs = vec![c; n];
        prop_assert_eq!(pearson(&xs, &ys[..n]), None);
    }
}

// ── 3. Standardization ───────────────────────────────────────────────

proptest! {
    #[test]
    fn constant_standardization_is_undefined(c in -1e6..1e6_f64, n in 2usize..100) {
        prop_assert_eq!(standardize(&vec![c; n]), Err(MetricError::ZeroVariance));
    }

    #[test]
    fn standardized_values_are_centered(values in arb_scaled_values(2)) {
        prop_assume!(spread(&values) > 0.0);
        let z = standardize(&values).unwrap();
        prop_assert!(mean(&z).unwrap().abs() < 1e-9);
    }
}

// ── 4. Range filter ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn filter_keeps_exactly_the_inclusive_window(
        series in arb_series(),
        a in 0i64..20_000,
        b in 0i64..20_000,
    ) {
        let start = base_date() + Duration::days(a);
        let end = base_date() + Duration::days(b);
        let range = DateRange::new(Some(start), Some(end));
        let out = filter_range(&series, &range);

        prop_assert!(out.iter().all(|o| start <= o.date && o.date <= end));
        let expected = series.iter().filter(|o| start <= o.date && o.date <= end).count();
        prop_assert_eq!(out.len(), expected);
        if start > end {
            prop_assert!(out.is_empty());
        }
    }

    #[test]
    fn unbounded_filter_is_identity(series in arb_series()) {
        prop_assert_eq!(filter_range(&series, &DateRange::unbounded()), series);
    }
}

// ── 5. CSV round trip ────────────────────────────────────────────────

proptest! {
    #[test]
    fn exported_series_reparses(series in arb_series()) {
        let mut buf = Vec::new();
        write_series_csv(&mut buf, &series).unwrap();
        let text = String::from_utf8(buf).unwrap();
        match read_series_csv(&text) {
            Ok(back) => prop_assert_eq!(back, series),
            Err(err) => {
                prop_assert!(series.is_empty());
                prop_assert!(matches!(err, FetchError::Empty { rows_read: 0 }), "unexpected error: {:?}", err);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn exported_fallback_reparses(periods in 1usize..400, seed in any::<u64>()) {
        let series = generate_fallback_seeded(periods, seed);
        let mut buf = Vec::new();
        write_series_csv(&mut buf, &series).unwrap();
        let back = read_series_csv(&String::from_utf8(buf).unwrap()).unwrap();
        prop_assert_eq!(back, series);
    }
}
