//! Shared dashboard pipeline used by the CLI commands and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! source registry -> fetch/normalize (or fallback) -> range filter ->
//! standardize -> smoothing -> statistics/correlation/trend
//!
//! The front-ends then only deal with presentation (printing vs widgets).

use std::rc::Rc;

use crate::data::{
    CLIMATE_KEY, CLIMATE_SOURCES, ClimateFetcher, Clock, DatasetCache, FallbackShape, HttpTransport,
    OfflineTransport, SystemClock, Transport,
};
use crate::domain::{Controls, DashboardConfig, FetchResult, Origin, Series, UserRecord};
use crate::math::{Trend, linear_trend};
use crate::metrics::{
    CorrelationMatrix, Describe, MetricError, describe, filter_range, pearson, rolling_mean, standardize,
};

/// Everything the climate dashboard renders for one set of controls.
#[derive(Debug, Clone)]
pub struct ClimateView {
    pub origin: Origin,
    pub source: Option<String>,
    /// Rows in the cached series before filtering.
    pub total_rows: usize,
    /// Range-filtered observations, chronologically sorted.
    pub filtered: Series,
    /// Statistics of the raw filtered values.
    pub stats: Describe,
    pub correlation: CorrelationMatrix,
    /// Values as plotted: standardized when requested and defined, raw otherwise.
    pub display: Vec<f64>,
    /// Set when standardization was requested but is undefined for this data.
    pub standardize_error: Option<MetricError>,
    /// Trailing rolling mean of `display` (identity when the window is 0).
    pub smoothed: Vec<Option<f64>>,
    /// OLS trend of `display` against fractional year.
    pub trend: Result<Trend, MetricError>,
    pub controls: Controls,
}

impl ClimateView {
    pub fn standardized(&self) -> bool {
        self.controls.standardize && self.standardize_error.is_none()
    }

    /// `(fractional year, display value)` pairs for charting.
    pub fn display_points(&self) -> Vec<(f64, f64)> {
        self.filtered
            .iter()
            .zip(&self.display)
            .map(|(o, &v)| (o.decimal_year(), v))
            .collect()
    }

    /// Defined smoothed points for charting.
    pub fn smoothed_points(&self) -> Vec<(f64, f64)> {
        self.filtered
            .iter()
            .zip(&self.smoothed)
            .filter_map(|(o, v)| v.map(|v| (o.decimal_year(), v)))
            .collect()
    }
}

/// Everything the study dashboard renders for one set of controls.
#[derive(Debug, Clone)]
pub struct StudyView {
    /// Records inside the year range.
    pub records: Vec<UserRecord>,
    pub temp_stats: Describe,
    pub score_stats: Describe,
    /// `date` / `summer_avg_temp_C` / `math_score` correlation matrix.
    pub correlation: CorrelationMatrix,
    pub temp_score_r: Option<f64>,
    /// Scatter axes (standardized when requested and defined).
    pub scatter: Vec<(f64, f64)>,
    pub standardize_error: Option<MetricError>,
    /// Rolling mean of the math score over years.
    pub smoothed_score: Vec<Option<f64>>,
    /// OLS `math_score ~ summer_avg_temp_C` on the scatter axes.
    pub trend: Result<Trend, MetricError>,
    pub controls: Controls,
}

impl StudyView {
    pub fn standardized(&self) -> bool {
        self.controls.standardize && self.standardize_error.is_none()
    }
}

/// Fetch (or reuse) the climate series according to `config`.
pub fn load_climate(config: &DashboardConfig, cache: &mut DatasetCache) -> Rc<FetchResult> {
    let shape = FallbackShape::with_periods(config.periods);
    if config.offline {
        let fetcher = ClimateFetcher::new(OfflineTransport, SystemClock).with_fallback(shape, config.seed);
        load_climate_with(&fetcher, cache)
    } else {
        let fetcher = ClimateFetcher::new(HttpTransport::new(), SystemClock).with_fallback(shape, config.seed);
        load_climate_with(&fetcher, cache)
    }
}

/// Read-through load with an explicit fetcher (tests inject their own).
pub fn load_climate_with<T: Transport, C: Clock>(
    fetcher: &ClimateFetcher<T, C>,
    cache: &mut DatasetCache,
) -> Rc<FetchResult> {
    cache.get_or_load(CLIMATE_KEY, || fetcher.fetch_normalized(CLIMATE_SOURCES))
}

/// Apply the dashboard controls to a fetched series.
pub fn climate_view(result: &FetchResult, controls: &Controls) -> ClimateView {
    let filtered = filter_range(&result.series, &controls.range).sorted_by_date();
    let raw = filtered.values();

    let stats = describe(&raw);
    let correlation = CorrelationMatrix::year_value(&filtered);

    let (display, standardize_error) = apply_standardize(&raw, controls.standardize);
    let smoothed = rolling_mean(&display, controls.smoothing_window);

    let trend_points: Vec<(f64, f64)> = filtered
        .iter()
        .zip(&display)
        .map(|(o, &v)| (o.decimal_year(), v))
        .collect();
    let trend = linear_trend(&trend_points);

    ClimateView {
        origin: result.origin,
        source: result.source.clone(),
        total_rows: result.series.len(),
        filtered,
        stats,
        correlation,
        display,
        standardize_error,
        smoothed,
        trend,
        controls: *controls,
    }
}

/// Apply the dashboard controls to study records.
pub fn study_view(records: &[UserRecord], controls: &Controls) -> StudyView {
    let mut records = crate::data::study::filter_records(records, &controls.range);
    records.sort_by_key(|r| r.year);

    let years: Vec<f64> = records.iter().map(|r| f64::from(r.year)).collect();
    let temps: Vec<f64> = records.iter().map(|r| r.summer_avg_temp_c).collect();
    let scores: Vec<f64> = records.iter().map(|r| r.math_score).collect();

    let correlation = CorrelationMatrix::from_columns(&[
        ("date", years.as_slice()),
        ("summer_avg_temp_C", temps.as_slice()),
        ("math_score", scores.as_slice()),
    ]);

    let (xs, x_err) = apply_standardize(&temps, controls.standardize);
    let (ys, y_err) = apply_standardize(&scores, controls.standardize);
    let standardize_error = x_err.or(y_err);
    // Mixed axes would be meaningless: either both are standardized or neither.
    let scatter: Vec<(f64, f64)> = if standardize_error.is_some() {
        temps.iter().copied().zip(scores.iter().copied()).collect()
    } else {
        xs.into_iter().zip(ys).collect()
    };

    StudyView {
        temp_stats: describe(&temps),
        score_stats: describe(&scores),
        temp_score_r: pearson(&temps, &scores),
        correlation,
        trend: linear_trend(&scatter),
        scatter,
        standardize_error,
        smoothed_score: rolling_mean(&scores, controls.smoothing_window),
        records,
        controls: *controls,
    }
}

fn apply_standardize(values: &[f64], requested: bool) -> (Vec<f64>, Option<MetricError>) {
    if !requested {
        return (values.to_vec(), None);
    }
    match standardize(values) {
        Ok(z) => (z, None),
        Err(err) => (values.to_vec(), Some(err)),
    }
}
