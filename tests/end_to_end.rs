//! End-to-end pipeline tests: stubbed transport -> fetch -> cache -> views.

use std::cell::Cell;

use chrono::NaiveDate;
use climate_dash::app::pipeline::{climate_view, load_climate_with, study_view};
use climate_dash::data::fallback::is_monthly;
use climate_dash::data::{
    CLIMATE_KEY, CLIMATE_SOURCES, ClimateFetcher, DatasetCache, FallbackShape, FetchError, FixedClock,
    Transport, generate_study_records,
};
use climate_dash::domain::{Controls, DateRange, Origin};
use climate_dash::io::export::{read_series_csv, write_series_csv};

/// Fails every request and counts them.
struct DownTransport {
    calls: Cell<usize>,
}

impl Transport for DownTransport {
    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.calls.set(self.calls.get() + 1);
        Err(FetchError::Unavailable(format!("connection refused: {url}")))
    }
}

/// Serves one CSV body for every URL.
struct FixedBody(&'static str);

impl Transport for FixedBody {
    fn get_text(&self, _url: &str) -> Result<String, FetchError> {
        Ok(self.0.to_string())
    }
}

fn today() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
}

#[test]
fn total_failure_yields_monthly_fallback() {
    let transport = DownTransport { calls: Cell::new(0) };
    let fetcher = ClimateFetcher::new(transport, today()).with_fallback(FallbackShape::with_periods(120), 9);

    let mut cache = DatasetCache::new();
    let result = load_climate_with(&fetcher, &mut cache);

    assert_eq!(result.origin, Origin::Fallback);
    assert_eq!(result.source, None);
    assert_eq!(result.series.len(), 120);
    assert!(is_monthly(&result.series));

    // Second read is served from the cache; no new requests.
    let again = load_climate_with(&fetcher, &mut cache);
    assert_eq!(again.series, result.series);
    assert_eq!(cache.loads(), 1);

    assert!(cache.invalidate(CLIMATE_KEY));
    load_climate_with(&fetcher, &mut cache);
    assert_eq!(cache.loads(), 2);
}

#[test]
fn remote_csv_flows_through_to_views() {
    let body = "Global Land and Ocean January-December Temperature Anomalies\n\
                Units: Degrees Celsius\n\
                Base Period: 1901-2000\n\
                Date,Anomaly\n\
                2019,0.95\n\
                2020,0.98\n\
                2021,0.84\n\
                2022,0.86\n\
                2023,1.17\n\
                2025,9.99\n";
    let fetcher = ClimateFetcher::new(FixedBody(body), today());
    let mut cache = DatasetCache::new();
    let result = load_climate_with(&fetcher, &mut cache);

    assert_eq!(result.origin, Origin::Remote);
    assert_eq!(result.source.as_deref(), Some(CLIMATE_SOURCES[0].name));
    // 2025 is after the fixed clock and must be dropped.
    assert_eq!(result.series.len(), 5);

    let controls = Controls {
        range: DateRange::new(NaiveDate::from_ymd_opt(2020, 1, 1), NaiveDate::from_ymd_opt(2022, 12, 31)),
        smoothing_window: 2,
        standardize: false,
    };
    let view = climate_view(&result, &controls);
    assert_eq!(view.filtered.values(), vec![0.98, 0.84, 0.86]);
    assert_eq!(view.smoothed[0], None);
    assert!((view.smoothed[1].unwrap() - 0.91).abs() < 1e-12);
    assert_eq!(view.stats.count, 3);
}

#[test]
fn export_then_reparse_matches_view() {
    let fetcher = ClimateFetcher::new(DownTransport { calls: Cell::new(0) }, today())
        .with_fallback(FallbackShape::with_periods(36), 1);
    let mut cache = DatasetCache::new();
    let result = load_climate_with(&fetcher, &mut cache);
    let view = climate_view(&result, &Controls::default());

    let mut buf = Vec::new();
    write_series_csv(&mut buf, &view.filtered).unwrap();
    let back = read_series_csv(&String::from_utf8(buf).unwrap()).unwrap();
    assert_eq!(back, view.filtered);
}

#[test]
fn study_records_correlate_strongly_negative() {
    for seed in [1, 42, 2024] {
        let records = generate_study_records(seed);
        assert_eq!(records.len(), 21);
        assert_eq!(records[0].year, 2004);
        assert_eq!(records[20].year, 2024);

        let view = study_view(&records, &Controls::default());
        assert!(view.temp_score_r.unwrap() < -0.8, "seed {seed}");
    }
}

#[test]
fn study_range_filters_by_year() {
    let records = generate_study_records(42);
    let controls = Controls {
        range: DateRange::new(NaiveDate::from_ymd_opt(2010, 1, 1), NaiveDate::from_ymd_opt(2014, 12, 31)),
        ..Controls::default()
    };
    let view = study_view(&records, &controls);
    let years: Vec<i32> = view.records.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2010, 2011, 2012, 2013, 2014]);
}
