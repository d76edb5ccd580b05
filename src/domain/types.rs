//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed from the fetch layer to the metrics layer without copies of the raw table
//! - exported to CSV
//! - rendered by the TUI or the text report

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A single `(date, value)` pair from a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    /// Calendar year of the observation date.
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Date expressed as a fractional year (e.g. `2000.5` for early July 2000).
    ///
    /// Used as the x-axis for time-series charts and for trend fitting.
    pub fn decimal_year(&self) -> f64 {
        let year = self.date.year();
        let days_in_year = if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
            366.0
        } else {
            365.0
        };
        year as f64 + self.date.ordinal0() as f64 / days_in_year
    }
}

/// An ordered, read-only sequence of observations.
///
/// Order is whatever the producer emitted (source row order for remote data).
/// There are no mutable accessors: transforms borrow the series and return
/// new values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series(Vec<Observation>);

impl Series {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self(observations)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.0.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.0.iter().map(|o| o.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.0.iter().map(|o| o.date).collect()
    }

    /// A chronologically sorted copy (stable for equal dates).
    pub fn sorted_by_date(&self) -> Series {
        let mut out = self.0.clone();
        out.sort_by_key(|o| o.date);
        Series(out)
    }

    /// First and last date, in chronological terms.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.0.iter().map(|o| o.date).min()?;
        let max = self.0.iter().map(|o| o.date).max()?;
        Some((min, max))
    }
}

impl FromIterator<Observation> for Series {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Series(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One row of the synthetic "summer heat vs. math scores" study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Study year.
    #[serde(rename = "date")]
    pub year: i32,
    #[serde(rename = "summer_avg_temp_C")]
    pub summer_avg_temp_c: f64,
    pub math_score: f64,
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Remote,
    Fallback,
}

impl Origin {
    pub fn notice(self) -> &'static str {
        match self {
            Origin::Remote => "Loaded NOAA data",
            Origin::Fallback => "NOAA data unavailable: using example data",
        }
    }
}

/// Output of the fetch stage: the series plus its provenance tag.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub series: Series,
    pub origin: Origin,
    /// Name of the endpoint that produced the series (remote only).
    pub source: Option<String>,
}

/// Inclusive date range filter. Missing bounds are open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| s <= date) && self.end.is_none_or(|e| date <= e)
    }

    pub fn contains_year(&self, year: i32) -> bool {
        self.start.is_none_or(|s| s.year() <= year) && self.end.is_none_or(|e| year <= e.year())
    }
}

/// Controls read back from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub range: DateRange,
    /// Trailing rolling-mean window; `0` disables smoothing.
    pub smoothing_window: usize,
    pub standardize: bool,
}

/// Which dashboard to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// NOAA temperature/anomaly time series.
    Climate,
    /// Synthetic summer temperature vs. math score study.
    Study,
}

impl Variant {
    pub fn display_name(self) -> &'static str {
        match self {
            Variant::Climate => "NOAA temperature",
            Variant::Study => "Summer heat vs. math scores",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Variant::Climate => Variant::Study,
            Variant::Study => Variant::Climate,
        }
    }
}

/// Resolved run configuration (built from CLI args).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub variant: Variant,
    pub controls: Controls,
    /// Skip the network entirely and use fallback data.
    pub offline: bool,
    /// Seed for fallback noise and the study generator.
    pub seed: u64,
    /// Fallback series length (months).
    pub periods: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Climate,
            controls: Controls::default(),
            offline: false,
            seed: 42,
            periods: crate::data::fallback::DEFAULT_PERIODS,
            plot: true,
            plot_width: 100,
            plot_height: 25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn date_range_is_inclusive_and_open_ended() {
        let range = DateRange::new(Some(d(2001, 1, 1)), Some(d(2001, 12, 31)));
        assert!(range.contains(d(2001, 1, 1)));
        assert!(range.contains(d(2001, 12, 31)));
        assert!(!range.contains(d(2000, 12, 31)));
        assert!(!range.contains(d(2002, 1, 1)));

        let open = DateRange::new(None, Some(d(2001, 6, 1)));
        assert!(open.contains(d(1900, 1, 1)));
        assert!(!open.contains(d(2001, 6, 2)));
    }

    #[test]
    fn decimal_year_starts_at_integer_year() {
        let obs = Observation::new(d(2004, 1, 1), 0.0);
        assert_eq!(obs.decimal_year(), 2004.0);
        let mid = Observation::new(d(2004, 7, 2), 0.0);
        assert!((mid.decimal_year() - 2004.5).abs() < 0.01);
    }

    #[test]
    fn sorted_copy_leaves_original_order() {
        let series = Series::new(vec![
            Observation::new(d(2002, 1, 1), 2.0),
            Observation::new(d(2001, 1, 1), 1.0),
        ]);
        let sorted = series.sorted_by_date();
        assert_eq!(sorted.as_slice()[0].value, 1.0);
        assert_eq!(series.as_slice()[0].value, 2.0);
        assert_eq!(series.date_bounds(), Some((d(2001, 1, 1), d(2002, 1, 1))));
    }
}
