//! CSV ingest and normalization.
//!
//! This module turns a heterogeneous climate CSV into a clean `Series` of
//! `(date, value)` observations.
//!
//! Design goals:
//! - **Policy-driven schema**: which columns hold the date and value is decided
//!   by the endpoint's `ColumnPolicy`, not by ad-hoc lookups here
//! - **Row-level leniency**: unparseable dates/values drop the row, never the table
//! - **Deterministic behavior**: "today" is passed in, not read from the wall clock
//! - **Separation of concerns**: no network or statistics logic here

use chrono::NaiveDate;
use csv::StringRecord;

use crate::data::FetchError;
use crate::data::sources::ColumnPolicy;
use crate::domain::{Observation, Series};

/// Ingest output: normalized series + row accounting.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub series: Series,
    pub rows_read: usize,
    /// Rows dropped because the date or value could not be parsed.
    pub rows_invalid: usize,
    /// Rows dropped because their date lies after `today`.
    pub rows_future: usize,
}

/// Normalize CSV text into a series using `policy`.
///
/// Leading preamble lines (records with fewer than two non-empty fields, such
/// as the title/units lines NOAA puts above the header) are skipped. A
/// `Missing: <marker>` preamble line declares a sentinel; value cells equal to
/// it count as invalid. Fails if the body is not tabular, the columns cannot
/// be resolved, or no rows survive.
pub fn normalize_csv(text: &str, policy: &ColumnPolicy, today: NaiveDate) -> Result<NormalizedTable, FetchError> {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.is_empty() {
        return Err(FetchError::NotTabular { reason: "empty body" });
    }
    if trimmed.starts_with('<') {
        return Err(FetchError::NotTabular { reason: "markup document" });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(trimmed.as_bytes());

    let mut records = reader.records();
    let mut missing: Option<MissingMarker> = None;

    let headers = loop {
        match records.next() {
            Some(record) => {
                let record = record?;
                if non_empty_fields(&record) >= 2 {
                    break record;
                }
                if let Some(marker) = record.iter().find_map(MissingMarker::from_preamble) {
                    missing = Some(marker);
                }
            }
            None => return Err(FetchError::NotTabular { reason: "no header row" }),
        }
    };

    let header_names: Vec<String> = headers.iter().map(str::to_string).collect();
    let (date_idx, value_idx) = policy
        .resolve(&header_names)
        .ok_or(FetchError::Columns { headers: header_names })?;

    let mut observations = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_invalid = 0usize;
    let mut rows_future = 0usize;

    for result in records {
        rows_read += 1;

        // A malformed row (e.g. bad UTF-8) is dropped like any other invalid row.
        let Ok(record) = result else {
            rows_invalid += 1;
            continue;
        };

        let date = record.get(date_idx).and_then(parse_date);
        let value = record
            .get(value_idx)
            .filter(|raw| !missing.as_ref().is_some_and(|m| m.matches(raw)))
            .and_then(parse_value);

        let (Some(date), Some(value)) = (date, value) else {
            rows_invalid += 1;
            continue;
        };

        if date > today {
            rows_future += 1;
            continue;
        }

        observations.push(Observation::new(date, value));
    }

    if observations.is_empty() {
        return Err(FetchError::Empty { rows_read });
    }

    Ok(NormalizedTable {
        series: Series::new(observations),
        rows_read,
        rows_invalid,
        rows_future,
    })
}

fn non_empty_fields(record: &StringRecord) -> usize {
    record.iter().filter(|f| !f.is_empty()).count()
}

/// Missing-value sentinel declared in a NOAA preamble (`Missing: -999`).
#[derive(Debug, Clone, PartialEq)]
struct MissingMarker {
    raw: String,
    numeric: Option<f64>,
}

impl MissingMarker {
    fn from_preamble(field: &str) -> Option<Self> {
        let (key, rest) = field.split_once(':')?;
        if !key.trim().eq_ignore_ascii_case("missing") {
            return None;
        }
        let raw = rest.trim();
        if raw.is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            numeric: parse_value(raw),
        })
    }

    /// `-999` also matches `-999.0` and `-999.00`.
    fn matches(&self, cell: &str) -> bool {
        let cell = cell.trim();
        cell == self.raw || self.numeric.is_some_and(|m| parse_value(cell) == Some(m))
    }
}

/// Best-effort date parsing.
///
/// Accepts full dates (`YYYY-MM-DD`, `YYYY/MM/DD`, and US month-first
/// `MM/DD/YYYY`, `MM-DD-YYYY`),
/// ISO datetimes (time part ignored), and coarser forms that NOAA uses for
/// monthly/annual products: `YYYY-MM`, `YYYYMM`, `YYYY` (first day of the
/// period).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // ISO datetime: "2020-05-01T00:00:00" or "2020-05-01 00:00:00".
    if s.len() > 10 && matches!(s.as_bytes()[10], b'T' | b' ') {
        if let Some(prefix) = s.get(..10) {
            if let Ok(d) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                return Some(d);
            }
        }
    }

    let all_digits = s.bytes().all(|b| b.is_ascii_digit());
    match s.len() {
        7 if s.as_bytes()[4] == b'-' => {
            let year = s.get(..4)?.parse().ok()?;
            let month = s.get(5..)?.parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, 1)
        }
        6 if all_digits => {
            let year = s[..4].parse().ok()?;
            let month = s[4..].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, 1)
        }
        4 if all_digits => NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1),
        _ => None,
    }
}

/// Best-effort numeric coercion; missing markers and non-finite values are `None`.
pub fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_date_variants() {
        assert_eq!(parse_date("2020-05-17"), Some(d(2020, 5, 17)));
        assert_eq!(parse_date("2020/05/17"), Some(d(2020, 5, 17)));
        assert_eq!(parse_date("05/17/2020"), Some(d(2020, 5, 17)));
        assert_eq!(parse_date("01/02/2020"), Some(d(2020, 1, 2)));
        assert_eq!(parse_date("01-02-2020"), Some(d(2020, 1, 2)));
        assert_eq!(parse_date("17/05/2020"), None);
        assert_eq!(parse_date("2020-05-17T12:30:00Z"), Some(d(2020, 5, 17)));
        assert_eq!(parse_date("2020-05"), Some(d(2020, 5, 1)));
        assert_eq!(parse_date("202005"), Some(d(2020, 5, 1)));
        assert_eq!(parse_date("1850"), Some(d(1850, 1, 1)));
        assert_eq!(parse_date("202013"), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn parse_value_coerces_or_drops() {
        assert_eq!(parse_value(" 1.25 "), Some(1.25));
        assert_eq!(parse_value("-0.5"), Some(-0.5));
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
        assert_eq!(parse_value("abc"), None);
    }

    #[test]
    fn drops_invalid_and_future_rows() {
        let csv = "date,value\n2020-01-01,1.0\nbad,2.0\n2020-02-01,oops\n2030-01-01,3.0\n2020-03-01,4.0\n";
        let table = normalize_csv(csv, &ColumnPolicy::EXPORTED, today()).unwrap();
        assert_eq!(table.rows_read, 5);
        assert_eq!(table.rows_invalid, 2);
        assert_eq!(table.rows_future, 1);
        assert_eq!(table.series.values(), vec![1.0, 4.0]);
    }

    #[test]
    fn skips_noaa_preamble() {
        let csv = "Global Land and Ocean January - December Temperature Anomalies\n\
                   Units: Degrees Celsius\n\
                   Base Period: 1901-2000\n\
                   Missing: -999\n\
                   Year,Anomaly\n\
                   185001,-0.46\n\
                   185002,-0.23\n";
        let table = normalize_csv(csv, &ColumnPolicy::NOAA, today()).unwrap();
        assert_eq!(table.series.len(), 2);
        assert_eq!(table.series.as_slice()[0].date, d(1850, 1, 1));
        assert_eq!(table.series.as_slice()[1].value, -0.23);
    }

    #[test]
    fn declared_missing_marker_drops_rows() {
        let csv = "Title\n\
                   Units: Degrees Celsius\n\
                   Missing: -999\n\
                   Year,Anomaly\n\
                   185001,-0.46\n\
                   185002,-999\n\
                   185003,-999.0\n";
        let table = normalize_csv(csv, &ColumnPolicy::NOAA, d(2025, 1, 1)).unwrap();
        assert_eq!(table.series.values(), vec![-0.46]);
        assert_eq!(table.rows_read, 3);
        assert_eq!(table.rows_invalid, 2);
    }

    #[test]
    fn undeclared_marker_is_a_value() {
        let csv = "date,value\n2020-01-01,-999\n";
        let table = normalize_csv(csv, &ColumnPolicy::EXPORTED, today()).unwrap();
        assert_eq!(table.series.values(), vec![-999.0]);
    }

    #[test]
    fn keeps_source_order() {
        let csv = "date,value\n2020-03-01,3\n2020-01-01,1\n2020-02-01,2\n";
        let table = normalize_csv(csv, &ColumnPolicy::EXPORTED, today()).unwrap();
        assert_eq!(table.series.values(), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn rejects_markup_and_empty_tables() {
        let html = "<!DOCTYPE html><html><body>catalog</body></html>";
        assert!(matches!(
            normalize_csv(html, &ColumnPolicy::NOAA, today()),
            Err(FetchError::NotTabular { .. })
        ));

        let empty = "date,value\nx,y\n";
        assert!(matches!(
            normalize_csv(empty, &ColumnPolicy::EXPORTED, today()),
            Err(FetchError::Empty { rows_read: 1 })
        ));

        assert!(matches!(
            normalize_csv("   ", &ColumnPolicy::NOAA, today()),
            Err(FetchError::NotTabular { .. })
        ));
    }

    #[test]
    fn unresolvable_columns_fail() {
        let csv = "STATION,NAME\nUSW1,Park\n";
        let policy = ColumnPolicy {
            date: crate::data::sources::ColumnRule::named(&["date"], None),
            value: crate::data::sources::ColumnRule::named(&["tavg"], None),
        };
        assert!(matches!(
            normalize_csv(csv, &policy, today()),
            Err(FetchError::Columns { .. })
        ));
    }
}
