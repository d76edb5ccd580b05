//! Source registry: where the climate series may be fetched from, and how to
//! read each response.
//!
//! Column resolution is configured per endpoint rather than inferred while
//! parsing, so every policy can be tested against a header row on its own.

/// How to locate one logical column (date or value) in a CSV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRule {
    /// Header names to try, in order (case-insensitive).
    pub candidates: &'static [&'static str],
    /// Column index used when no candidate matches.
    pub fallback_index: Option<usize>,
}

impl ColumnRule {
    pub const fn named(candidates: &'static [&'static str], fallback_index: Option<usize>) -> Self {
        Self {
            candidates,
            fallback_index,
        }
    }

    pub const fn positional(index: usize) -> Self {
        Self {
            candidates: &[],
            fallback_index: Some(index),
        }
    }

    /// Resolve this rule against a header row.
    ///
    /// Headers are compared after trimming whitespace and a UTF-8 BOM, ignoring
    /// ASCII case. The positional fallback only applies if the column exists.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Option<usize> {
        for candidate in self.candidates {
            if let Some(idx) = headers
                .iter()
                .position(|h| normalize_header_name(h.as_ref()) == candidate.to_ascii_lowercase())
            {
                return Some(idx);
            }
        }
        self.fallback_index.filter(|&idx| idx < headers.len())
    }
}

/// Date + value column rules for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPolicy {
    pub date: ColumnRule,
    pub value: ColumnRule,
}

impl ColumnPolicy {
    /// Policy for files written by `io::export` (`date,value`).
    pub const EXPORTED: ColumnPolicy = ColumnPolicy {
        date: ColumnRule::named(&["date"], Some(0)),
        value: ColumnRule::named(&["value"], Some(1)),
    };

    /// Generic NOAA policy: temperature average, else mean, else anomaly,
    /// else the second column.
    pub const NOAA: ColumnPolicy = ColumnPolicy {
        date: ColumnRule::named(&["date"], Some(0)),
        value: ColumnRule::named(&["tavg", "tmean", "anomaly", "value"], Some(1)),
    };

    /// Resolve both columns; `None` if either cannot be located or they collide.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Option<(usize, usize)> {
        let date = self.date.resolve(headers)?;
        let value = self.value.resolve(headers)?;
        if date == value {
            return None;
        }
        Some((date, value))
    }
}

/// One candidate remote dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub url: &'static str,
    pub columns: ColumnPolicy,
}

/// NOAA "Climate at a Glance" global land+ocean monthly anomalies.
///
/// Layout: a few preamble lines, then `Year,Anomaly` with `YYYYMM` dates.
const CAAG_GLOBAL: Endpoint = Endpoint {
    name: "NOAA Climate at a Glance (global land+ocean anomaly)",
    url: "https://www.ncei.noaa.gov/access/monitoring/climate-at-a-glance/global/time-series/globe/land_ocean/1/0/1850-2024/data.csv",
    columns: ColumnPolicy {
        date: ColumnRule::named(&["date", "year"], Some(0)),
        value: ColumnRule::named(&["anomaly", "value"], Some(1)),
    },
};

/// GHCN monthly summaries (GSOM) for New York Central Park.
///
/// The first column is `STATION`, so the date must be resolved by name.
const GSOM_CENTRAL_PARK: Endpoint = Endpoint {
    name: "NOAA GHCN GSOM (USW00094728)",
    url: "https://www.ncei.noaa.gov/data/gsom/access/USW00094728.csv",
    columns: ColumnPolicy {
        date: ColumnRule::named(&["date"], None),
        value: ColumnRule::named(&["tavg", "tmean"], None),
    },
};

/// data.gov catalog entry for GHCN-D monthly summaries.
const DATA_GOV_GHCN: Endpoint = Endpoint {
    name: "data.gov GHCN-D monthly summaries",
    url: "https://catalog.data.gov/dataset/monthly-summaries-of-the-global-historical-climatology-network-daily-ghcn-d2",
    columns: ColumnPolicy::NOAA,
};

/// Sources for the climate variant, tried in order.
pub const CLIMATE_SOURCES: &[Endpoint] = &[CAAG_GLOBAL, GSOM_CENTRAL_PARK, DATA_GOV_GHCN];

/// Lowercase, trimmed header name without a BOM prefix.
pub fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, name lookups silently miss.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}
