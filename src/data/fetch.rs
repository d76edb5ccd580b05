//! Fetch-and-normalize: try each registered source in order, fall back to
//! synthetic data when none of them yields rows.

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::data::clock::Clock;
use crate::data::error::FetchError;
use crate::data::fallback::{FallbackShape, generate_fallback};
use crate::data::sources::Endpoint;
use crate::domain::{FetchResult, Origin};
use crate::io::ingest::{NormalizedTable, normalize_csv};

/// Retrieves the raw body of a tabular resource.
///
/// The HTTP implementation is the only one used in production; tests and
/// `--offline` plug in their own.
pub trait Transport {
    fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Single blocking GET per call, default client timeouts.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let is_html = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("html"));
        if is_html {
            return Err(FetchError::NotTabular {
                reason: "HTML content type",
            });
        }

        resp.text().map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}

/// Transport that refuses every request (`--offline`).
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTransport;

impl Transport for OfflineTransport {
    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        Err(FetchError::Unavailable(format!("offline mode, skipped {url}")))
    }
}

/// Fetches the climate series with first-success-wins semantics.
pub struct ClimateFetcher<T: Transport, C: Clock> {
    transport: T,
    clock: C,
    fallback: FallbackShape,
    seed: u64,
}

impl<T: Transport, C: Clock> ClimateFetcher<T, C> {
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            fallback: FallbackShape::default(),
            seed: 42,
        }
    }

    pub fn with_fallback(mut self, shape: FallbackShape, seed: u64) -> Self {
        self.fallback = shape;
        self.seed = seed;
        self
    }

    /// Try `sources` in declared order; never fails.
    ///
    /// The first source that produces a non-empty normalized table wins and is
    /// tagged `Origin::Remote`. If all of them fail, the synthetic fallback
    /// series is returned tagged `Origin::Fallback`.
    pub fn fetch_normalized(&self, sources: &[Endpoint]) -> FetchResult {
        for endpoint in sources {
            debug!("trying source '{}' ({})", endpoint.name, endpoint.url);
            match self.try_source(endpoint) {
                Ok(table) => {
                    info!(
                        "loaded {} observations from '{}' ({} read, {} invalid, {} future-dated)",
                        table.series.len(),
                        endpoint.name,
                        table.rows_read,
                        table.rows_invalid,
                        table.rows_future,
                    );
                    return FetchResult {
                        series: table.series,
                        origin: Origin::Remote,
                        source: Some(endpoint.name.to_string()),
                    };
                }
                Err(err) => warn!("source '{}' failed: {}", endpoint.name, error_chain(&err)),
            }
        }

        warn!(
            "all {} sources failed; generating {} months of example data",
            sources.len(),
            self.fallback.periods
        );
        let mut rng = StdRng::seed_from_u64(self.seed);
        FetchResult {
            series: generate_fallback(&self.fallback, &mut rng),
            origin: Origin::Fallback,
            source: None,
        }
    }

    fn try_source(&self, endpoint: &Endpoint) -> Result<NormalizedTable, FetchError> {
        let text = self.transport.get_text(endpoint.url)?;
        normalize_csv(&text, &endpoint.columns, self.clock.today())
    }
}

/// `err: cause: cause` rendering for log lines.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::clock::FixedClock;
    use crate::data::sources::ColumnPolicy;

    /// Canned responses by URL; records every request.
    struct StubTransport {
        responses: HashMap<&'static str, &'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl StubTransport {
        fn new(responses: &[(&'static str, &'static str)]) -> Self {
            Self {
                responses: responses.iter().copied().collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for StubTransport {
        fn get_text(&self, url: &str) -> Result<String, FetchError> {
            self.calls.borrow_mut().push(url.to_string());
            self.responses
                .get(url)
                .map(|s| s.to_string())
                .ok_or_else(|| FetchError::Unavailable(url.to_string()))
        }
    }

    const A: Endpoint = Endpoint {
        name: "a",
        url: "http://a",
        columns: ColumnPolicy::NOAA,
    };
    const B: Endpoint = Endpoint {
        name: "b",
        url: "http://b",
        columns: ColumnPolicy::NOAA,
    };
    const C: Endpoint = Endpoint {
        name: "c",
        url: "http://c",
        columns: ColumnPolicy::NOAA,
    };

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
    }

    #[test]
    fn first_successful_source_wins() {
        let transport = StubTransport::new(&[
            ("http://b", "DATE,TAVG\n2020-01-01,1.5\n"),
            ("http://c", "DATE,TAVG\n2020-01-01,9.9\n"),
        ]);
        let fetcher = ClimateFetcher::new(transport, clock());
        let result = fetcher.fetch_normalized(&[A, B, C]);

        assert_eq!(result.origin, Origin::Remote);
        assert_eq!(result.source.as_deref(), Some("b"));
        assert_eq!(result.series.values(), vec![1.5]);
        // `c` is never contacted, `a` is contacted exactly once.
        assert_eq!(*fetcher.transport.calls.borrow(), vec!["http://a", "http://b"]);
    }

    #[test]
    fn empty_and_markup_sources_are_skipped() {
        let transport = StubTransport::new(&[
            ("http://a", "<html><body>metadata page</body></html>"),
            ("http://b", "DATE,TAVG\n2099-01-01,1.0\n"),
            ("http://c", "DATE,TMEAN\n2001-05-01,12.0\n2001-06-01,n/a\n"),
        ]);
        let fetcher = ClimateFetcher::new(transport, clock());
        let result = fetcher.fetch_normalized(&[A, B, C]);

        assert_eq!(result.origin, Origin::Remote);
        assert_eq!(result.source.as_deref(), Some("c"));
        assert_eq!(result.series.len(), 1);
    }

    #[test]
    fn total_failure_yields_fallback() {
        let fetcher = ClimateFetcher::new(StubTransport::new(&[]), clock())
            .with_fallback(FallbackShape::with_periods(36), 5);
        let result = fetcher.fetch_normalized(&[A, B, C]);

        assert_eq!(result.origin, Origin::Fallback);
        assert_eq!(result.source, None);
        assert_eq!(result.series.len(), 36);
        assert!(crate::data::fallback::is_monthly(&result.series));
    }

    #[test]
    fn offline_transport_always_falls_back() {
        let fetcher = ClimateFetcher::new(OfflineTransport, clock());
        let result = fetcher.fetch_normalized(&[A]);
        assert_eq!(result.origin, Origin::Fallback);
        assert_eq!(result.series.len(), crate::data::fallback::DEFAULT_PERIODS);
    }

    #[test]
    fn error_chain_includes_causes() {
        let err = FetchError::Csv(csv::Error::from(std::io::Error::other("disk gone")));
        let rendered = error_chain(&err);
        assert!(rendered.starts_with("CSV parsing failed"));
        assert!(rendered.contains("disk gone"));
    }
}
