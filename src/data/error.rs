use thiserror::Error;

/// Why a single source could not produce a series.
///
/// These never leave `fetch_normalized`; they are logged and the next source
/// is tried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network request failed for {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Response is not tabular text ({reason})")]
    NotTabular { reason: &'static str },

    #[error("CSV parsing failed")]
    Csv(#[from] csv::Error),

    #[error("Could not resolve date/value columns from header {headers:?}")]
    Columns { headers: Vec<String> },

    #[error("No valid rows remain after normalization ({rows_read} read)")]
    Empty { rows_read: usize },

    /// Used by test transports and offline mode.
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}
