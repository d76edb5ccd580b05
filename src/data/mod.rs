//! Data acquisition: source registry, fetch-and-normalize, fallback synthesis,
//! the study generator, and the session cache.

pub mod cache;
pub mod clock;
pub mod error;
pub mod fallback;
pub mod fetch;
pub mod sources;
pub mod study;

pub use cache::{CLIMATE_KEY, DatasetCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::FetchError;
pub use fallback::{FallbackShape, generate_fallback, generate_fallback_seeded};
pub use fetch::{ClimateFetcher, HttpTransport, OfflineTransport, Transport};
pub use sources::{CLIMATE_SOURCES, ColumnPolicy, ColumnRule, Endpoint};
pub use study::generate_study_records;
