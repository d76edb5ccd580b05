//! Input/output helpers.
//!
//! - CSV normalization into a `Series` (`ingest`)
//! - CSV exports of series and study records (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
