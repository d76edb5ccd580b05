//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observations and series (`Observation`, `Series`, `FetchResult`, `Origin`)
//! - the study variant's rows (`UserRecord`)
//! - dashboard controls and configuration (`Controls`, `DateRange`, `DashboardConfig`)

pub mod types;

pub use types::*;
