//! `climate-dash` library crate.
//!
//! The binary (`cdash`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fetch/metrics pipeline is shared by the TUI and the plain CLI
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod metrics;
pub mod plot;
pub mod report;
pub mod tui;
