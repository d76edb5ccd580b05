//! Command-line parsing for the climate dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/metrics code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Variant;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cdash", version, about = "NOAA climate dashboard with offline fallback data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI (the default when no subcommand is given).
    Tui(DashboardArgs),
    /// Print the text report and an ASCII plot.
    Summary(DashboardArgs),
    /// Write the filtered table to CSV.
    Export(ExportArgs),
}

/// Options shared by every command.
#[derive(Debug, Parser, Clone)]
pub struct DashboardArgs {
    /// Dataset to show.
    #[arg(long, value_enum, default_value_t = Variant::Climate)]
    pub variant: Variant,

    /// First date to include (YYYY-MM-DD, inclusive).
    #[arg(long, value_name = "DATE")]
    pub start: Option<String>,

    /// Last date to include (YYYY-MM-DD, inclusive).
    #[arg(long, value_name = "DATE")]
    pub end: Option<String>,

    /// Trailing rolling-mean window (0 disables smoothing).
    #[arg(long = "smooth", value_name = "N", default_value_t = 0)]
    pub smoothing_window: usize,

    /// Convert plotted values to z-scores.
    #[arg(long)]
    pub standardize: bool,

    /// Skip the network and use generated example data.
    #[arg(long)]
    pub offline: bool,

    /// Random seed for example data.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Length of the example series in months.
    #[arg(long, default_value_t = crate::data::fallback::DEFAULT_PERIODS)]
    pub periods: usize,

    /// Disable the ASCII plot in `summary`.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for `export`.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// Destination CSV file.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    #[command(flatten)]
    pub dashboard: DashboardArgs,
}
