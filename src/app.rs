//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - fetches NOAA data (or falls back to example data)
//! - prints reports/plots, writes exports, or starts the TUI

use chrono::NaiveDate;
use clap::Parser;

use crate::cli::{Command, DashboardArgs, ExportArgs};
use crate::data::{DatasetCache, generate_study_records};
use crate::domain::{Controls, DashboardConfig, DateRange, Variant};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cdash` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    // Reads RUST_LOG; warnings (fallback use, failed sources) show by default.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).try_init();

    // `cdash` and `cdash --offline` behave like `cdash tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(&args),
        Command::Summary(args) => handle_summary(&args),
        Command::Export(args) => handle_export(&args),
    }
}

fn handle_tui(args: &DashboardArgs) -> Result<(), AppError> {
    let config = config_from_args(args)?;
    crate::tui::run(config)
}

fn handle_summary(args: &DashboardArgs) -> Result<(), AppError> {
    let config = config_from_args(args)?;
    let mut cache = DatasetCache::new();

    match config.variant {
        Variant::Climate => {
            let result = pipeline::load_climate(&config, &mut cache);
            let view = pipeline::climate_view(&result, &config.controls);
            println!("{}", crate::report::format_climate_summary(&view));
            if config.plot {
                println!(
                    "{}",
                    crate::plot::render_climate_plot(&view, config.plot_width, config.plot_height)
                );
            }
        }
        Variant::Study => {
            let records = generate_study_records(config.seed);
            let view = pipeline::study_view(&records, &config.controls);
            println!("{}", crate::report::format_study_summary(&view));
            if config.plot {
                println!(
                    "{}",
                    crate::plot::render_study_plot(&view, config.plot_width, config.plot_height)
                );
            }
        }
    }

    Ok(())
}

fn handle_export(args: &ExportArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.dashboard)?;

    let rows = match config.variant {
        Variant::Climate => {
            let mut cache = DatasetCache::new();
            let result = pipeline::load_climate(&config, &mut cache);
            let view = pipeline::climate_view(&result, &config.controls);
            eprintln!("{}", crate::report::format_origin(view.origin, view.source.as_deref()));
            crate::io::export::export_series(&args.out, &view.filtered)?;
            view.filtered.len()
        }
        Variant::Study => {
            let records = generate_study_records(config.seed);
            let view = pipeline::study_view(&records, &config.controls);
            crate::io::export::export_records(&args.out, &view.records)?;
            view.records.len()
        }
    };

    log::info!("exported {rows} rows to {}", args.out.display());
    println!("Wrote {rows} rows to {}", args.out.display());
    Ok(())
}

pub fn config_from_args(args: &DashboardArgs) -> Result<DashboardConfig, AppError> {
    let start = parse_bound("--start", args.start.as_deref())?;
    let end = parse_bound("--end", args.end.as_deref())?;
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            log::warn!("--start {s} is after --end {e}; the selection will be empty");
        }
    }

    Ok(DashboardConfig {
        variant: args.variant,
        controls: Controls {
            range: DateRange::new(start, end),
            smoothing_window: args.smoothing_window,
            standardize: args.standardize,
        },
        offline: args.offline,
        seed: args.seed,
        periods: args.periods,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
    })
}

fn parse_bound(flag: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| AppError::usage(format!("Invalid {flag} date '{raw}' (expected YYYY-MM-DD): {e}")))
}

/// Rewrite argv so `cdash` defaults to `cdash tui`.
///
/// Rules:
/// - `cdash`                      -> `cdash tui`
/// - `cdash --offline ...`        -> `cdash tui --offline ...`
/// - `cdash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "summary" | "export");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
