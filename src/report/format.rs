//! Formatted terminal output for the `summary` command.
//!
//! We keep formatting code in one place so:
//! - the metrics code stays clean and testable
//! - output changes are localized (the TUI reuses the table builders)

use crate::app::pipeline::{ClimateView, StudyView};
use crate::domain::{Controls, Origin};
use crate::math::Trend;
use crate::metrics::{CorrelationMatrix, Describe, MetricError};

/// Shown under every climate report and in the TUI footer.
pub const ATTRIBUTION: &str = "Data: NOAA National Centers for Environmental Information (Climate at a Glance, GSOM, GHCN).";

/// Format the climate report (origin, controls, stats, correlation, trend).
pub fn format_climate_summary(view: &ClimateView) -> String {
    let mut out = String::new();

    out.push_str("=== cdash - NOAA temperature ===\n");
    out.push_str(&format_origin(view.origin, view.source.as_deref()));
    out.push('\n');
    out.push_str(&format_controls(&view.controls));
    out.push('\n');

    let bounds = view
        .filtered
        .date_bounds()
        .map(|(a, b)| format!("{a} .. {b}"))
        .unwrap_or_else(|| "no rows in range".to_string());
    out.push_str(&format!(
        "Rows: {} of {} | {bounds}\n",
        view.filtered.len(),
        view.total_rows
    ));
    if let Some(err) = view.standardize_error {
        out.push_str(&format!("Standardize skipped: {err}\n"));
    }

    out.push_str("\nSummary statistics (value):\n");
    out.push_str(&format_describe(&[("value", &view.stats)]));

    out.push_str("\nCorrelation (year vs value):\n");
    out.push_str(&format_correlation(&view.correlation));

    let axis = if view.standardized() { "z-score" } else { "value" };
    out.push_str(&format!("\nTrend ({axis} per year): {}\n", format_trend(&view.trend)));

    out.push('\n');
    out.push_str(ATTRIBUTION);
    out.push('\n');
    out
}

/// Format the study report.
pub fn format_study_summary(view: &StudyView) -> String {
    let mut out = String::new();

    out.push_str("=== cdash - Summer heat vs. math scores ===\n");
    out.push_str("Synthetic example data (generated locally).\n");
    out.push_str(&format_controls(&view.controls));
    out.push('\n');
    out.push_str(&format!("Rows: {}\n", view.records.len()));
    if let Some(err) = view.standardize_error {
        out.push_str(&format!("Standardize skipped: {err}\n"));
    }

    out.push_str("\nSummary statistics:\n");
    out.push_str(&format_describe(&[
        ("summer_avg_temp_C", &view.temp_stats),
        ("math_score", &view.score_stats),
    ]));

    out.push_str("\nCorrelation matrix:\n");
    out.push_str(&format_correlation(&view.correlation));
    out.push_str(&format!(
        "\nPearson r (temperature, math score): {}\n",
        fmt_opt(view.temp_score_r, 3)
    ));
    out.push_str(&format!("Trend (math_score ~ temperature): {}\n", format_trend(&view.trend)));
    out
}

/// Origin notice line, naming the endpoint when the data is remote.
pub fn format_origin(origin: Origin, source: Option<&str>) -> String {
    match (origin, source) {
        (Origin::Remote, Some(name)) => format!("{} ({name})", origin.notice()),
        _ => origin.notice().to_string(),
    }
}

pub fn format_controls(controls: &Controls) -> String {
    let bound = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
    let smoothing = match controls.smoothing_window {
        0 | 1 => "off".to_string(),
        w => format!("{w}"),
    };
    format!(
        "Range: {} .. {} | smoothing: {smoothing} | standardize: {}",
        bound(controls.range.start),
        bound(controls.range.end),
        if controls.standardize { "on" } else { "off" },
    )
}

/// Describe table with one column per named block.
pub fn format_describe(columns: &[(&str, &Describe)]) -> String {
    let mut out = String::new();
    let mut header = format!("{:<8}", "");
    for (name, _) in columns {
        header.push_str(&format!(" {:>18}", truncate(name, 18)));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    let rows: Vec<_> = columns.iter().map(|(_, d)| d.rows()).collect();
    for i in 0..8 {
        let label = rows.first().map_or("", |r| r[i].0);
        let mut line = format!("{label:<8}");
        for r in &rows {
            let cell = if i == 0 {
                r[i].1.map_or_else(|| "n/a".to_string(), |v| format!("{v:.0}"))
            } else {
                fmt_opt(r[i].1, 4)
            };
            line.push_str(&format!(" {cell:>18}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Square matrix with labels on both axes; undefined cells print as `n/a`.
pub fn format_correlation(matrix: &CorrelationMatrix) -> String {
    let mut out = String::new();
    let mut header = format!("{:<18}", "");
    for label in &matrix.labels {
        header.push_str(&format!(" {:>18}", truncate(label, 18)));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for (label, row) in matrix.labels.iter().zip(&matrix.cells) {
        let mut line = format!("{:<18}", truncate(label, 18));
        for cell in row {
            line.push_str(&format!(" {:>18}", fmt_opt(*cell, 3)));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn format_trend(trend: &Result<Trend, MetricError>) -> String {
    match trend {
        Ok(t) => format!(
            "slope={:+.4} intercept={:.4} r2={} n={}",
            t.slope,
            t.intercept,
            fmt_opt(t.r_squared, 3),
            t.n
        ),
        Err(err) => format!("n/a ({err})"),
    }
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) => format!("{v:.decimals$}"),
        None => "n/a".to_string(),
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
