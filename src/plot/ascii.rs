//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - overlays (smoothed series, trend line): one marker character each

use crate::app::pipeline::{ClimateView, StudyView};

/// A polyline drawn underneath the points.
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a> {
    pub name: &'a str,
    pub marker: char,
    pub points: &'a [(f64, f64)],
}

/// Axis labels for the header line.
#[derive(Debug, Clone, Copy)]
pub struct Axes<'a> {
    pub x: &'a str,
    pub y: &'a str,
}

/// Render points plus overlays on a fixed grid.
pub fn render_ascii_plot(
    points: &[(f64, f64)],
    overlays: &[Overlay<'_>],
    axes: Axes<'_>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all = || {
        points
            .iter()
            .chain(overlays.iter().flat_map(|o| o.points.iter()))
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
    };
    let (x_min, x_max) = span(all().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = span(all().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw overlays first (so points can overlay).
    for overlay in overlays {
        draw_curve(&mut grid, overlay.points, overlay.marker, (x_min, x_max), (y_min, y_max));
    }

    for &(x, y) in points {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {}=[{x_min:.3}, {x_max:.3}] | {}=[{y_min:.2}, {y_max:.2}]\n",
        axes.x, axes.y
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    if !overlays.is_empty() {
        let mut legend = String::from("o data");
        for overlay in overlays {
            legend.push_str(&format!("  {} {}", overlay.marker, overlay.name));
        }
        out.push_str(&legend);
        out.push('\n');
    }

    out
}

/// Time-series plot for the climate view: values, smoothed line, trend.
pub fn render_climate_plot(view: &ClimateView, width: usize, height: usize) -> String {
    let points = view.display_points();
    let smoothed = if view.controls.smoothing_window > 1 {
        view.smoothed_points()
    } else {
        Vec::new()
    };
    let trend = view.trend.as_ref().map(|t| t.fitted.clone()).unwrap_or_default();

    let mut overlays = Vec::new();
    if !smoothed.is_empty() {
        overlays.push(Overlay {
            name: "smoothed",
            marker: '~',
            points: &smoothed,
        });
    }
    if !trend.is_empty() {
        overlays.push(Overlay {
            name: "trend",
            marker: '-',
            points: &trend,
        });
    }

    let y = if view.standardized() { "z" } else { "value" };
    render_ascii_plot(&points, &overlays, Axes { x: "year", y }, width, height)
}

/// Scatter plot for the study view with its trend line.
pub fn render_study_plot(view: &StudyView, width: usize, height: usize) -> String {
    let trend = view.trend.as_ref().map(|t| t.fitted.clone()).unwrap_or_default();
    let overlays: Vec<Overlay<'_>> = if trend.is_empty() {
        Vec::new()
    } else {
        vec![Overlay {
            name: "trend",
            marker: '-',
            points: &trend,
        }]
    };
    render_ascii_plot(
        &view.scatter,
        &overlays,
        Axes {
            x: "temp",
            y: "math",
        },
        width,
        height,
    )
}

fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min {
        Some((min, max))
    } else {
        Some((min - 0.5, max + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], ch: char, xs: (f64, f64), ys: (f64, f64)) {
    let height = grid.len();
    let width = grid.first().map_or(0, Vec::len);
    if height == 0 || width == 0 {
        return;
    }

    let mut prev = None;
    for &(x, y) in curve {
        if !(x.is_finite() && y.is_finite()) {
            prev = None;
            continue;
        }
        let col = map_x(x, xs.0, xs.1, width);
        let row = map_y(y, ys.0, ys.1, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, ch);
        } else if grid[row][col] == ' ' {
            grid[row][col] = ch;
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
