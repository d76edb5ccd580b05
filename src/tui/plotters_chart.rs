//! Plotters-powered dashboard chart widget for Ratatui.
//!
//! Plotters gives nicer axis rendering than Ratatui's built-in `Chart` widget.
//! Output goes into the Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// How the primary series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStyle {
    /// Connected line (time series).
    Line,
    /// Unconnected dots (scatter).
    Dots,
}

/// A render-only chart description; all series and bounds are computed
/// outside the render call.
pub struct DashboardChart<'a> {
    /// Primary series (raw or standardized values, or scatter pairs).
    pub points: &'a [(f64, f64)],
    pub point_style: PointStyle,
    /// Rolling-mean overlay (empty when smoothing is off).
    pub smoothed: &'a [(f64, f64)],
    /// OLS trend overlay (empty when undefined).
    pub trend: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for DashboardChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are too noisy at terminal resolution.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let raw_color = RGBColor(170, 170, 170);
            let smoothed_color = RGBColor(255, 255, 0);
            let trend_color = RGBColor(0, 255, 255);

            match self.point_style {
                PointStyle::Line => {
                    chart.draw_series(LineSeries::new(self.points.iter().copied(), &raw_color))?;
                }
                PointStyle::Dots => {
                    // `Circle` radii are mis-scaled by the ratatui backend; pixels render cleanly.
                    chart.draw_series(self.points.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;
                }
            }

            if !self.smoothed.is_empty() {
                chart.draw_series(LineSeries::new(self.smoothed.iter().copied(), &smoothed_color))?;
            }
            if !self.trend.is_empty() {
                chart.draw_series(LineSeries::new(self.trend.iter().copied(), &trend_color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
