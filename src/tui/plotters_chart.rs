//! Plotters-powered line/scatter chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Bounds, labels and tick formatting shared by the widget and the tick overlay.
#[derive(Clone, Copy)]
pub struct Axes<'a> {
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

/// A render-only chart description. All series are computed outside `render()`.
pub struct FigureChart<'a> {
    /// Line series (sales trend).
    pub line: &'a [(f64, f64)],
    /// Scatter series.
    pub points: &'a [(f64, f64)],
    /// Points drawn in the highlight color on top of `points` (large orders).
    pub heavy: &'a [(f64, f64)],
    /// Horizontal reference line at y=0 when it is in range.
    pub zero_line: bool,
    pub axes: Axes<'a>,
}

impl<'a> Widget for FigureChart<'a> {
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

        let [x0, x1] = self.axes.x_bounds;
        let [y0, y1] = self.axes.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let axes = self.axes;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(axes.x_label)
                .y_desc(axes.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (axes.fmt_x)(*v))
                .y_label_formatter(&|v| (axes.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 255); // cyan
            let points_color = WHITE;
            let heavy_color = RGBColor(255, 200, 0); // amber
            let zero_color = RGBColor(128, 128, 128);

            if self.zero_line && y0 < 0.0 && y1 > 0.0 {
                chart.draw_series(LineSeries::new([(x0, 0.0), (x1, 0.0)], &zero_color))?;
            }

            if !self.line.is_empty() {
                chart.draw_series(LineSeries::new(self.line.iter().copied(), &line_color))?;
            }

            // `Circle` radii come out wrong through the ratatui backend, so
            // points are single pixels.
            chart.draw_series(
                self.points
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), points_color)),
            )?;
            chart.draw_series(
                self.heavy
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), heavy_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
