//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks in a terminal or a log
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - series points: `*`
//! - line between consecutive points: `.`
//! - scatter cells holding several points: `#`
//! - zero line (when in range): `-`
//! - bars: `█`

/// Render a line plot through `points` (x ascending). Returns an empty string
/// when there is nothing to draw.
pub fn render_line_plot(points: &[(f64, f64)], width: usize, height: usize) -> String {
    if points.is_empty() {
        return String::new();
    }
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(points);
    let (y_min, y_max) = pad_range(y_range(points), 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let mut prev = None;
    for &(x, y) in points {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(&mut grid, x0, y0, cx, cy, '.');
        }
        prev = Some((cx, cy));
    }
    // Points last so they overlay the connecting line.
    for &(x, y) in points {
        grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = '*';
    }

    finish(grid, format!("y=[{y_min:.2}, {y_max:.2}]"))
}

/// Render a scatter plot. Cells with more than one point show `#`.
pub fn render_scatter_plot(points: &[(f64, f64)], width: usize, height: usize) -> String {
    if points.is_empty() {
        return String::new();
    }
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = pad_range(x_range(points), 0.02);
    let (y_min, y_max) = pad_range(y_range(points), 0.05);

    let mut grid = vec![vec![' '; width]; height];

    if y_min < 0.0 && y_max > 0.0 {
        let zero = map_y(0.0, y_min, y_max, height);
        for cell in grid[zero].iter_mut() {
            *cell = '-';
        }
    }

    for &(x, y) in points {
        let cell = &mut grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)];
        *cell = if *cell == '*' || *cell == '#' { '#' } else { '*' };
    }

    finish(
        grid,
        format!("x=[{x_min:.2}, {x_max:.2}] | y=[{y_min:.2}, {y_max:.2}]"),
    )
}

/// Render labelled horizontal bars scaled to the largest value.
///
/// Each row is `key | bar | text`. Non-positive values get an empty bar.
pub fn render_bars(rows: &[(String, f64, String)], width: usize) -> String {
    let key_width = rows.iter().map(|(k, _, _)| k.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, v, _)| *v).fold(0.0_f64, f64::max);
    let bar_width = width.max(10);

    let mut out = String::new();
    for (key, value, text) in rows {
        let len = if max > 0.0 && *value > 0.0 {
            ((value / max) * bar_width as f64).round().max(1.0) as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{key:<key_width$} | {bar:<bar_width$} {text}\n",
            bar = "█".repeat(len),
        ));
    }
    out
}

fn finish(grid: Vec<Vec<char>>, header: String) -> String {
    let mut out = String::new();
    out.push_str(&format!("Plot: {header}\n"));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn x_range(points: &[(f64, f64)]) -> (f64, f64) {
    widen(points.iter().map(|&(x, _)| x))
}

fn y_range(points: &[(f64, f64)]) -> (f64, f64) {
    widen(points.iter().map(|&(_, y)| y))
}

/// Min/max of finite values; a degenerate range is widened around its value.
fn widen(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    if max > min {
        (min, max)
    } else {
        let half = (min.abs() * 0.1).max(0.5);
        (min - half, max + half)
    }
}

fn pad_range((min, max): (f64, f64), frac: f64) -> (f64, f64) {
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

/// Integer line drawing (Bresenham-ish); only fills blank cells.
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
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
            .filter(|c| **c == ' ')
        {
            *cell = ch;
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
