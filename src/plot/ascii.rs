//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed daily means: `o`
//! - forecast point estimate: `-` line
//! - uncertainty bounds: `.` lines

use crate::domain::{DailyPoint, Forecast};

/// Render the history + forecast plot.
pub fn render_ascii_plot(
    daily: &[DailyPoint],
    forecast: &Forecast,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((x_min, x_max)) = date_range(daily, forecast) else {
        return "Plot: no data\n".to_string();
    };

    let (y_min, y_max) = y_range(daily, forecast).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the point-estimate line first, then the bounds: line drawing only
    // fills empty cells, so yhat keeps priority where they cross.
    let yhat: Vec<(f64, f64)> = forecast
        .rows
        .iter()
        .map(|r| (day_x(r.date, x_min), r.yhat))
        .collect();
    draw_series(&mut grid, &yhat, x_max, y_min, y_max, '-');

    let lower: Vec<(f64, f64)> = forecast
        .rows
        .iter()
        .map(|r| (day_x(r.date, x_min), r.yhat_lower))
        .collect();
    let upper: Vec<(f64, f64)> = forecast
        .rows
        .iter()
        .map(|r| (day_x(r.date, x_min), r.yhat_upper))
        .collect();
    draw_series(&mut grid, &lower, x_max, y_min, y_max, '.');
    draw_series(&mut grid, &upper, x_max, y_min, y_max, '.');

    // Observed points overlay everything.
    for p in daily {
        let x = map_x(day_x(p.date, x_min), x_max, width);
        let y = map_y(p.value, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {x_min} → {} | aqi=[{y_min:.1}, {y_max:.1}]\n",
        last_date(daily, forecast).unwrap_or(x_min)
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Day offset of `date` from the plot origin.
fn day_x(date: chrono::NaiveDate, x_min: chrono::NaiveDate) -> f64 {
    (date - x_min).num_days() as f64
}

fn date_range(
    daily: &[DailyPoint],
    forecast: &Forecast,
) -> Option<(chrono::NaiveDate, f64)> {
    let first = daily
        .first()
        .map(|p| p.date)
        .or_else(|| forecast.rows.first().map(|r| r.date))?;
    let last = last_date(daily, forecast)?;
    let span = (last - first).num_days();
    if span <= 0 {
        return None;
    }
    Some((first, span as f64))
}

fn last_date(daily: &[DailyPoint], forecast: &Forecast) -> Option<chrono::NaiveDate> {
    let d = daily.last().map(|p| p.date);
    let f = forecast.rows.last().map(|r| r.date);
    match (d, f) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn y_range(daily: &[DailyPoint], forecast: &Forecast) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in daily {
        min_y = min_y.min(p.value);
        max_y = max_y.max(p.value);
    }
    for r in &forecast.rows {
        min_y = min_y.min(r.yhat_lower);
        max_y = max_y.max(r.yhat_upper);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(
    grid: &mut [Vec<char>],
    series: &[(f64, f64)],
    x_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    if series.is_empty() {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in series {
        let xx = map_x(x, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, xx, yy, ch);
        } else if grid[yy][xx] == ' ' {
            grid[yy][xx] = ch;
        }
        prev = Some((xx, yy));
    }
}

/// Integer line drawing (Bresenham-ish). Only fills empty cells so earlier
/// series keep priority.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ForecastRow;
    use chrono::NaiveDate;

    fn setup() -> (Vec<DailyPoint>, Forecast) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let daily: Vec<DailyPoint> = (0..5)
            .map(|i| DailyPoint {
                date: start + chrono::Duration::days(i),
                value: 100.0 + i as f64 * 2.0,
                n_obs: 1,
            })
            .collect();

        let rows: Vec<ForecastRow> = (0..10)
            .map(|i| {
                let yhat = 100.0 + i as f64 * 2.0;
                ForecastRow {
                    date: start + chrono::Duration::days(i),
                    yhat,
                    yhat_lower: yhat - 5.0,
                    yhat_upper: yhat + 5.0,
                }
            })
            .collect();

        let forecast = Forecast {
            rows,
            horizon: 5,
            interval_width: 0.8,
        };
        (daily, forecast)
    }

    #[test]
    fn plot_has_expected_shape_and_marks() {
        let (daily, forecast) = setup();
        let txt = render_ascii_plot(&daily, &forecast, 40, 12);

        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 13, "header + height rows");
        assert!(lines[0].starts_with("Plot: 2024-01-01 → 2024-01-10"));
        for line in &lines[1..] {
            assert!(line.chars().count() <= 40);
        }
        assert!(txt.contains('o'), "observed points drawn");
        assert!(txt.contains('-'), "forecast line drawn");
        assert!(txt.contains('.'), "bounds drawn");
    }

    #[test]
    fn plot_is_deterministic() {
        let (daily, forecast) = setup();
        let a = render_ascii_plot(&daily, &forecast, 60, 15);
        let b = render_ascii_plot(&daily, &forecast, 60, 15);
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_input_does_not_panic() {
        let forecast = Forecast {
            rows: Vec::new(),
            horizon: 0,
            interval_width: 0.8,
        };
        let txt = render_ascii_plot(&[], &forecast, 40, 10);
        assert!(txt.starts_with("Plot: no data"));
    }
}
