//! Reporting utilities: formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{Components, Forecast, ForecastConfig};
use crate::fit::selection::FitSelection;
use crate::io::ingest::IngestedData;

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// How many row errors to echo verbatim in the summary.
const MAX_ROW_ERRORS_SHOWN: usize = 3;

/// Format the full run summary (ingest accounting + preview + aggregates +
/// fit diagnostics + chosen model).
pub fn format_run_summary(
    ingest: &IngestedData,
    selection: &FitSelection,
    config: &ForecastConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== aqid - AQI Forecast ===\n");
    out.push_str(&format!("File: {}\n", config.csv_path.display()));

    let dropped = ingest.rows_read - ingest.rows_used;
    out.push_str(&format!(
        "Rows: read={} used={} dropped={}\n",
        ingest.rows_read, ingest.rows_used, dropped
    ));
    for err in ingest.row_errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        out.push_str(&format!("  line {}: {}\n", err.line, err.message));
    }
    if ingest.row_errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!(
            "  … and {} more\n",
            ingest.row_errors.len() - MAX_ROW_ERRORS_SHOWN
        ));
    }

    out.push_str(&format!(
        "Series: {} day(s) over a {}d span, {} → {} | aqi=[{:.1}, {:.1}]\n",
        ingest.stats.n_days,
        ingest.stats.span_days(),
        ingest.stats.first_date,
        ingest.stats.last_date,
        ingest.stats.value_min,
        ingest.stats.value_max
    ));

    out.push_str("\nData preview:\n");
    out.push_str(&format_preview(ingest, config.preview_rows));

    if !ingest.city_means.is_empty() {
        out.push_str("\nAverage AQI by city:\n");
        out.push_str(&format_city_means(ingest));
    }

    out.push_str("\nModel diagnostics:\n");
    for fit in &selection.fits {
        let chosen = if fit.model.kind == selection.best.model.kind {
            "*"
        } else {
            " "
        };
        out.push_str(&format!(
            "{chosen} {:<22} SSE={:.3} RMSE={:.3} BIC={:.3}\n",
            fit.model.display_name, fit.quality.sse, fit.quality.rmse, fit.quality.bic
        ));
    }
    for (kind, reason) in &selection.skipped {
        out.push_str(&format!("  (skipped {}) {reason}\n", kind.display_name()));
    }

    out.push_str("\nChosen model:\n");
    out.push_str(&format!("- {}\n", selection.best.model.display_name));
    out.push_str(&format!(
        "- orders: weekly={} yearly={}\n",
        selection.best.model.orders.weekly, selection.best.model.orders.yearly
    ));
    out.push_str(&format!("- betas: {}\n", fmt_vec(&selection.best.model.betas)));
    out.push_str(&format!("- sigma: {:.4}\n", selection.best.model.sigma));
    out.push('\n');

    out
}

/// Format the forecast tail (the future `horizon` rows).
pub fn format_forecast_tail(forecast: &Forecast) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Forecast (next {} day(s), {:.0}% interval):\n",
        forecast.horizon,
        forecast.interval_width * 100.0
    ));
    out.push_str(&format!(
        "{:<12} {:>10} {:>12} {:>12}\n",
        "date", "yhat", "yhat_lower", "yhat_upper"
    ));
    out.push_str(&format!("{:-<12} {:-<10} {:-<12} {:-<12}\n", "", "", "", ""));

    for row in forecast.tail() {
        out.push_str(&format!(
            "{:<12} {:>10.2} {:>12.2} {:>12.2}\n",
            row.date.to_string(),
            row.yhat,
            row.yhat_lower,
            row.yhat_upper
        ));
    }

    out
}

/// Format the decomposition: trend summary plus seasonal profiles.
pub fn format_components(components: &Components) -> String {
    let mut out = String::new();

    out.push_str("Components:\n");

    if let (Some(&first), Some(&last)) = (components.trend.first(), components.trend.last()) {
        let days = components.dates.len().max(2) as f64 - 1.0;
        out.push_str(&format!(
            "Trend: {first:.2} → {last:.2} ({:+.4}/day)\n",
            (last - first) / days
        ));
    }

    if components.has_weekly() {
        out.push_str("\nWeekly effect:\n");
        for (label, value) in WEEKDAY_LABELS.iter().zip(components.weekly.iter()) {
            out.push_str(&format!("  {label} {value:>8.2}\n"));
        }
    }

    if components.has_yearly() {
        out.push_str("\nYearly effect (mid-month):\n");
        for (label, value) in MONTH_LABELS.iter().zip(components.yearly.iter()) {
            out.push_str(&format!("  {label} {value:>8.2}\n"));
        }
    }

    if !components.has_weekly() && !components.has_yearly() {
        out.push_str("(no seasonal components in the chosen model)\n");
    }

    out
}

fn format_preview(ingest: &IngestedData, preview_rows: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:<12} {:>8} {:<16}\n", "date", "aqi", "city"));
    for row in ingest.preview.iter().take(preview_rows) {
        out.push_str(&format!(
            "{:<12} {:>8.1} {:<16}\n",
            row.date.to_string(),
            row.aqi,
            truncate(row.city.as_deref().unwrap_or(""), 16)
        ));
    }

    out
}

fn format_city_means(ingest: &IngestedData) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:<16} {:>10} {:>6}\n", "city", "mean aqi", "n"));
    for cm in &ingest.city_means {
        out.push_str(&format!(
            "{:<16} {:>10.2} {:>6}\n",
            truncate(&cm.city, 16),
            cm.mean,
            cm.n
        ));
    }

    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastRow, ModelSpec};
    use crate::fit::selection::fit_and_select;
    use crate::io::ingest_from_reader;
    use chrono::NaiveDate;

    fn config() -> ForecastConfig {
        ForecastConfig {
            csv_path: "sample.csv".into(),
            horizon: 30,
            interval_width: 0.8,
            model_spec: ModelSpec::Auto,
            weekly_order_max: 3,
            yearly_order_max: 10,
            preview_rows: 5,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_results: None,
            export_forecast: None,
        }
    }

    #[test]
    fn run_summary_reports_row_accounting_and_chosen_model() {
        let csv = "date,aqi\n2024-01-01,120\nbad,130\n2024-01-03,128\n2024-01-04,125\n";
        let ingest = ingest_from_reader(csv.as_bytes()).unwrap();
        let selection = fit_and_select(&ingest.daily, ModelSpec::Auto, 3, 10).unwrap();

        let summary = format_run_summary(&ingest, &selection, &config());
        assert!(summary.contains("read=4 used=3 dropped=1"));
        assert!(summary.contains("line 3:"));
        assert!(summary.contains("Chosen model:"));
        assert!(summary.contains("trend"));
    }

    #[test]
    fn forecast_tail_lists_future_rows_only() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows: Vec<ForecastRow> = (0..8)
            .map(|i| ForecastRow {
                date: start + chrono::Duration::days(i),
                yhat: 100.0 + i as f64,
                yhat_lower: 95.0,
                yhat_upper: 105.0,
            })
            .collect();
        let forecast = Forecast {
            rows,
            horizon: 3,
            interval_width: 0.8,
        };

        let table = format_forecast_tail(&forecast);
        assert!(table.contains("next 3 day(s)"));
        assert!(table.contains("2024-01-08"));
        assert!(!table.contains("2024-01-01 "));
    }

    #[test]
    fn components_format_names_weekdays() {
        let components = Components {
            dates: vec![
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ],
            trend: vec![100.0, 101.0],
            weekly: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
            yearly: Vec::new(),
        };

        let text = format_components(&components);
        assert!(text.contains("Mon"));
        assert!(text.contains("Sun"));
        assert!(!text.contains("Jan"));
    }
}
