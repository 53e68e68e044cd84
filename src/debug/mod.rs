//! Debug bundle writer for inspecting a run's inputs and fit diagnostics.
//!
//! Written on demand from the TUI (`d` key). The bundle is a single markdown
//! file so it can be attached to an issue as-is.

use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::ForecastConfig;
use crate::error::{AppError, ErrorKind};

pub fn write_debug_bundle(run: &RunOutput, config: &ForecastConfig) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir)
        .map_err(|e| AppError::new(ErrorKind::Internal, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("aqid_debug_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(ErrorKind::Internal, format!("Failed to create debug file: {e}")))?;

    file.write_all(render_bundle(run, config).as_bytes())
        .map_err(|e| AppError::new(ErrorKind::Internal, format!("Failed to write debug file: {e}")))?;

    Ok(path)
}

fn render_bundle(run: &RunOutput, config: &ForecastConfig) -> String {
    let mut out = String::new();

    out.push_str("# aqid debug bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- file: {}\n", config.csv_path.display()));
    out.push_str(&format!(
        "- horizon: {} | interval: {:.2} | model: {:?}\n",
        config.horizon, config.interval_width, config.model_spec
    ));
    out.push_str(&format!(
        "- order grid: weekly<= {} | yearly<= {}\n",
        config.weekly_order_max, config.yearly_order_max
    ));

    out.push_str("\n## Ingest\n");
    out.push_str(&format!(
        "- rows: read={} used={} dropped={}\n",
        run.ingest.rows_read,
        run.ingest.rows_used,
        run.ingest.rows_read - run.ingest.rows_used
    ));
    out.push_str(&format!(
        "- series: {} day(s), {} → {}, aqi=[{:.1}, {:.1}]\n",
        run.ingest.stats.n_days,
        run.ingest.stats.first_date,
        run.ingest.stats.last_date,
        run.ingest.stats.value_min,
        run.ingest.stats.value_max
    ));
    for err in &run.ingest.row_errors {
        out.push_str(&format!("- row error line {}: {}\n", err.line, err.message));
    }

    out.push_str("\n## Fits\n");
    out.push_str("| model | weekly | yearly | sse | rmse | bic |\n");
    out.push_str("| - | - | - | - | - | - |\n");
    for fit in &run.selection.fits {
        let chosen = if fit.model.kind == run.selection.best.model.kind {
            " (chosen)"
        } else {
            ""
        };
        out.push_str(&format!(
            "| {}{chosen} | {} | {} | {:.4} | {:.4} | {:.4} |\n",
            fit.model.display_name,
            fit.model.orders.weekly,
            fit.model.orders.yearly,
            fit.quality.sse,
            fit.quality.rmse,
            fit.quality.bic
        ));
    }
    for (kind, reason) in &run.selection.skipped {
        out.push_str(&format!("- skipped {}: {reason}\n", kind.display_name()));
    }

    out.push_str("\n## Chosen model\n");
    let model = &run.selection.best.model;
    out.push_str(&format!("- betas: {:?}\n", model.betas));
    out.push_str(&format!("- sigma: {:.6}\n", model.sigma));
    out.push_str(&format!("- origin: {}\n", model.origin));

    out.push_str("\n## Components\n");
    out.push_str(&crate::report::format_components(&run.components));

    out
}
