//! Export forecast rows to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::Forecast;
use crate::error::{AppError, ErrorKind};

/// Write the full forecast (history + horizon) to a CSV file.
pub fn write_forecast_csv(path: &Path, forecast: &Forecast) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            ErrorKind::InvalidInput,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    writeln!(file, "date,yhat,yhat_lower,yhat_upper").map_err(|e| {
        AppError::new(
            ErrorKind::InvalidInput,
            format!("Failed to write export CSV header: {e}"),
        )
    })?;

    for row in &forecast.rows {
        writeln!(
            file,
            "{},{:.4},{:.4},{:.4}",
            row.date, row.yhat, row.yhat_lower, row.yhat_upper
        )
        .map_err(|e| {
            AppError::new(
                ErrorKind::InvalidInput,
                format!("Failed to write export CSV row: {e}"),
            )
        })?;
    }

    Ok(())
}
