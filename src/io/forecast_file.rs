//! Read/write forecast JSON files.
//!
//! Forecast JSON is the "portable" representation of a completed forecast:
//! - fitted model parameters (structure, betas, orders, sigma)
//! - dataset stats + fit quality
//! - the forecast rows themselves
//!
//! It is what lets `components` decompose a previous run without refitting.
//! The schema is defined by `domain::ForecastFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{DatasetStats, FitResult, Forecast, ForecastFile};
use crate::error::{AppError, ErrorKind};

/// Write a forecast JSON file.
pub fn write_forecast_json(
    path: &Path,
    best: &FitResult,
    stats: &DatasetStats,
    forecast: &Forecast,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            ErrorKind::InvalidInput,
            format!("Failed to create forecast JSON '{}': {e}", path.display()),
        )
    })?;

    let out = ForecastFile {
        tool: "aqid".to_string(),
        stats: stats.clone(),
        model: best.model.clone(),
        fit_quality: best.quality.clone(),
        forecast: forecast.clone(),
    };

    serde_json::to_writer_pretty(file, &out).map_err(|e| {
        AppError::new(
            ErrorKind::InvalidInput,
            format!("Failed to write forecast JSON: {e}"),
        )
    })?;

    Ok(())
}

/// Read a forecast JSON file.
///
/// A missing file maps to `NoModelAvailable`: asking for components without a
/// prior forecast is a workflow error, not an I/O crash, and the caller turns
/// it into a "run a forecast first" warning.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::new(
                ErrorKind::NoModelAvailable,
                format!(
                    "No saved forecast at '{}'. Run `aqid forecast --export-forecast <file>` first.",
                    path.display()
                ),
            )
        } else {
            AppError::new(
                ErrorKind::InvalidInput,
                format!("Failed to open forecast JSON '{}': {e}", path.display()),
            )
        }
    })?;

    let parsed: ForecastFile = serde_json::from_reader(file).map_err(|e| {
        AppError::new(
            ErrorKind::InvalidInput,
            format!("Invalid forecast JSON: {e}"),
        )
    })?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, FourierOrders, ForecastRow, HarmonicModel, ModelKind};
    use chrono::NaiveDate;

    fn sample_file() -> ForecastFile {
        let origin = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ForecastFile {
            tool: "aqid".to_string(),
            stats: DatasetStats {
                n_days: 2,
                first_date: origin,
                last_date: origin + chrono::Duration::days(1),
                value_min: 100.0,
                value_max: 110.0,
            },
            model: HarmonicModel {
                kind: ModelKind::Trend,
                display_name: "trend".to_string(),
                betas: vec![100.0, 10.0],
                orders: FourierOrders::none(),
                sigma: 0.5,
                origin,
                history_dates: vec![origin, origin + chrono::Duration::days(1)],
            },
            fit_quality: FitQuality {
                sse: 0.0,
                rmse: 0.0,
                sigma: 0.5,
                bic: -1.0,
                n: 2,
            },
            forecast: Forecast {
                rows: vec![ForecastRow {
                    date: origin,
                    yhat: 100.0,
                    yhat_lower: 99.0,
                    yhat_upper: 101.0,
                }],
                horizon: 0,
                interval_width: 0.8,
            },
        }
    }

    #[test]
    fn forecast_file_round_trips_through_json() {
        let original = sample_file();
        let text = serde_json::to_string(&original).unwrap();
        let parsed: ForecastFile = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed.model.kind, original.model.kind);
        assert_eq!(parsed.model.betas, original.model.betas);
        assert_eq!(parsed.forecast.rows.len(), original.forecast.rows.len());
        assert_eq!(parsed.stats.n_days, original.stats.n_days);
    }

    #[test]
    fn missing_file_maps_to_no_model_available() {
        let err = read_forecast_json(Path::new("definitely/not/here.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoModelAvailable);
    }
}
