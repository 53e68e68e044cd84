//! Shared "forecast pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> validate/normalize -> fit/selection -> forecast -> components
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::domain::{Components, Forecast, ForecastConfig};
use crate::error::AppError;
use crate::fit::forecaster::{FittedModel, HarmonicRegression};
use crate::fit::selection::FitSelection;
use crate::io::ingest::{load_aqi_csv, IngestedData};

/// All computed outputs of a single forecast run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub selection: FitSelection,
    pub forecast: Forecast,
    pub components: Components,
}

/// Execute the full pipeline from the configured CSV path.
pub fn run_forecast(config: &ForecastConfig) -> Result<RunOutput, AppError> {
    let ingest = load_aqi_csv(config)?;
    run_forecast_with_ingest(config, ingest)
}

/// Execute the pipeline on already-ingested data.
///
/// This is useful for the TUI where we want to refit (horizon/model changes)
/// without re-reading the CSV.
pub fn run_forecast_with_ingest(
    config: &ForecastConfig,
    ingest: IngestedData,
) -> Result<RunOutput, AppError> {
    let forecaster = HarmonicRegression::from_config(config);
    let selection = forecaster.fit_selection(&ingest.daily)?;

    let forecast = selection
        .best
        .model
        .predict(config.horizon, config.interval_width)?;
    let components = selection.best.model.decompose(config.horizon);

    Ok(RunOutput {
        ingest,
        selection,
        forecast,
        components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelSpec;
    use crate::io::ingest_from_reader;

    fn config() -> ForecastConfig {
        ForecastConfig {
            csv_path: "unused.csv".into(),
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
    fn pipeline_on_sample_data_produces_full_forecast() {
        let ingest = ingest_from_reader(crate::data::SAMPLE_CSV.as_bytes()).unwrap();
        let run = run_forecast_with_ingest(&config(), ingest).unwrap();

        assert_eq!(run.forecast.rows.len(), 5 + 30);
        assert_eq!(run.forecast.tail().len(), 30);
        assert_eq!(run.components.dates.len(), 5 + 30);
    }

    #[test]
    fn rerunning_on_identical_input_is_deterministic() {
        let config = config();
        let a = run_forecast_with_ingest(
            &config,
            ingest_from_reader(crate::data::SAMPLE_CSV.as_bytes()).unwrap(),
        )
        .unwrap();
        let b = run_forecast_with_ingest(
            &config,
            ingest_from_reader(crate::data::SAMPLE_CSV.as_bytes()).unwrap(),
        )
        .unwrap();

        for (ra, rb) in a.forecast.rows.iter().zip(b.forecast.rows.iter()) {
            assert_eq!(ra.yhat.to_bits(), rb.yhat.to_bits());
            assert_eq!(ra.yhat_lower.to_bits(), rb.yhat_lower.to_bits());
            assert_eq!(ra.yhat_upper.to_bits(), rb.yhat_upper.to_bits());
        }
    }
}
