//! Command-line parsing for the AQI forecasting dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/math code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::ModelSpec;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "aqid", version, about = "AQI Forecast Dashboard (CSV-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a forecast from an AQI CSV, print diagnostics and the forecast
    /// table, and optionally plot/export.
    Forecast(ForecastArgs),
    /// Decompose a previously exported forecast into trend/weekly/yearly
    /// components (no refit).
    Components(ComponentsArgs),
    /// Write the canonical sample CSV, or a seeded synthetic dataset.
    Sample(SampleArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `aqid forecast`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(ForecastArgs),
}

/// Common options for forecasting (CLI and TUI).
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// CSV file with `date` and `aqi` columns (optional `city`).
    /// When omitted, an interactive picker lists CSV files under the
    /// current directory.
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Days to forecast beyond the last observed date.
    #[arg(long, default_value_t = 30)]
    pub horizon: usize,

    /// Nominal coverage of the uncertainty interval, in (0, 1).
    #[arg(long, default_value_t = 0.8)]
    pub interval: f64,

    /// Which model structure(s) to fit.
    #[arg(long, value_enum, default_value_t = ModelSpec::Auto)]
    pub model: ModelSpec,

    /// Maximum weekly Fourier order for the grid search.
    #[arg(long, default_value_t = 3)]
    pub weekly_orders: usize,

    /// Maximum yearly Fourier order for the grid search.
    #[arg(long, default_value_t = 10)]
    pub yearly_orders: usize,

    /// Rows to echo in the data preview.
    #[arg(long, default_value_t = 5)]
    pub preview: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the full forecast (history + horizon) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export forecast + fitted model to JSON (readable by `components`).
    #[arg(long = "export-forecast")]
    pub export_forecast: Option<PathBuf>,
}

/// Options for decomposing a saved forecast.
#[derive(Debug, Parser)]
pub struct ComponentsArgs {
    /// Forecast JSON file produced by `aqid forecast --export-forecast`.
    #[arg(long, value_name = "JSON", default_value = "forecast.json")]
    pub forecast: PathBuf,
}

/// Options for writing sample data.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Output path for the CSV.
    #[arg(short = 'o', long, default_value = "sample_aqi_data.csv")]
    pub output: PathBuf,

    /// Generate a seeded synthetic dataset of this many days instead of the
    /// canonical 5-row fixture.
    #[arg(long)]
    pub synthetic_days: Option<usize>,

    /// Random seed for synthetic generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First date of the synthetic series (YYYY-MM-DD).
    #[arg(long, default_value = "2022-01-01")]
    pub start: NaiveDate,
}
