//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and forecasting
//! - exported to JSON/CSV
//! - reloaded later for the components view without refitting

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which model(s) to fit.
///
/// `Auto` fits every candidate the data supports and selects by BIC; the
/// explicit variants force a single structure (useful when comparing runs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelSpec {
    Auto,
    Trend,
    Weekly,
    Full,
    All,
}

/// Concrete fitted model structure.
///
/// Each kind is a linear model in its coefficients: an intercept + slope
/// trend, optionally extended with weekly and yearly Fourier blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Trend,
    TrendWeekly,
    TrendWeeklyYearly,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Trend => "trend",
            ModelKind::TrendWeekly => "trend+weekly",
            ModelKind::TrendWeeklyYearly => "trend+weekly+yearly",
        }
    }

    pub fn includes_weekly(self) -> bool {
        !matches!(self, ModelKind::Trend)
    }

    pub fn includes_yearly(self) -> bool {
        matches!(self, ModelKind::TrendWeeklyYearly)
    }

    /// Number of beta coefficients for this kind at the given Fourier orders.
    ///
    /// Layout: `[intercept, slope, weekly sin/cos pairs…, yearly sin/cos pairs…]`.
    pub fn beta_len(self, orders: FourierOrders) -> usize {
        let mut p = 2;
        if self.includes_weekly() {
            p += 2 * orders.weekly;
        }
        if self.includes_yearly() {
            p += 2 * orders.yearly;
        }
        p
    }
}

/// Fourier orders (number of sin/cos harmonics) per seasonal block.
///
/// Orders are hyperparameters, not regression coefficients: they are chosen
/// by deterministic grid search, then the betas are solved by least squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FourierOrders {
    pub weekly: usize,
    pub yearly: usize,
}

impl FourierOrders {
    pub fn none() -> Self {
        Self { weekly: 0, yearly: 0 }
    }
}

/// One cleaned observation: a valid calendar date and a finite value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// One point of the daily-resampled series (mean of that day's observations).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
    /// How many raw observations were aggregated into this day.
    pub n_obs: usize,
}

/// Per-city mean (display-only side output; not used by the forecaster).
#[derive(Debug, Clone, PartialEq)]
pub struct CityMean {
    pub city: String,
    pub mean: f64,
    pub n: usize,
}

/// Summary stats about the daily series actually used for fitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub n_days: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub value_min: f64,
    pub value_max: f64,
}

impl DatasetStats {
    /// Calendar span of the series in days (inclusive of both endpoints).
    pub fn span_days(&self) -> i64 {
        (self.last_date - self.first_date).num_days() + 1
    }
}

/// One forecast row: point estimate plus uncertainty bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// A full forecast: historical span plus `horizon` future days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub rows: Vec<ForecastRow>,
    pub horizon: usize,
    /// Nominal coverage of the `[yhat_lower, yhat_upper]` interval (e.g. 0.8).
    pub interval_width: f64,
}

impl Forecast {
    /// The final `horizon` rows (the future portion).
    pub fn tail(&self) -> &[ForecastRow] {
        let start = self.rows.len().saturating_sub(self.horizon);
        &self.rows[start..]
    }

    /// The historical portion (everything before the future rows).
    pub fn history(&self) -> &[ForecastRow] {
        let end = self.rows.len().saturating_sub(self.horizon);
        &self.rows[..end]
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    /// Residual standard deviation (degrees-of-freedom adjusted).
    pub sigma: f64,
    pub bic: f64,
    pub n: usize,
}

/// Fitted model parameters and metadata.
///
/// This is the "fitted model handle": everything needed to predict and to
/// decompose without touching the training data again. Kept serializable so
/// `components` can run on a previously exported forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarmonicModel {
    pub kind: ModelKind,
    pub display_name: String,
    /// `[intercept, slope, weekly pairs…, yearly pairs…]` (see `ModelKind::beta_len`).
    pub betas: Vec<f64>,
    pub orders: FourierOrders,
    /// Residual standard deviation used for interval construction.
    pub sigma: f64,
    /// Date mapped to `t = 0` in the design matrix.
    pub origin: NaiveDate,
    /// Observed daily dates the model was fitted on (ordered, unique).
    pub history_dates: Vec<NaiveDate>,
}

/// Fit output for a single model kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub model: HarmonicModel,
    pub quality: FitQuality,
}

/// Decomposition of a fitted model into additive components.
///
/// `trend` is evaluated on the forecast date grid; the seasonal profiles are
/// one representative cycle each (7 weekday values, 12 mid-month values).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Components {
    pub dates: Vec<NaiveDate>,
    pub trend: Vec<f64>,
    /// Weekly effect by weekday, Monday first. Empty when the model has no
    /// weekly block.
    pub weekly: Vec<f64>,
    /// Yearly effect sampled mid-month, January first. Empty when the model
    /// has no yearly block.
    pub yearly: Vec<f64>,
}

impl Components {
    pub fn has_weekly(&self) -> bool {
        !self.weekly.is_empty()
    }

    pub fn has_yearly(&self) -> bool {
        !self.yearly.is_empty()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub csv_path: PathBuf,
    /// Future periods (days) to forecast beyond the last observed date.
    pub horizon: usize,
    /// Nominal interval coverage in (0, 1); 0.8 matches the reference tool.
    pub interval_width: f64,
    pub model_spec: ModelSpec,

    /// Upper bounds for the Fourier-order grid search.
    pub weekly_order_max: usize,
    pub yearly_order_max: usize,

    /// How many raw rows to echo in the data preview.
    pub preview_rows: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_forecast: Option<PathBuf>,
}

/// A saved forecast file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub stats: DatasetStats,
    pub model: HarmonicModel,
    pub fit_quality: FitQuality,
    pub forecast: Forecast,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beta_len_counts_blocks() {
        let orders = FourierOrders { weekly: 3, yearly: 6 };
        assert_eq!(ModelKind::Trend.beta_len(orders), 2);
        assert_eq!(ModelKind::TrendWeekly.beta_len(orders), 2 + 6);
        assert_eq!(ModelKind::TrendWeeklyYearly.beta_len(orders), 2 + 6 + 12);
    }

    #[test]
    fn forecast_tail_is_future_portion() {
        let rows: Vec<ForecastRow> = (0..10)
            .map(|i| ForecastRow {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i),
                yhat: i as f64,
                yhat_lower: i as f64 - 1.0,
                yhat_upper: i as f64 + 1.0,
            })
            .collect();
        let fc = Forecast {
            rows,
            horizon: 3,
            interval_width: 0.8,
        };
        assert_eq!(fc.tail().len(), 3);
        assert_eq!(fc.history().len(), 7);
        assert!((fc.tail()[0].yhat - 7.0).abs() < 1e-12);
    }

    #[test]
    fn span_days_is_inclusive() {
        let stats = DatasetStats {
            n_days: 5,
            first_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            last_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            value_min: 120.0,
            value_max: 135.0,
        };
        assert_eq!(stats.span_days(), 5);
    }
}
