//! The forecasting capability seam.
//!
//! The pipeline programs against two small traits so the concrete forecaster
//! is swappable (and fakeable in tests):
//!
//! - `Forecaster`: fit on a daily series, producing a fitted model
//! - `FittedModel`: predict over history + horizon, and decompose
//!
//! The shipped implementation is `HarmonicRegression`: linear trend plus
//! weekly/yearly Fourier blocks, fitted by least squares with a deterministic
//! order grid search and BIC-based structure selection.

use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::{
    Components, DailyPoint, Forecast, ForecastConfig, ForecastRow, HarmonicModel, ModelSpec,
};
use crate::error::{AppError, ErrorKind};
use crate::fit::selection::{fit_and_select, FitSelection};
use crate::math::day_index;
use crate::models::{predict, trend_at, weekly_at, yearly_at};

/// A forecasting capability: fit on a daily mean series.
pub trait Forecaster {
    type Model: FittedModel;

    fn fit(&self, daily: &[DailyPoint]) -> Result<Self::Model, AppError>;

    /// Name of the forecaster (for reports).
    fn name(&self) -> &str;
}

/// A fitted model: predicts over the historical span plus a horizon, and
/// decomposes into additive components. Both operations are refit-free.
pub trait FittedModel {
    fn predict(&self, horizon: usize, interval_width: f64) -> Result<Forecast, AppError>;

    /// Decompose over the same date grid a `predict` with this horizon uses.
    fn decompose(&self, horizon: usize) -> Components;
}

/// Harmonic-regression forecaster configuration.
#[derive(Debug, Clone)]
pub struct HarmonicRegression {
    pub spec: ModelSpec,
    pub weekly_order_max: usize,
    pub yearly_order_max: usize,
}

impl HarmonicRegression {
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            spec: config.model_spec,
            weekly_order_max: config.weekly_order_max,
            yearly_order_max: config.yearly_order_max,
        }
    }

    /// Fit with full diagnostics (all attempted structures, skip reasons).
    ///
    /// `Forecaster::fit` is a thin wrapper that keeps only the best model.
    pub fn fit_selection(&self, daily: &[DailyPoint]) -> Result<FitSelection, AppError> {
        fit_and_select(daily, self.spec, self.weekly_order_max, self.yearly_order_max)
    }
}

impl Forecaster for HarmonicRegression {
    type Model = HarmonicModel;

    fn fit(&self, daily: &[DailyPoint]) -> Result<HarmonicModel, AppError> {
        Ok(self.fit_selection(daily)?.best.model)
    }

    fn name(&self) -> &str {
        "harmonic-regression"
    }
}

impl FittedModel for HarmonicModel {
    fn predict(&self, horizon: usize, interval_width: f64) -> Result<Forecast, AppError> {
        let z = z_score(interval_width)?;

        let Some(&last) = self.history_dates.last() else {
            return Err(AppError::new(
                ErrorKind::Internal,
                "Fitted model has no history dates.",
            ));
        };
        let n = self.history_dates.len() as f64;

        let mut rows = Vec::with_capacity(self.history_dates.len() + horizon);
        for date in forecast_dates(&self.history_dates, last, horizon) {
            let t = day_index(self.origin, date);
            let yhat = predict(self.kind, t, &self.betas, self.orders);
            if !yhat.is_finite() {
                return Err(AppError::new(
                    ErrorKind::Internal,
                    "Non-finite model prediction during forecasting.",
                ));
            }

            // Interval: residual sigma within the observed span, widening with
            // the number of steps extrapolated beyond the last observation.
            let steps_ahead = (date - last).num_days().max(0) as f64;
            let se = self.sigma * (1.0 + steps_ahead / n).sqrt();
            let margin = z * se;

            rows.push(ForecastRow {
                date,
                yhat,
                yhat_lower: yhat - margin,
                yhat_upper: yhat + margin,
            });
        }

        Ok(Forecast {
            rows,
            horizon,
            interval_width,
        })
    }

    fn decompose(&self, horizon: usize) -> Components {
        let last = self.history_dates.last().copied().unwrap_or(self.origin);

        let dates: Vec<NaiveDate> = forecast_dates(&self.history_dates, last, horizon).collect();
        let trend = dates
            .iter()
            .map(|&d| trend_at(day_index(self.origin, d), &self.betas))
            .collect();

        // Weekly profile, Monday first. The block is exactly 7-periodic on
        // integer day indices, so one evaluation per weekday is exact.
        let weekly = if self.kind.includes_weekly() {
            let origin_wd = self.origin.weekday().num_days_from_monday() as i64;
            (0..7)
                .map(|wd| {
                    let delta = (wd - origin_wd).rem_euclid(7) as f64;
                    weekly_at(self.kind, delta, &self.betas, self.orders)
                })
                .collect()
        } else {
            Vec::new()
        };

        // Yearly profile sampled mid-month, January first, in the forecast's
        // final calendar year.
        let yearly = if self.kind.includes_yearly() {
            let year = last.year();
            (1..=12)
                .map(|month| {
                    let date = NaiveDate::from_ymd_opt(year, month, 15).unwrap_or(last);
                    yearly_at(self.kind, day_index(self.origin, date), &self.betas, self.orders)
                })
                .collect()
        } else {
            Vec::new()
        };

        Components {
            dates,
            trend,
            weekly,
            yearly,
        }
    }
}

/// Date grid for prediction/decomposition: every observed daily date, then
/// `horizon` consecutive days beyond the last one.
fn forecast_dates(
    history: &[NaiveDate],
    last: NaiveDate,
    horizon: usize,
) -> impl Iterator<Item = NaiveDate> + '_ {
    history
        .iter()
        .copied()
        .chain((1..=horizon as i64).map(move |d| last + Duration::days(d)))
}

/// Normal-quantile ladder for common interval widths.
fn z_score(interval_width: f64) -> Result<f64, AppError> {
    if !(interval_width > 0.0 && interval_width < 1.0) {
        return Err(AppError::new(
            ErrorKind::InvalidInput,
            format!("Interval width must be in (0, 1), got {interval_width}."),
        ));
    }

    Ok(match interval_width {
        w if w >= 0.99 => 2.576,
        w if w >= 0.95 => 1.960,
        w if w >= 0.90 => 1.645,
        w if w >= 0.80 => 1.282,
        _ => 1.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;

    fn daily_from(values: &[f64], start: NaiveDate) -> Vec<DailyPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| DailyPoint {
                date: start + Duration::days(i as i64),
                value: v,
                n_obs: 1,
            })
            .collect()
    }

    fn default_forecaster() -> HarmonicRegression {
        HarmonicRegression {
            spec: ModelSpec::Auto,
            weekly_order_max: 3,
            yearly_order_max: 10,
        }
    }

    #[test]
    fn forecast_covers_history_plus_horizon() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let daily = daily_from(&[120.0, 130.0, 128.0, 125.0, 135.0], start);

        let model = default_forecaster().fit(&daily).unwrap();
        let forecast = model.predict(30, 0.8).unwrap();

        assert_eq!(forecast.rows.len(), daily.len() + 30);
        assert_eq!(forecast.tail().len(), 30);
        assert_eq!(
            forecast.tail()[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()
        );
    }

    #[test]
    fn intervals_bracket_the_point_estimate_and_widen() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // Noisy-ish series so sigma > 0.
        let values: Vec<f64> = (0..20)
            .map(|i| 100.0 + i as f64 + if i % 2 == 0 { 3.0 } else { -3.0 })
            .collect();
        let daily = daily_from(&values, start);

        let model = default_forecaster().fit(&daily).unwrap();
        let forecast = model.predict(10, 0.8).unwrap();

        for row in &forecast.rows {
            assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
        }
        let first = forecast.tail()[0];
        let last = forecast.tail()[9];
        assert!(
            (last.yhat_upper - last.yhat) > (first.yhat_upper - first.yhat),
            "interval should widen with extrapolation distance"
        );
    }

    #[test]
    fn refit_on_same_data_is_identical() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let values: Vec<f64> = (0..40).map(|i| 70.0 + (i as f64 * 0.9).cos() * 6.0).collect();
        let daily = daily_from(&values, start);
        let forecaster = default_forecaster();

        let a = forecaster.fit(&daily).unwrap().predict(30, 0.8).unwrap();
        let b = forecaster.fit(&daily).unwrap().predict(30, 0.8).unwrap();
        assert_eq!(a.rows.len(), b.rows.len());
        for (ra, rb) in a.rows.iter().zip(b.rows.iter()) {
            assert_eq!(ra.date, rb.date);
            assert_eq!(ra.yhat.to_bits(), rb.yhat.to_bits());
            assert_eq!(ra.yhat_lower.to_bits(), rb.yhat_lower.to_bits());
            assert_eq!(ra.yhat_upper.to_bits(), rb.yhat_upper.to_bits());
        }
    }

    #[test]
    fn decompose_exposes_weekly_profile_only_when_fitted() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let values: Vec<f64> = (0..56)
            .map(|i| {
                let (s, _) = crate::math::fourier_pair(i as f64, 7.0, 1);
                80.0 + 6.0 * s
            })
            .collect();
        let daily = daily_from(&values, start);

        let model = default_forecaster().fit(&daily).unwrap();
        assert_eq!(model.kind, ModelKind::TrendWeekly);

        let components = model.decompose(30);
        assert_eq!(components.dates.len(), 56 + 30);
        assert_eq!(components.trend.len(), components.dates.len());
        assert_eq!(components.weekly.len(), 7);
        assert!(!components.has_yearly());

        // Profile is a pure sine: it must not be flat.
        let spread = components
            .weekly
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max)
            - components.weekly.iter().cloned().fold(f64::INFINITY, f64::min);
        assert!(spread > 1.0);
    }

    #[test]
    fn trend_only_model_decomposes_without_seasonal_profiles() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let daily = daily_from(&[120.0, 130.0, 128.0, 125.0, 135.0], start);

        let model = default_forecaster().fit(&daily).unwrap();
        let components = model.decompose(5);
        assert!(!components.has_weekly());
        assert!(!components.has_yearly());
        assert_eq!(components.trend.len(), 10);
    }

    #[test]
    fn invalid_interval_width_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let daily = daily_from(&[120.0, 130.0, 128.0], start);
        let model = default_forecaster().fit(&daily).unwrap();

        let err = model.predict(10, 1.5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn z_ladder_is_monotone() {
        let widths = [0.5, 0.8, 0.9, 0.95, 0.99];
        let mut prev = 0.0;
        for w in widths {
            let z = z_score(w).unwrap();
            assert!(z >= prev, "z({w}) = {z} not monotone");
            prev = z;
        }
    }
}
