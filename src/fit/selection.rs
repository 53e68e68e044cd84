//! Model selection (trend vs trend+weekly vs trend+weekly+yearly) using BIC
//! with guardrails.
//!
//! The tool fits each admissible structure and computes:
//! - SSE / RMSE / sigma
//! - BIC = n * ln(SSE/n) + k * ln(n)
//!
//! Selection rules:
//! 1. A seasonal block is only attempted when the data spans at least two of
//!    its cycles (14 days for weekly, 730 days for yearly) and leaves a
//!    comfortable margin of observations over coefficients.
//! 2. Choose the structure with minimum BIC.
//! 3. If ΔBIC < 2 between the best and a simpler structure, pick the simpler.
//!
//! The bare trend is always admissible (any 2 distinct dates fit a line), so
//! a tiny-but-valid dataset still produces a forecast.

use crate::domain::{
    DailyPoint, FitQuality, FitResult, FourierOrders, HarmonicModel, ModelKind, ModelSpec,
};
use crate::error::{AppError, ErrorKind};
use crate::fit::fitter::{bic, fit_model, ModelFit};
use crate::fit::order_grid::order_grid;

/// Minimum observations beyond coefficient count for seasonal structures.
const MIN_N_BUFFER: usize = 5;

/// Minimum calendar span (days) before a weekly block is attempted.
const MIN_WEEKLY_SPAN_DAYS: i64 = 14;

/// Minimum calendar span (days) before a yearly block is attempted.
const MIN_YEARLY_SPAN_DAYS: i64 = 730;

/// Output of fitting + selection.
#[derive(Debug, Clone)]
pub struct FitSelection {
    pub best: FitResult,
    /// Fits for all attempted structures (after guardrails).
    pub fits: Vec<FitResult>,
    /// Any structures that were skipped and why (for diagnostics).
    pub skipped: Vec<(ModelKind, String)>,
}

/// Fit and select the best model for the daily series.
pub fn fit_and_select(
    daily: &[DailyPoint],
    spec: ModelSpec,
    weekly_order_max: usize,
    yearly_order_max: usize,
) -> Result<FitSelection, AppError> {
    if daily.len() < 2 {
        return Err(AppError::new(
            ErrorKind::ForecastFit,
            "Need at least 2 distinct dates to fit a forecast model.",
        ));
    }

    let origin = daily[0].date;
    let last = daily[daily.len() - 1].date;
    let span_days = (last - origin).num_days() + 1;
    let n = daily.len();

    let kinds: Vec<ModelKind> = match spec {
        ModelSpec::Trend => vec![ModelKind::Trend],
        ModelSpec::Weekly => vec![ModelKind::TrendWeekly],
        ModelSpec::Full => vec![ModelKind::TrendWeeklyYearly],
        ModelSpec::All | ModelSpec::Auto => vec![
            ModelKind::Trend,
            ModelKind::TrendWeekly,
            ModelKind::TrendWeeklyYearly,
        ],
    };

    let mut fits = Vec::new();
    let mut skipped = Vec::new();

    for kind in kinds {
        if let Some(reason) = admission_check(kind, n, span_days) {
            skipped.push((kind, reason));
            continue;
        }

        let grid = order_grid(kind, weekly_order_max, yearly_order_max)?;
        let fit = fit_model(kind, daily, origin, &grid)?;
        fits.push(to_fit_result(fit, n, origin, daily));
    }

    if fits.is_empty() {
        return Err(AppError::new(
            ErrorKind::ForecastFit,
            "Insufficient data to fit any model after guardrails.",
        ));
    }

    // If the user requested a single structure, it's already the best.
    let best = if matches!(spec, ModelSpec::Trend | ModelSpec::Weekly | ModelSpec::Full) {
        fits[0].clone()
    } else {
        select_by_bic(&fits)
    };

    Ok(FitSelection { best, fits, skipped })
}

/// Guardrail check; returns a skip reason when the structure is inadmissible.
fn admission_check(kind: ModelKind, n: usize, span_days: i64) -> Option<String> {
    if kind.includes_weekly() && span_days < MIN_WEEKLY_SPAN_DAYS {
        return Some(format!(
            "Span too short for weekly seasonality: {span_days}d < {MIN_WEEKLY_SPAN_DAYS}d"
        ));
    }
    if kind.includes_yearly() && span_days < MIN_YEARLY_SPAN_DAYS {
        return Some(format!(
            "Span too short for yearly seasonality: {span_days}d < {MIN_YEARLY_SPAN_DAYS}d"
        ));
    }

    // Seasonal structures also need observations to spare over the smallest
    // candidate's coefficient count; the bare trend is exempt.
    if kind != ModelKind::Trend {
        let min_orders = FourierOrders {
            weekly: 1,
            yearly: if kind.includes_yearly() { 1 } else { 0 },
        };
        let k_min = kind.beta_len(min_orders);
        if n < k_min + MIN_N_BUFFER {
            return Some(format!(
                "Underdetermined: n={n} < k+{MIN_N_BUFFER}={}",
                k_min + MIN_N_BUFFER
            ));
        }
    }

    None
}

/// Total parameter count for information criteria: betas plus the searched
/// order hyperparameters.
fn param_count(kind: ModelKind, orders: FourierOrders) -> usize {
    let order_dims = match kind {
        ModelKind::Trend => 0,
        ModelKind::TrendWeekly => 1,
        ModelKind::TrendWeeklyYearly => 2,
    };
    kind.beta_len(orders) + order_dims
}

fn to_fit_result(fit: ModelFit, n: usize, origin: chrono::NaiveDate, daily: &[DailyPoint]) -> FitResult {
    let k = param_count(fit.kind, fit.orders);
    let quality = FitQuality {
        sse: fit.sse,
        rmse: fit.rmse,
        sigma: fit.sigma,
        bic: bic(n, fit.sse, k),
        n,
    };

    FitResult {
        model: HarmonicModel {
            kind: fit.kind,
            display_name: fit.kind.display_name().to_string(),
            betas: fit.betas,
            orders: fit.orders,
            sigma: fit.sigma,
            origin,
            history_dates: daily.iter().map(|p| p.date).collect(),
        },
        quality,
    }
}

fn select_by_bic(fits: &[FitResult]) -> FitResult {
    // Find minimum BIC.
    let mut best = &fits[0];
    for f in &fits[1..] {
        if f.quality.bic < best.quality.bic {
            best = f;
        }
    }

    let best_bic = best.quality.bic;

    // Prefer simplicity if within 2 BIC points.
    //
    // We iterate in order of increasing structure and pick the first fit that
    // is "close enough" to the best.
    let order = [
        ModelKind::Trend,
        ModelKind::TrendWeekly,
        ModelKind::TrendWeeklyYearly,
    ];
    for kind in order {
        if let Some(f) = fits.iter().find(|f| f.model.kind == kind) {
            if f.quality.bic <= best_bic + 2.0 {
                return f.clone();
            }
        }
    }

    best.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn daily_from(values: &[f64], start: NaiveDate) -> Vec<DailyPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| DailyPoint {
                date: start + chrono::Duration::days(i as i64),
                value: v,
                n_obs: 1,
            })
            .collect()
    }

    #[test]
    fn five_day_sample_fits_trend_only() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let daily = daily_from(&[120.0, 130.0, 128.0, 125.0, 135.0], start);

        let selection = fit_and_select(&daily, ModelSpec::Auto, 3, 10).unwrap();
        assert_eq!(selection.best.model.kind, ModelKind::Trend);
        // Both seasonal structures must be reported as skipped, not attempted.
        assert_eq!(selection.skipped.len(), 2);
    }

    #[test]
    fn short_series_never_selects_yearly() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let values: Vec<f64> = (0..10).map(|i| 60.0 + i as f64).collect();
        let daily = daily_from(&values, start);

        let selection = fit_and_select(&daily, ModelSpec::Auto, 3, 10).unwrap();
        assert_ne!(selection.best.model.kind, ModelKind::TrendWeeklyYearly);
        assert!(selection
            .skipped
            .iter()
            .any(|(kind, _)| *kind == ModelKind::TrendWeeklyYearly));
    }

    #[test]
    fn auto_selects_weekly_on_weekly_data() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let values: Vec<f64> = (0..56)
            .map(|i| {
                let t = i as f64;
                let (s, c) = crate::math::fourier_pair(t, 7.0, 1);
                90.0 + 0.2 * t + 8.0 * s + 3.0 * c
            })
            .collect();
        let daily = daily_from(&values, start);

        let selection = fit_and_select(&daily, ModelSpec::Auto, 3, 10).unwrap();
        assert_eq!(selection.best.model.kind, ModelKind::TrendWeekly);
    }

    #[test]
    fn auto_prefers_trend_on_pure_trend_data() {
        // Weekly can represent a line exactly (zero seasonal betas), so BIC's
        // parameter penalty plus the simpler-within-2 rule must pick trend.
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let values: Vec<f64> = (0..60).map(|i| 40.0 + 1.5 * i as f64).collect();
        let daily = daily_from(&values, start);

        let selection = fit_and_select(&daily, ModelSpec::Auto, 3, 10).unwrap();
        assert_eq!(selection.best.model.kind, ModelKind::Trend);
    }

    #[test]
    fn forced_weekly_on_tiny_series_fails_with_fit_error() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let daily = daily_from(&[120.0, 130.0, 128.0, 125.0, 135.0], start);

        let err = fit_and_select(&daily, ModelSpec::Weekly, 3, 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ForecastFit);
    }

    #[test]
    fn bic_prefers_simpler_when_close() {
        let make = |kind: ModelKind, bic: f64| FitResult {
            model: HarmonicModel {
                kind,
                display_name: kind.display_name().to_string(),
                betas: vec![],
                orders: FourierOrders::none(),
                sigma: 0.0,
                origin: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                history_dates: vec![],
            },
            quality: FitQuality {
                sse: 0.0,
                rmse: 0.0,
                sigma: 0.0,
                bic,
                n: 100,
            },
        };

        let fits = vec![make(ModelKind::Trend, 10.0), make(ModelKind::TrendWeekly, 11.5)];
        let chosen = select_by_bic(&fits);
        assert_eq!(chosen.model.kind, ModelKind::Trend);
    }
}
