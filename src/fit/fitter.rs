//! Low-level fitting routines for a single model kind.
//!
//! Given:
//! - day indices `t_i` and daily mean values `y_i`
//! - a list of candidate Fourier-order tuples
//!
//! we solve, for each candidate:
//! - an OLS problem to find the best β coefficients
//! - the resulting SSE and BIC
//!
//! and return the best (lowest BIC) candidate. BIC rather than raw SSE is the
//! in-grid criterion because the coefficient count varies with the orders.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{DailyPoint, FourierOrders, ModelKind};
use crate::error::{AppError, ErrorKind};
use crate::math::{day_index, solve_least_squares};
use crate::models::{fill_design_row, predict};

/// Best fit for a single model kind.
#[derive(Debug, Clone)]
pub struct ModelFit {
    pub kind: ModelKind,
    pub betas: Vec<f64>,
    pub orders: FourierOrders,
    pub sse: f64,
    pub rmse: f64,
    /// Residual standard deviation, degrees-of-freedom adjusted.
    pub sigma: f64,
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    orders: FourierOrders,
    betas: Vec<f64>,
    sse: f64,
    bic: f64,
}

/// Bayesian information criterion: `n·ln(SSE/n) + k·ln(n)`.
pub fn bic(n: usize, sse: f64, k: usize) -> f64 {
    let n_f = n as f64;
    let sse_per = (sse / n_f).max(1e-12);
    n_f * sse_per.ln() + (k as f64) * n_f.ln()
}

/// Fit a single model kind over an order grid.
///
/// `origin` is the date mapped to `t = 0`; `daily` must be ordered by date
/// with unique dates (the normalizer guarantees both).
pub fn fit_model(
    kind: ModelKind,
    daily: &[DailyPoint],
    origin: chrono::NaiveDate,
    grid: &[FourierOrders],
) -> Result<ModelFit, AppError> {
    if daily.len() < 2 {
        return Err(AppError::new(
            ErrorKind::ForecastFit,
            "Need at least 2 distinct dates to fit a forecast model.",
        ));
    }
    if grid.is_empty() {
        return Err(AppError::new(ErrorKind::Internal, "Order grid is empty."));
    }

    let ts: Vec<f64> = daily.iter().map(|p| day_index(origin, p.date)).collect();
    let ys: Vec<f64> = daily.iter().map(|p| p.value).collect();
    let n = ts.len();

    // Evaluate each order tuple independently (parallel).
    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &orders)| {
            evaluate_candidate(kind, orders, &ts, &ys, n).map(|(betas, sse)| {
                let k = kind.beta_len(orders);
                Candidate {
                    idx,
                    orders,
                    betas,
                    sse,
                    bic: bic(n, sse, k),
                }
            })
        })
        .collect();

    if candidates.is_empty() {
        return Err(AppError::new(
            ErrorKind::ForecastFit,
            format!("No valid fit candidates for model {}.", kind.display_name()),
        ));
    }

    // Deterministic selection: minimum BIC; break ties by original grid index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.bic < best.bic || (c.bic == best.bic && c.idx < best.idx) {
            best = c;
        }
    }

    let p = kind.beta_len(best.orders);
    let rmse = (best.sse / n as f64).sqrt();
    let sigma = (best.sse / n.saturating_sub(p).max(1) as f64).sqrt();

    Ok(ModelFit {
        kind,
        betas: best.betas.clone(),
        orders: best.orders,
        sse: best.sse,
        rmse,
        sigma,
    })
}

fn evaluate_candidate(
    kind: ModelKind,
    orders: FourierOrders,
    ts: &[f64],
    ys: &[f64],
    n: usize,
) -> Option<(Vec<f64>, f64)> {
    // Validate inputs - skip candidates with invalid data.
    if ts.iter().any(|t| !t.is_finite()) {
        return None;
    }
    if ys.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let p = kind.beta_len(orders);
    if n < p {
        return None;
    }

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut y = DVector::<f64>::zeros(n);
    let mut row = vec![0.0; p];

    for i in 0..n {
        fill_design_row(kind, ts[i], orders, &mut row);
        for j in 0..p {
            x[(i, j)] = row[j];
        }
        y[i] = ys[i];
    }

    let beta = solve_least_squares(&x, &y)?;
    let betas: Vec<f64> = beta.iter().copied().collect();

    let mut sse = 0.0;
    for i in 0..n {
        let y_fit = predict(kind, ts[i], &betas, orders);
        let r = ys[i] - y_fit;
        sse += r * r;
    }

    if sse.is_finite() {
        Some((betas, sse))
    } else {
        None
    }
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
    fn fit_recovers_linear_trend() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let values: Vec<f64> = (0..20).map(|i| 100.0 + 2.0 * i as f64).collect();
        let daily = daily_from(&values, start);

        let grid = vec![FourierOrders::none()];
        let fit = fit_model(ModelKind::Trend, &daily, start, &grid).unwrap();

        assert!((fit.betas[0] - 100.0).abs() < 1e-8);
        assert!((fit.betas[1] - 2.0).abs() < 1e-8);
        assert!(fit.sse < 1e-12);
    }

    #[test]
    fn fit_selects_correct_weekly_order_from_grid() {
        // Synthetic data with a single weekly harmonic; the grid search should
        // not pay the BIC penalty for higher orders.
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let values: Vec<f64> = (0..56)
            .map(|i| {
                let t = i as f64;
                let (s, c) = crate::math::fourier_pair(t, 7.0, 1);
                50.0 + 0.1 * t + 4.0 * s - 2.0 * c
            })
            .collect();
        let daily = daily_from(&values, start);

        let grid: Vec<FourierOrders> = (1..=3)
            .map(|w| FourierOrders { weekly: w, yearly: 0 })
            .collect();
        let fit = fit_model(ModelKind::TrendWeekly, &daily, start, &grid).unwrap();

        assert_eq!(fit.orders.weekly, 1);
        assert!((fit.betas[2] - 4.0).abs() < 1e-6);
        assert!((fit.betas[3] + 2.0).abs() < 1e-6);
    }

    #[test]
    fn fit_is_deterministic() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let values: Vec<f64> = (0..30).map(|i| 80.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let daily = daily_from(&values, start);
        let grid: Vec<FourierOrders> = (1..=3)
            .map(|w| FourierOrders { weekly: w, yearly: 0 })
            .collect();

        let a = fit_model(ModelKind::TrendWeekly, &daily, start, &grid).unwrap();
        let b = fit_model(ModelKind::TrendWeekly, &daily, start, &grid).unwrap();
        assert_eq!(a.orders, b.orders);
        assert_eq!(a.betas, b.betas);
        assert_eq!(a.sse.to_bits(), b.sse.to_bits());
    }

    #[test]
    fn single_point_series_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let daily = daily_from(&[120.0], start);
        let err = fit_model(ModelKind::Trend, &daily, start, &[FourierOrders::none()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ForecastFit);
    }

    #[test]
    fn constant_series_fits_flat_trend() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let daily = daily_from(&[97.0; 10], start);
        let fit = fit_model(ModelKind::Trend, &daily, start, &[FourierOrders::none()]).unwrap();
        assert!((fit.betas[0] - 97.0).abs() < 1e-8);
        assert!(fit.betas[1].abs() < 1e-8);
        assert!(fit.sigma < 1e-6);
    }
}
