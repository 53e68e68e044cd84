//! Harmonic model evaluation.
//!
//! The fitter relies on two primitive operations:
//! - build a design row for a given day index and Fourier orders (for OLS)
//! - predict y(t) given betas (for residuals/forecasts)
//!
//! Decomposition reuses the same coefficient layout to evaluate each additive
//! block (trend, weekly, yearly) on its own.

use crate::domain::{FourierOrders, ModelKind};
use crate::math::{fourier_pair, WEEKLY_PERIOD_DAYS, YEARLY_PERIOD_DAYS};

/// Fill a design row for the given model kind.
///
/// The row layout is `[1, t, weekly sin/cos pairs…, yearly sin/cos pairs…]`,
/// matching `ModelKind::beta_len`.
///
/// # Panics
/// Panics if `out` does not have length `kind.beta_len(orders)`. Callers
/// should size the row correctly.
pub fn fill_design_row(kind: ModelKind, t: f64, orders: FourierOrders, out: &mut [f64]) {
    assert_eq!(out.len(), kind.beta_len(orders));

    out[0] = 1.0;
    out[1] = t;

    let mut j = 2;
    if kind.includes_weekly() {
        for k in 1..=orders.weekly {
            let (s, c) = fourier_pair(t, WEEKLY_PERIOD_DAYS, k);
            out[j] = s;
            out[j + 1] = c;
            j += 2;
        }
    }
    if kind.includes_yearly() {
        for k in 1..=orders.yearly {
            let (s, c) = fourier_pair(t, YEARLY_PERIOD_DAYS, k);
            out[j] = s;
            out[j + 1] = c;
            j += 2;
        }
    }
}

/// Predict `y(t)` for the given model kind.
pub fn predict(kind: ModelKind, t: f64, betas: &[f64], orders: FourierOrders) -> f64 {
    trend_at(t, betas) + weekly_at(kind, t, betas, orders) + yearly_at(kind, t, betas, orders)
}

/// Trend block: `β0 + β1·t`.
pub fn trend_at(t: f64, betas: &[f64]) -> f64 {
    betas[0] + betas[1] * t
}

/// Weekly block contribution at `t` (0 when the kind has no weekly block).
pub fn weekly_at(kind: ModelKind, t: f64, betas: &[f64], orders: FourierOrders) -> f64 {
    if !kind.includes_weekly() {
        return 0.0;
    }
    harmonic_sum(t, WEEKLY_PERIOD_DAYS, orders.weekly, &betas[2..2 + 2 * orders.weekly])
}

/// Yearly block contribution at `t` (0 when the kind has no yearly block).
pub fn yearly_at(kind: ModelKind, t: f64, betas: &[f64], orders: FourierOrders) -> f64 {
    if !kind.includes_yearly() {
        return 0.0;
    }
    let start = 2 + if kind.includes_weekly() { 2 * orders.weekly } else { 0 };
    harmonic_sum(t, YEARLY_PERIOD_DAYS, orders.yearly, &betas[start..start + 2 * orders.yearly])
}

fn harmonic_sum(t: f64, period: f64, order: usize, pairs: &[f64]) -> f64 {
    let mut acc = 0.0;
    for k in 1..=order {
        let (s, c) = fourier_pair(t, period, k);
        acc += pairs[2 * (k - 1)] * s + pairs[2 * (k - 1) + 1] * c;
    }
    acc
}
