//! Fourier basis functions for seasonal blocks.
//!
//! A seasonal block of order `K` and period `P` contributes the regressors:
//!
//! - `sin(2π k t / P)` and `cos(2π k t / P)` for `k = 1..=K`
//!
//! Numerical notes:
//! - `t` is a day count since the series origin and can reach tens of
//!   thousands; we reduce `t` modulo `P` before forming the angle so the
//!   argument to `sin`/`cos` stays small and the pair remains exactly
//!   periodic in floating point.

/// Days per weekly cycle.
pub const WEEKLY_PERIOD_DAYS: f64 = 7.0;

/// Days per yearly cycle (mean tropical-ish year, the usual forecasting choice).
pub const YEARLY_PERIOD_DAYS: f64 = 365.25;

/// Evaluate the `k`-th harmonic pair `(sin, cos)` for period `period` at day `t`.
pub fn fourier_pair(t: f64, period: f64, k: usize) -> (f64, f64) {
    let phase = t.rem_euclid(period) / period;
    let angle = std::f64::consts::TAU * (k as f64) * phase;
    angle.sin_cos()
}

/// Day offset of `date` from `origin` as an f64 (negative when `date < origin`).
pub fn day_index(origin: chrono::NaiveDate, date: chrono::NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn weekly_pair_repeats_every_seven_days() {
        for k in 1..=4 {
            let (s0, c0) = fourier_pair(3.0, WEEKLY_PERIOD_DAYS, k);
            let (s1, c1) = fourier_pair(3.0 + 7.0, WEEKLY_PERIOD_DAYS, k);
            assert!((s0 - s1).abs() < 1e-12, "sin k={k}: {s0} vs {s1}");
            assert!((c0 - c1).abs() < 1e-12, "cos k={k}: {c0} vs {c1}");
        }
    }

    #[test]
    fn pair_is_finite_for_large_t() {
        let (s, c) = fourier_pair(1.0e7, YEARLY_PERIOD_DAYS, 10);
        assert!(s.is_finite() && c.is_finite());
        assert!(s.abs() <= 1.0 + 1e-12 && c.abs() <= 1.0 + 1e-12);
    }

    #[test]
    fn day_index_basic() {
        let origin = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert!((day_index(origin, later) - 30.0).abs() < 1e-12);
        assert!((day_index(origin, origin)).abs() < 1e-12);
    }
}
