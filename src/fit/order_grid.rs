//! Fourier-order grid generation.
//!
//! We choose seasonal Fourier orders using a deterministic grid search.
//!
//! Why grid search?
//! - It avoids the local-minima issues of nonlinear order selection.
//! - It is deterministic given the same inputs/flags.
//! - With small order ranges, a modest grid is fast enough for interactive use.

use crate::domain::{FourierOrders, ModelKind};
use crate::error::{AppError, ErrorKind};

/// Hard cap on the weekly order: with daily sampling and a 7-day period,
/// harmonics above k=3 alias onto lower ones.
pub const WEEKLY_ORDER_CAP: usize = 3;

/// Hard cap on the yearly order (matches common forecasting defaults).
pub const YEARLY_ORDER_CAP: usize = 10;

/// Candidate orders for a single model kind.
pub fn order_grid(
    kind: ModelKind,
    weekly_max: usize,
    yearly_max: usize,
) -> Result<Vec<FourierOrders>, AppError> {
    let weekly_max = validate_max("weekly", weekly_max, WEEKLY_ORDER_CAP)?;
    let yearly_max = validate_max("yearly", yearly_max, YEARLY_ORDER_CAP)?;

    let grid = match kind {
        ModelKind::Trend => vec![FourierOrders::none()],
        ModelKind::TrendWeekly => (1..=weekly_max)
            .map(|w| FourierOrders { weekly: w, yearly: 0 })
            .collect(),
        ModelKind::TrendWeeklyYearly => {
            let mut out = Vec::with_capacity(weekly_max * yearly_max);
            for w in 1..=weekly_max {
                for y in 1..=yearly_max {
                    out.push(FourierOrders { weekly: w, yearly: y });
                }
            }
            out
        }
    };

    Ok(grid)
}

fn validate_max(label: &str, max: usize, cap: usize) -> Result<usize, AppError> {
    if max == 0 {
        return Err(AppError::new(
            ErrorKind::InvalidInput,
            format!("Invalid {label} order maximum: must be >= 1."),
        ));
    }
    Ok(max.min(cap))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_grid_is_single_empty_candidate() {
        let grid = order_grid(ModelKind::Trend, 3, 10).unwrap();
        assert_eq!(grid, vec![FourierOrders::none()]);
    }

    #[test]
    fn weekly_grid_caps_at_alias_limit() {
        let grid = order_grid(ModelKind::TrendWeekly, 12, 10).unwrap();
        assert_eq!(grid.len(), WEEKLY_ORDER_CAP);
        assert!(grid.iter().all(|o| o.yearly == 0));
    }

    #[test]
    fn full_grid_is_cross_product() {
        let grid = order_grid(ModelKind::TrendWeeklyYearly, 2, 4).unwrap();
        assert_eq!(grid.len(), 8);
        assert!(grid.iter().all(|o| o.weekly >= 1 && o.yearly >= 1));
    }

    #[test]
    fn zero_max_is_rejected() {
        let err = order_grid(ModelKind::TrendWeekly, 0, 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
