//! Sample datasets: the canonical 5-row fixture and a seeded synthetic
//! AQI generator for demos and tests.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::{AppError, ErrorKind};
use crate::math::{fourier_pair, WEEKLY_PERIOD_DAYS, YEARLY_PERIOD_DAYS};

/// The canonical sample CSV offered to users as a starting point.
pub const SAMPLE_CSV: &str = "date,aqi\n\
2024-01-01,120\n\
2024-01-02,130\n\
2024-01-03,128\n\
2024-01-04,125\n\
2024-01-05,135\n";

/// Default start date for synthetic series (fixed for reproducibility).
pub const SYNTHETIC_START: NaiveDate = match NaiveDate::from_ymd_opt(2022, 1, 1) {
    Some(d) => d,
    None => panic!("valid constant date"),
};

/// Write the canonical sample CSV to `path`.
pub fn write_sample_csv(path: &Path) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            ErrorKind::InvalidInput,
            format!("Failed to create sample CSV '{}': {e}", path.display()),
        )
    })?;
    file.write_all(SAMPLE_CSV.as_bytes()).map_err(|e| {
        AppError::new(
            ErrorKind::InvalidInput,
            format!("Failed to write sample CSV: {e}"),
        )
    })?;
    Ok(())
}

/// Generate a synthetic daily AQI CSV: slow trend + weekly dip + yearly
/// swing + Gaussian noise, seeded for reproducibility.
///
/// The shape is deliberately "forecastable": the fitted model should recover
/// the weekly block on any span of a few weeks or more.
pub fn synthetic_csv(days: usize, seed: u64, start: NaiveDate) -> Result<String, AppError> {
    if days == 0 {
        return Err(AppError::new(
            ErrorKind::InvalidInput,
            "Synthetic day count must be > 0.",
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 5.0)
        .map_err(|e| AppError::new(ErrorKind::Internal, format!("Noise distribution error: {e}")))?;

    let mut out = String::with_capacity(16 * (days + 1));
    out.push_str("date,aqi\n");

    for i in 0..days {
        let date = start + Duration::days(i as i64);
        let t = i as f64;

        let trend = 90.0 + 0.02 * t;
        let (ws, wc) = fourier_pair(t, WEEKLY_PERIOD_DAYS, 1);
        let weekly = 9.0 * ws - 4.0 * wc;
        let (ys, _) = fourier_pair(t, YEARLY_PERIOD_DAYS, 1);
        let yearly = 18.0 * ys;
        let noise: f64 = normal.sample(&mut rng);

        let aqi = (trend + weekly + yearly + noise).max(0.0);
        out.push_str(&format!("{date},{aqi:.1}\n"));
    }

    Ok(out)
}

/// Write a synthetic CSV to `path`.
pub fn write_synthetic_csv(
    path: &Path,
    days: usize,
    seed: u64,
    start: NaiveDate,
) -> Result<(), AppError> {
    let text = synthetic_csv(days, seed, start)?;
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            ErrorKind::InvalidInput,
            format!("Failed to create synthetic CSV '{}': {e}", path.display()),
        )
    })?;
    file.write_all(text.as_bytes()).map_err(|e| {
        AppError::new(
            ErrorKind::InvalidInput,
            format!("Failed to write synthetic CSV: {e}"),
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModelKind, ModelSpec};
    use crate::fit::selection::fit_and_select;
    use crate::io::ingest_from_reader;

    #[test]
    fn sample_csv_is_the_canonical_fixture() {
        assert_eq!(SAMPLE_CSV.lines().count(), 6);
        assert!(SAMPLE_CSV.starts_with("date,aqi\n2024-01-01,120\n"));
        assert!(SAMPLE_CSV.ends_with("2024-01-05,135\n"));
    }

    #[test]
    fn synthetic_is_deterministic_per_seed() {
        let a = synthetic_csv(30, 42, SYNTHETIC_START).unwrap();
        let b = synthetic_csv(30, 42, SYNTHETIC_START).unwrap();
        let c = synthetic_csv(30, 43, SYNTHETIC_START).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.lines().count(), 31);
    }

    #[test]
    fn synthetic_round_trips_through_ingest_and_fit() {
        let csv = synthetic_csv(84, 7, SYNTHETIC_START).unwrap();
        let ingest = ingest_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ingest.rows_used, 84);

        // Twelve weeks of strong weekly structure: auto-selection should pick
        // the weekly model (yearly remains span-guarded).
        let selection = fit_and_select(&ingest.daily, ModelSpec::Auto, 3, 10).unwrap();
        assert_eq!(selection.best.model.kind, ModelKind::TrendWeekly);
    }

    #[test]
    fn zero_days_is_rejected() {
        let err = synthetic_csv(0, 1, SYNTHETIC_START).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
