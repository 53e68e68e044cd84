//! CSV ingest and normalization.
//!
//! This module is responsible for turning an AQI readings CSV into a clean,
//! daily-resampled `(date, value)` series that is safe to fit, plus the
//! display-only aggregates (per-city means).
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (stable ordering, no hidden randomness)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{CityMean, DailyPoint, DatasetStats, ForecastConfig, Observation};
use crate::error::{AppError, ErrorKind};

/// Required CSV columns.
const REQUIRED_COLUMNS: [&str; 2] = ["date", "aqi"];

/// How many raw rows to retain for the data preview.
const PREVIEW_CAP: usize = 10;

/// A raw row of CSV inputs after parsing.
#[derive(Debug, Clone)]
pub struct AqiRow {
    pub date: NaiveDate,
    pub aqi: f64,
    pub city: Option<String>,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: cleaned series + aggregates + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    /// Cleaned observations, ordered by date (duplicates allowed).
    pub observations: Vec<Observation>,
    /// Daily mean series (one point per observed calendar day, gaps allowed).
    pub daily: Vec<DailyPoint>,
    /// Per-city means, sorted descending (empty when no `city` column).
    pub city_means: Vec<CityMean>,
    /// First rows as parsed, for the data preview.
    pub preview: Vec<AqiRow>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and normalize an AQI CSV per the run configuration.
pub fn load_aqi_csv(config: &ForecastConfig) -> Result<IngestedData, AppError> {
    let file = File::open(&config.csv_path).map_err(|e| {
        AppError::new(
            ErrorKind::InvalidInput,
            format!("Failed to open CSV '{}': {e}", config.csv_path.display()),
        )
    })?;
    ingest_from_reader(file)
}

/// Ingest from any reader (the unit of testability).
pub fn ingest_from_reader<R: Read>(input: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| {
            AppError::new(ErrorKind::InvalidInput, format!("Failed to read CSV headers: {e}"))
        })?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;
    let has_city = header_map.contains_key("city");

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(row) => rows.push(row),
            Err(e) => row_errors.push(RowError { line, message: e }),
        }
    }

    let rows_used = rows.len();
    if rows_used == 0 {
        return Err(AppError::new(
            ErrorKind::ForecastFit,
            "No valid rows remain after cleaning.",
        ));
    }

    let city_means = if has_city { city_means(&rows) } else { Vec::new() };
    let preview: Vec<AqiRow> = rows.iter().take(PREVIEW_CAP).cloned().collect();

    let mut observations: Vec<Observation> = rows
        .iter()
        .map(|r| Observation {
            date: r.date,
            value: r.aqi,
        })
        .collect();
    observations.sort_by_key(|o| o.date);

    let daily = resample_daily_mean(&observations);
    let stats = compute_stats(&daily).ok_or_else(|| {
        AppError::new(
            ErrorKind::ForecastFit,
            "No valid points remain after cleaning.",
        )
    })?;

    Ok(IngestedData {
        observations,
        daily,
        city_means,
        preview,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿date"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !header_map.contains_key(*name))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let names: Vec<String> = missing.iter().map(|m| format!("`{m}`")).collect();
    Err(AppError::new(
        ErrorKind::MissingColumns,
        format!("Missing required column(s): {}.", names.join(", ")),
    ))
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<AqiRow, String> {
    let date = parse_date(get_required(record, header_map, "date")?)?;

    let aqi_raw = get_required(record, header_map, "aqi")?;
    let aqi = aqi_raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `aqi` value '{aqi_raw}'."))?;
    if !aqi.is_finite() {
        return Err(format!("Non-finite `aqi` value '{aqi_raw}'."));
    }

    let city = get_optional(record, header_map, "city").map(str::to_string);

    Ok(AqiRow { date, aqi, city })
}

/// Per-city mean of the value, sorted descending by mean.
///
/// Ties break on city name so the table is stable across runs.
fn city_means(rows: &[AqiRow]) -> Vec<CityMean> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for row in rows {
        let Some(city) = row.city.as_deref() else {
            continue;
        };
        let entry = sums.entry(city).or_insert((0.0, 0));
        entry.0 += row.aqi;
        entry.1 += 1;
    }

    let mut means: Vec<CityMean> = sums
        .into_iter()
        .map(|(city, (sum, n))| CityMean {
            city: city.to_string(),
            mean: sum / n as f64,
            n,
        })
        .collect();

    means.sort_by(|a, b| {
        b.mean
            .partial_cmp(&a.mean)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.city.cmp(&b.city))
    });
    means
}

/// Collapse the sorted observations into one mean value per calendar day.
fn resample_daily_mean(observations: &[Observation]) -> Vec<DailyPoint> {
    let mut daily: Vec<DailyPoint> = Vec::new();

    for obs in observations {
        match daily.last_mut() {
            Some(point) if point.date == obs.date => {
                // Running mean keeps a single pass over the sorted data.
                point.n_obs += 1;
                point.value += (obs.value - point.value) / point.n_obs as f64;
            }
            _ => daily.push(DailyPoint {
                date: obs.date,
                value: obs.value,
                n_obs: 1,
            }),
        }
    }

    daily
}

fn compute_stats(daily: &[DailyPoint]) -> Option<DatasetStats> {
    let first = daily.first()?;
    let last = daily.last()?;

    let mut value_min = f64::INFINITY;
    let mut value_max = f64::NEG_INFINITY;
    for p in daily {
        value_min = value_min.min(p.value);
        value_max = value_max.max(p.value);
    }

    if !value_min.is_finite() || !value_max.is_finite() {
        return None;
    }

    Some(DatasetStats {
        n_days: daily.len(),
        first_date: first.date,
        last_date: last.date,
        value_min,
        value_max,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // We recommend ISO dates (`YYYY-MM-DD`), but air-quality exports often use
    // `DD/MM/YYYY` or `DD-MM-YYYY`. We accept a small set of common formats to
    // reduce friction while keeping parsing deterministic.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}
