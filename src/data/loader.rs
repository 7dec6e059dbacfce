use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate};

use crate::error::{DashboardError, Result};

use super::model::{normalize, Observation};
use super::registry::{Aggregation, LongSeriesSpec};

/// Column selecting the indicator row in World Bank style extracts.
pub const INDICATOR_COLUMN: &str = "Indicator Name";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a wide-format indicator file (one row per indicator, one column per
/// year) and reshape it into a sorted long-format series.
pub fn load_wide(path: &Path, indicator: Option<&str>, year_threshold: i32) -> Result<Vec<Observation>> {
    let file = std::fs::File::open(path).map_err(|e| DashboardError::from_io(path, e))?;
    let observations = read_wide(file, indicator, year_threshold)
        .map_err(|reason| DashboardError::malformed(path, reason))?;
    log::info!("Loaded {} observations from {}", observations.len(), path.display());
    Ok(observations)
}

/// Load a long-format file with a date column and a value column,
/// aggregating rows to one observation per year.
pub fn load_long(path: &Path, spec: &LongSeriesSpec) -> Result<Vec<Observation>> {
    let file = std::fs::File::open(path).map_err(|e| DashboardError::from_io(path, e))?;
    let observations =
        read_long(file, spec).map_err(|reason| DashboardError::malformed(path, reason))?;
    log::info!(
        "Loaded {} yearly observations of {} from {}",
        observations.len(),
        spec.key,
        path.display()
    );
    Ok(observations)
}

// ---------------------------------------------------------------------------
// Wide → long reshape
// ---------------------------------------------------------------------------

/// A header names a year column when it is exactly four ASCII digits at or
/// after `threshold`.
pub fn year_column(header: &str, threshold: i32) -> Option<i32> {
    let h = header.trim();
    if h.len() != 4 || !h.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    h.parse::<i32>().ok().filter(|y| *y >= threshold)
}

/// Parse a numeric cell. Blank, placeholder (`..`) and non-finite cells
/// yield `None` and are dropped by the callers.
pub fn parse_value(cell: &str) -> Option<f64> {
    let c = cell.trim();
    if c.is_empty() {
        return None;
    }
    c.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reshape wide CSV text. Errors are plain strings so the caller can attach
/// the source path.
pub fn read_wide<R: Read>(
    source: R,
    indicator: Option<&str>,
    year_threshold: i32,
) -> std::result::Result<Vec<Observation>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("reading CSV headers: {e}"))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let year_cols: Vec<(usize, i32)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| year_column(h, year_threshold).map(|y| (i, y)))
        .collect();
    if year_cols.is_empty() {
        return Err(format!("no year columns at or after {year_threshold}"));
    }

    let indicator_idx = headers.iter().position(|h| h == INDICATOR_COLUMN);

    let mut observations = Vec::new();
    let mut dropped = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("CSV row {row_no}: {e}"))?;

        if let (Some(wanted), Some(idx)) = (indicator, indicator_idx) {
            if record.get(idx).map(str::trim) != Some(wanted) {
                continue;
            }
        }

        for &(col, year) in &year_cols {
            match record.get(col).and_then(parse_value) {
                Some(value) => observations.push(Observation::new(year, value)),
                None => dropped += 1,
            }
        }
    }

    if dropped > 0 {
        log::debug!("dropped {dropped} empty or non-numeric cells");
    }
    Ok(normalize(observations))
}

// ---------------------------------------------------------------------------
// Dated long-format series
// ---------------------------------------------------------------------------

/// Calendar date of a cell: `2019`, `2019-07`, `2019/07/31` or an ISO
/// timestamp. A missing month or day counts as the first.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let date = cell.trim().split([' ', 'T']).next()?;
    let mut parts = date.split(['-', '/']);
    let year = parts
        .next()
        .filter(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()))?
        .parse()
        .ok()?;
    let month = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    let day = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 1,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Year of a date cell (`2019`, `2019-07`, `2019-07-01`).
pub fn year_of_date(cell: &str) -> Option<i32> {
    parse_date(cell).map(|d| d.year())
}

/// Running state of one year while rows stream in.
#[derive(Debug, Default)]
struct YearAcc {
    sum: f64,
    count: usize,
    latest: Option<(NaiveDate, f64)>,
}

impl YearAcc {
    fn push(&mut self, date: NaiveDate, value: f64) {
        self.sum += value;
        self.count += 1;
        // ties go to the later row
        if self.latest.map_or(true, |(seen, _)| date >= seen) {
            self.latest = Some((date, value));
        }
    }

    fn finish(&self, aggregation: Aggregation) -> Option<f64> {
        match aggregation {
            Aggregation::Sum => Some(self.sum),
            Aggregation::Mean => (self.count > 0).then(|| self.sum / self.count as f64),
            Aggregation::Last => self.latest.map(|(_, v)| v),
        }
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> std::result::Result<usize, String> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| format!("missing '{name}' column"))
}

pub fn read_long<R: Read>(
    source: R,
    spec: &LongSeriesSpec,
) -> std::result::Result<Vec<Observation>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| format!("reading CSV headers: {e}"))?
        .clone();
    let date_idx = column_index(&headers, spec.date_column)?;
    let value_idx = column_index(&headers, spec.value_column)?;
    let selector = match &spec.series_filter {
        Some(filter) => Some((column_index(&headers, filter.column)?, filter)),
        None => None,
    };

    // BTreeMap keeps years ordered.
    let mut by_year: BTreeMap<i32, YearAcc> = BTreeMap::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("CSV row {row_no}: {e}"))?;
        if let Some((idx, filter)) = selector {
            if !record.get(idx).is_some_and(|cell| filter.matches(cell)) {
                continue;
            }
        }
        let Some(date) = record.get(date_idx).and_then(parse_date) else {
            continue;
        };
        let Some(value) = record.get(value_idx).and_then(parse_value) else {
            continue;
        };
        by_year.entry(date.year()).or_default().push(date, value);
    }

    Ok(by_year
        .into_iter()
        .filter_map(|(year, acc)| acc.finish(spec.aggregation).map(|v| Observation::new(year, v)))
        .collect())
}
