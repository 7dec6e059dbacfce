use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Observation – one (Year, Value) row of a long-format series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub year: i32,
    pub value: f64,
}

impl Observation {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

// ---------------------------------------------------------------------------
// Unit – how a series is scaled on screen
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Absolute money amounts (USD).
    Currency,
    /// Shares on a 0–100 scale.
    Percent,
    /// Index or other unitless level (CPI, exchange-rate indices).
    Index,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Currency => write!(f, "USD"),
            Unit::Percent => write!(f, "%"),
            Unit::Index => write!(f, "index"),
        }
    }
}

// ---------------------------------------------------------------------------
// SeriesMeta – what the chart factory needs to know about a series
// ---------------------------------------------------------------------------

/// Display metadata of one series, independent of where it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesMeta {
    /// Short name used in legends ("GDP", "Exports").
    pub name: String,
    /// Chart title.
    pub title: String,
    /// Y-axis label.
    pub y_axis: String,
    pub unit: Unit,
    /// Preferred trace colour as `#rrggbb`.
    pub color: Option<String>,
}

/// Sort by year and keep the first value seen for each year.
pub fn normalize(mut observations: Vec<Observation>) -> Vec<Observation> {
    // stable sort keeps source order within a year
    observations.sort_by_key(|o| o.year);
    observations.dedup_by(|later, earlier| {
        let dup = later.year == earlier.year;
        if dup {
            log::debug!(
                "dropping duplicate year {} (keeping {}, ignoring {})",
                later.year,
                earlier.value,
                later.value
            );
        }
        dup
    });
    observations
}

/// Latest observation and the one before it, if any.
pub fn last_two(observations: &[Observation]) -> Option<(Observation, Option<Observation>)> {
    let latest = observations.iter().max_by_key(|o| o.year)?;
    let previous = observations
        .iter()
        .filter(|o| o.year < latest.year)
        .max_by_key(|o| o.year)
        .copied();
    Some((*latest, previous))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_sorts_and_keeps_first_duplicate() {
        let obs = vec![
            Observation::new(2003, 3.0),
            Observation::new(2001, 1.0),
            Observation::new(2003, 99.0),
            Observation::new(2002, 2.0),
        ];
        let out = normalize(obs);
        let years: Vec<i32> = out.iter().map(|o| o.year).collect();
        assert_eq!(years, vec![2001, 2002, 2003]);
        assert_eq!(out[2].value, 3.0);
    }

    #[test]
    fn last_two_handles_unsorted_input() {
        let obs = vec![
            Observation::new(2010, 5.0),
            Observation::new(2012, 7.0),
            Observation::new(2011, 6.0),
        ];
        let (latest, prev) = last_two(&obs).unwrap();
        assert_eq!(latest.year, 2012);
        assert_eq!(prev.map(|p| p.year), Some(2011));
        assert!(last_two(&[]).is_none());
    }
}
