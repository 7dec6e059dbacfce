use super::model::Observation;

// ---------------------------------------------------------------------------
// Year-range filter
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]` year window chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    /// Build a range, swapping the ends if they arrive reversed.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// A range that lets every year through.
    pub fn everything() -> Self {
        Self {
            min: i32::MIN,
            max: i32::MAX,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    /// Clamp this range into `bounds`, falling back to `bounds` when the two
    /// do not overlap.
    pub fn clamp_to(&self, bounds: YearRange) -> YearRange {
        let min = self.min.clamp(bounds.min, bounds.max);
        let max = self.max.clamp(bounds.min, bounds.max);
        if self.max < bounds.min || self.min > bounds.max {
            bounds
        } else {
            YearRange::new(min, max)
        }
    }
}

/// The filtered view: observations whose year falls inside `range`.
pub fn filter_years(observations: &[Observation], range: YearRange) -> Vec<Observation> {
    observations
        .iter()
        .filter(|o| range.contains(o.year))
        .copied()
        .collect()
}

/// Smallest range covering every observation of every series, or `None`
/// when all of them are empty.
pub fn year_bounds<'a, I>(series: I) -> Option<YearRange>
where
    I: IntoIterator<Item = &'a [Observation]>,
{
    series
        .into_iter()
        .flat_map(|s| s.iter().map(|o| o.year))
        .fold(None, |acc: Option<YearRange>, year| {
            Some(match acc {
                None => YearRange::new(year, year),
                Some(r) => YearRange::new(r.min.min(year), r.max.max(year)),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(years: &[i32]) -> Vec<Observation> {
        years
            .iter()
            .map(|&y| Observation::new(y, y as f64))
            .collect()
    }

    #[test]
    fn filter_is_inclusive_on_both_ends() {
        let obs = series(&[2000, 2001, 2002, 2003, 2004]);
        let out = filter_years(&obs, YearRange::new(2001, 2003));
        let years: Vec<i32> = out.iter().map(|o| o.year).collect();
        assert_eq!(years, vec![2001, 2002, 2003]);
    }

    #[test]
    fn reversed_range_is_normalised() {
        assert_eq!(YearRange::new(2010, 2000), YearRange::new(2000, 2010));
    }

    #[test]
    fn bounds_span_all_series() {
        let a = series(&[2003, 2005]);
        let b = series(&[2001]);
        let empty: Vec<Observation> = Vec::new();
        let bounds = year_bounds([a.as_slice(), b.as_slice(), empty.as_slice()]);
        assert_eq!(bounds, Some(YearRange::new(2001, 2005)));
        assert_eq!(year_bounds([empty.as_slice()]), None);
    }

    #[test]
    fn clamp_keeps_overlap_and_resets_disjoint() {
        let bounds = YearRange::new(2000, 2020);
        assert_eq!(
            YearRange::new(1990, 2010).clamp_to(bounds),
            YearRange::new(2000, 2010)
        );
        assert_eq!(YearRange::new(1980, 1990).clamp_to(bounds), bounds);
        assert_eq!(YearRange::everything().clamp_to(bounds), bounds);
    }
}
