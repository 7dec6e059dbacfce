use std::collections::{BTreeMap, BTreeSet};

use crate::data::model::{Observation, SeriesMeta, Unit};

use super::{ChartDescription, Layout, Trace, TraceKind, YAxis};

const PERCENT_RANGE: [f64; 2] = [0.0, 100.0];

/// One series of a combination chart.
#[derive(Debug, Clone, Copy)]
pub struct AxisSeries<'a> {
    pub meta: &'a SeriesMeta,
    pub observations: &'a [Observation],
}

impl<'a> AxisSeries<'a> {
    pub fn new(meta: &'a SeriesMeta, observations: &'a [Observation]) -> Self {
        Self { meta, observations }
    }
}

/// Overlay a currency series (bars, left axis) with percentage series
/// (lines, right axis fixed to 0–100).
///
/// All traces share the sorted union of years. A series without a value for
/// some year gets `None` there; nothing is zero-filled or interpolated.
pub fn build_multi_axis(primary: AxisSeries<'_>, secondary: &[AxisSeries<'_>]) -> ChartDescription {
    const TITLE: &str = "Comparison: GDP vs. Socio-Economic Indicators";

    let years: BTreeSet<i32> = std::iter::once(&primary)
        .chain(secondary)
        .flat_map(|s| s.observations.iter().map(|o| o.year))
        .collect();
    if years.is_empty() {
        return ChartDescription::no_data(TITLE);
    }

    if primary.meta.unit != Unit::Currency {
        log::warn!("multi-axis primary {} is not a currency series", primary.meta.name);
    }

    let x: Vec<f64> = years.iter().map(|&y| y as f64).collect();

    let mut traces = Vec::with_capacity(1 + secondary.len());
    traces.push(
        Trace::new(&primary.meta.name, TraceKind::Bar)
            .with_points(x.clone(), aligned(primary.observations, &years))
            .with_color(primary.meta.color.as_deref()),
    );

    for (i, series) in secondary.iter().enumerate() {
        if series.meta.unit != Unit::Percent {
            log::warn!("multi-axis secondary {} is not a percentage", series.meta.name);
        }
        let mut trace = Trace::new(&series.meta.name, TraceKind::Line)
            .with_points(x.clone(), aligned(series.observations, &years))
            .with_color(series.meta.color.as_deref());
        trace.axis = YAxis::Secondary;
        trace.dashed = i % 2 == 1;
        traces.push(trace);
    }

    ChartDescription {
        title: TITLE.to_string(),
        traces,
        layout: Layout {
            y_title: primary.meta.y_axis.clone(),
            y2_title: Some("Percentage (%)".to_string()),
            y2_range: Some(PERCENT_RANGE),
            height: 500.0,
            bar_width: Some(0.7),
            ..Layout::default()
        },
        no_data: false,
        notice: None,
    }
}

/// Several series of the same unit as lines on one axis, aligned on the
/// union of their years like [`build_multi_axis`].
pub fn build_overlay(title: &str, y_title: &str, series: &[AxisSeries<'_>]) -> ChartDescription {
    let years: BTreeSet<i32> = series
        .iter()
        .flat_map(|s| s.observations.iter().map(|o| o.year))
        .collect();
    if years.is_empty() {
        return ChartDescription::no_data(title);
    }
    let x: Vec<f64> = years.iter().map(|&y| y as f64).collect();

    let traces = series
        .iter()
        .filter(|s| !s.observations.is_empty())
        .map(|s| {
            Trace::new(&s.meta.name, TraceKind::Line)
                .with_points(x.clone(), aligned(s.observations, &years))
                .with_color(s.meta.color.as_deref())
        })
        .collect();

    ChartDescription {
        title: title.to_string(),
        traces,
        layout: Layout {
            y_title: y_title.to_string(),
            ..Layout::default()
        },
        no_data: false,
        notice: None,
    }
}

fn aligned(observations: &[Observation], years: &BTreeSet<i32>) -> Vec<Option<f64>> {
    let by_year: BTreeMap<i32, f64> = observations.iter().map(|o| (o.year, o.value)).collect();
    years.iter().map(|y| by_year.get(y).copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::registry::{Category, IndicatorRegistry};

    fn obs(pairs: &[(i32, f64)]) -> Vec<Observation> {
        pairs.iter().map(|&(y, v)| Observation::new(y, v)).collect()
    }

    #[test]
    fn missing_years_become_gaps_not_zeros() {
        let registry = IndicatorRegistry::pakistan();
        let gdp = registry.get(Category::Gdp).unwrap().meta();
        let edu = registry.get(Category::Education).unwrap().meta();
        let net = registry.get(Category::Health).unwrap().meta();

        let gdp_obs = obs(&[(2000, 7.4e10), (2001, 7.2e10), (2003, 8.3e10)]);
        let edu_obs = obs(&[(2001, 71.0), (2002, 74.5)]);
        let net_obs = obs(&[(2003, 5.0)]);

        let chart = build_multi_axis(
            AxisSeries::new(&gdp, &gdp_obs),
            &[AxisSeries::new(&edu, &edu_obs), AxisSeries::new(&net, &net_obs)],
        );

        assert_eq!(chart.traces.len(), 3);
        for trace in &chart.traces {
            // union of 2000..=2003
            assert_eq!(trace.x, vec![2000.0, 2001.0, 2002.0, 2003.0]);
            assert_eq!(trace.y.len(), 4);
        }
        assert_eq!(chart.traces[0].y[2], None);
        assert_eq!(chart.traces[1].y, vec![None, Some(71.0), Some(74.5), None]);
        assert_eq!(chart.traces[2].y, vec![None, None, None, Some(5.0)]);
        assert_eq!(chart.traces[1].axis, YAxis::Secondary);
        assert_eq!(chart.layout.y2_range, Some([0.0, 100.0]));
    }

    #[test]
    fn overlay_skips_empty_series_and_keeps_gaps() {
        let registry = IndicatorRegistry::pakistan();
        let gdp = registry.get(Category::Gdp).unwrap().meta();
        let energy = registry.get(Category::Energy).unwrap().meta();
        let edu = registry.get(Category::Education).unwrap().meta();

        let a = obs(&[(2020, 1.0), (2022, 3.0)]);
        let b = obs(&[(2021, 2.0)]);
        let chart = build_overlay(
            "Debt",
            "Billion PKR",
            &[AxisSeries::new(&gdp, &a), AxisSeries::new(&energy, &b), AxisSeries::new(&edu, &[])],
        );
        assert_eq!(chart.traces.len(), 2);
        assert_eq!(chart.traces[0].y, vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(chart.traces[1].y, vec![None, Some(2.0), None]);
        assert!(chart.traces.iter().all(|t| t.axis == YAxis::Primary));

        assert!(build_overlay("Debt", "Billion PKR", &[AxisSeries::new(&edu, &[])]).no_data);
    }

    #[test]
    fn all_empty_is_no_data() {
        let registry = IndicatorRegistry::pakistan();
        let gdp = registry.get(Category::Gdp).unwrap().meta();
        let chart = build_multi_axis(AxisSeries::new(&gdp, &[]), &[]);
        assert!(chart.no_data);
    }
}
