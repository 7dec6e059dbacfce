use crate::data::model::{Observation, SeriesMeta, Unit};
use crate::forecast::ForecastPoint;

use super::{ChartDescription, ChartType, Layout, Trace, TraceKind, DEFAULT_HISTOGRAM_BINS};

const DONUT_PALETTE: [&str; 2] = ["#ff9800", "#cccccc"];
const DONUT_HOLE: f64 = 0.4;
const HISTORY_COLOR: &str = "#1f77b4";
const FORECAST_COLOR: &str = "#d62728";

/// Build a single-series chart. Histograms use [`DEFAULT_HISTOGRAM_BINS`].
///
/// Empty input never fails: every chart type answers with a "no data"
/// description.
pub fn build(observations: &[Observation], meta: &SeriesMeta, chart_type: ChartType) -> ChartDescription {
    build_with_bins(observations, meta, chart_type, DEFAULT_HISTOGRAM_BINS)
}

/// [`build`] with an explicit histogram bin count.
pub fn build_with_bins(
    observations: &[Observation],
    meta: &SeriesMeta,
    chart_type: ChartType,
    bins: usize,
) -> ChartDescription {
    if observations.is_empty() {
        return ChartDescription::no_data(&meta.title);
    }

    let mut sorted = observations.to_vec();
    sorted.sort_by_key(|o| o.year);

    match chart_type {
        ChartType::Area => xy_chart(&sorted, meta, TraceKind::Area),
        ChartType::Line => xy_chart(&sorted, meta, TraceKind::Line),
        ChartType::Bar => xy_chart(&sorted, meta, TraceKind::Bar),
        ChartType::HorizontalBar => {
            let mut chart = xy_chart(&sorted, meta, TraceKind::HorizontalBar);
            // years run down the vertical axis
            chart.layout.x_title = meta.y_axis.clone();
            chart.layout.y_title = "Year".to_string();
            chart
        }
        ChartType::Donut => donut(&sorted, meta),
        ChartType::Histogram => histogram(&sorted, meta, bins),
    }
}

fn xy_chart(sorted: &[Observation], meta: &SeriesMeta, kind: TraceKind) -> ChartDescription {
    let x = sorted.iter().map(|o| o.year as f64).collect();
    let y = sorted.iter().map(|o| Some(o.value)).collect();
    let trace = Trace::new(&meta.name, kind)
        .with_points(x, y)
        .with_color(meta.color.as_deref());

    ChartDescription {
        title: meta.title.clone(),
        traces: vec![trace],
        layout: Layout {
            y_title: meta.y_axis.clone(),
            bar_width: matches!(kind, TraceKind::Bar | TraceKind::HorizontalBar).then_some(0.9),
            ..Layout::default()
        },
        no_data: false,
        notice: None,
    }
}

/// Split of the latest value against 100.
///
/// The shown share is clamped to `[0, 100]` so the two slices always add up
/// to exactly 100 and the remainder is never negative.
pub fn donut_slices(value: f64) -> (f64, f64) {
    let shown = value.clamp(0.0, 100.0);
    (shown, 100.0 - shown)
}

fn donut(sorted: &[Observation], meta: &SeriesMeta) -> ChartDescription {
    if meta.unit != Unit::Percent {
        log::warn!("donut requested for non-percentage series {}", meta.name);
        return ChartDescription::no_data(&meta.title)
            .with_notice("Donut charts are only available for percentage indicators.");
    }
    let Some(latest) = sorted.last() else {
        return ChartDescription::no_data(&meta.title);
    };

    let (shown, remainder) = donut_slices(latest.value);
    let mut trace = Trace::new(&meta.name, TraceKind::Donut)
        .with_points(vec![0.0, 1.0], vec![Some(shown), Some(remainder)]);
    trace.labels = vec![
        format!("{} ({})", meta.title, latest.year),
        "Remainder".to_string(),
    ];
    trace.palette = DONUT_PALETTE.iter().map(|c| c.to_string()).collect();

    ChartDescription {
        title: format!("{} Distribution ({})", meta.title, latest.year),
        traces: vec![trace],
        layout: Layout {
            x_title: String::new(),
            height: 450.0,
            hole: Some(DONUT_HOLE),
            ..Layout::default()
        },
        no_data: false,
        notice: None,
    }
}

/// One slice of a [`composition`] donut.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub color: Option<String>,
}

/// Shares of a whole, e.g. GDP by sector. Slices that are not positive are
/// dropped; nothing left means "no data".
pub fn composition(title: &str, slices: &[Slice]) -> ChartDescription {
    let shown: Vec<&Slice> = slices
        .iter()
        .filter(|s| s.value.is_finite() && s.value > 0.0)
        .collect();
    if shown.is_empty() {
        return ChartDescription::no_data(title);
    }

    let mut trace = Trace::new(title, TraceKind::Donut).with_points(
        (0..shown.len()).map(|i| i as f64).collect(),
        shown.iter().map(|s| Some(s.value)).collect(),
    );
    trace.labels = shown.iter().map(|s| s.label.clone()).collect();
    trace.palette = shown
        .iter()
        .map(|s| s.color.clone().unwrap_or_default())
        .collect();

    ChartDescription {
        title: title.to_string(),
        traces: vec![trace],
        layout: Layout {
            x_title: String::new(),
            height: 450.0,
            hole: Some(DONUT_HOLE),
            ..Layout::default()
        },
        no_data: false,
        notice: None,
    }
}

/// Equal-width histogram of the values (years ignored), y in percent of
/// the total count. The last bin is closed so the maximum is counted.
pub fn histogram(observations: &[Observation], meta: &SeriesMeta, bins: usize) -> ChartDescription {
    if observations.is_empty() || bins == 0 {
        return ChartDescription::no_data(&meta.title);
    }

    let min = observations.iter().map(|o| o.value).fold(f64::INFINITY, f64::min);
    let max = observations
        .iter()
        .map(|o| o.value)
        .fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    // A constant series collapses into one unit-wide bin.
    let (bins, width) = if range.abs() < f64::EPSILON {
        (1, 1.0)
    } else {
        (bins, range / bins as f64)
    };
    let start = if bins == 1 && range.abs() < f64::EPSILON {
        min - 0.5
    } else {
        min
    };

    let mut counts = vec![0usize; bins];
    for o in observations {
        let idx = ((o.value - start) / width).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    let total = observations.len() as f64;
    let x = (0..bins).map(|i| start + width * (i as f64 + 0.5)).collect();
    let y = counts
        .iter()
        .map(|&c| Some(c as f64 * 100.0 / total))
        .collect();

    let trace = Trace::new(&meta.name, TraceKind::Histogram)
        .with_points(x, y)
        .with_color(meta.color.as_deref());

    ChartDescription {
        title: format!("{} Distribution", meta.title),
        traces: vec![trace],
        layout: Layout {
            x_title: meta.y_axis.clone(),
            y_title: "Percent".to_string(),
            bar_width: Some(width),
            ..Layout::default()
        },
        no_data: false,
        notice: None,
    }
}

/// Historical series, the forecast and its band on one chart.
///
/// `divisor` rescales both inputs for display (1e9 for billions).
pub fn forecast_chart(
    title: &str,
    y_title: &str,
    history: &[Observation],
    forecast: &[ForecastPoint],
    divisor: f64,
) -> ChartDescription {
    if history.is_empty() && forecast.is_empty() {
        return ChartDescription::no_data(title);
    }

    let mut traces = Vec::with_capacity(3);

    if !history.is_empty() {
        traces.push(
            Trace::new("Historical", TraceKind::Line)
                .with_points(
                    history.iter().map(|o| o.year as f64).collect(),
                    history.iter().map(|o| Some(o.value / divisor)).collect(),
                )
                .with_color(Some(HISTORY_COLOR)),
        );
    }

    if !forecast.is_empty() {
        let years: Vec<f64> = forecast.iter().map(|p| p.year as f64).collect();

        let mut line = Trace::new("Forecast", TraceKind::Line)
            .with_points(
                years.clone(),
                forecast.iter().map(|p| Some(p.value / divisor)).collect(),
            )
            .with_color(Some(FORECAST_COLOR));
        line.dashed = true;
        traces.push(line);

        let mut band = Trace::new("Confidence Interval", TraceKind::Band)
            .with_points(
                years,
                forecast.iter().map(|p| Some(p.upper / divisor)).collect(),
            )
            .with_color(Some(FORECAST_COLOR));
        band.y_lower = Some(forecast.iter().map(|p| p.lower / divisor).collect());
        traces.push(band);
    }

    // the history may be a filtered window, so the forecast decides
    let marker = match forecast.first() {
        Some(first) => Some(first.year as f64 - 0.5),
        None => history.iter().map(|o| o.year).max().map(|y| y as f64 + 0.5),
    };

    ChartDescription {
        title: title.to_string(),
        traces,
        layout: Layout {
            y_title: y_title.to_string(),
            height: 500.0,
            vertical_marker: marker,
            ..Layout::default()
        },
        no_data: false,
        notice: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::registry::{Category, IndicatorRegistry};

    fn meta(category: Category) -> SeriesMeta {
        IndicatorRegistry::pakistan().get(category).unwrap().meta()
    }

    fn obs(pairs: &[(i32, f64)]) -> Vec<Observation> {
        pairs.iter().map(|&(y, v)| Observation::new(y, v)).collect()
    }

    #[test]
    fn empty_input_is_no_data_for_every_type() {
        for ct in ChartType::ALL {
            for category in [Category::Gdp, Category::Health] {
                let chart = build(&[], &meta(category), ct);
                assert!(chart.no_data, "{ct} for {category}");
                assert!(chart.traces.is_empty());
            }
        }
    }

    #[test]
    fn line_points_are_sorted_by_year() {
        let chart = build(
            &obs(&[(2003, 3.0), (2001, 1.0), (2002, 2.0)]),
            &meta(Category::Gdp),
            ChartType::Line,
        );
        let trace = &chart.traces[0];
        assert_eq!(trace.kind, TraceKind::Line);
        assert_eq!(trace.x, vec![2001.0, 2002.0, 2003.0]);
        assert_eq!(trace.y, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn area_and_bar_keep_every_point() {
        let data = obs(&[(2000, 5.0), (2001, 6.0)]);
        let area = build(&data, &meta(Category::Gdp), ChartType::Area);
        let bar = build(&data, &meta(Category::Gdp), ChartType::Bar);
        assert_eq!(area.traces[0].kind, TraceKind::Area);
        assert_eq!(bar.traces[0].kind, TraceKind::Bar);
        assert_eq!(area.traces[0].points(), bar.traces[0].points());
    }

    #[test]
    fn donut_uses_latest_year() {
        let chart = build(
            &obs(&[(2019, 17.0), (2021, 21.0), (2020, 19.0)]),
            &meta(Category::Health),
            ChartType::Donut,
        );
        let trace = &chart.traces[0];
        assert_eq!(trace.y, vec![Some(21.0), Some(79.0)]);
        assert!(trace.labels[0].contains("2021"));
        assert_eq!(chart.layout.hole, Some(DONUT_HOLE));
    }

    #[test]
    fn donut_slices_always_sum_to_hundred() {
        for v in [0.0, 12.5, 64.2, 99.99, 100.0, 104.6, 250.0, -3.0] {
            let (a, b) = donut_slices(v);
            assert_eq!(a + b, 100.0, "v = {v}");
            assert!(b >= 0.0 && a >= 0.0, "v = {v}");
        }
        assert_eq!(donut_slices(104.6), (100.0, 0.0));
    }

    #[test]
    fn donut_refuses_currency_series() {
        let chart = build(&obs(&[(2020, 3.0e11)]), &meta(Category::Gdp), ChartType::Donut);
        assert!(chart.no_data);
        assert!(chart.notice.is_some());
    }

    #[test]
    fn histogram_reports_percent_per_bin() {
        let data: Vec<Observation> = (0..10).map(|i| Observation::new(2000 + i, i as f64)).collect();
        let chart = histogram(&data, &meta(Category::Education), 5);
        let trace = &chart.traces[0];
        assert_eq!(trace.x.len(), 5);
        let total: f64 = trace.y.iter().flatten().sum();
        assert!((total - 100.0).abs() < 1e-9);
        // the maximum lands in the last, closed bin
        assert_eq!(trace.y[4], Some(20.0));
        assert_eq!(chart.layout.bar_width, Some(9.0 / 5.0));
    }

    #[test]
    fn histogram_of_constant_series_has_one_bin() {
        let data = obs(&[(2000, 7.0), (2001, 7.0)]);
        let chart = build(&data, &meta(Category::Education), ChartType::Histogram);
        let trace = &chart.traces[0];
        assert_eq!(trace.x, vec![7.0]);
        assert_eq!(trace.y, vec![Some(100.0)]);
    }

    #[test]
    fn explicit_bin_count_is_honoured() {
        let data: Vec<Observation> = (0..40).map(|i| Observation::new(1980 + i, i as f64)).collect();
        let chart = build_with_bins(&data, &meta(Category::Gdp), ChartType::Histogram, 8);
        assert_eq!(chart.traces[0].x.len(), 8);
        // other chart types ignore the bin count
        let line = build_with_bins(&data, &meta(Category::Gdp), ChartType::Line, 8);
        assert_eq!(line.traces[0].x.len(), 40);
    }

    #[test]
    fn composition_drops_empty_slices() {
        let slice = |label: &str, value: f64| Slice {
            label: label.to_string(),
            value,
            color: Some("#4a90e2".to_string()),
        };
        let chart = composition(
            "GDP by sector",
            &[slice("Agriculture", 24.0), slice("Industry", 0.0), slice("Services", 58.0)],
        );
        let trace = &chart.traces[0];
        assert_eq!(trace.labels, vec!["Agriculture", "Services"]);
        assert_eq!(trace.y, vec![Some(24.0), Some(58.0)]);
        assert_eq!(trace.palette.len(), 2);

        assert!(composition("GDP by sector", &[slice("Industry", -1.0)]).no_data);
    }

    #[test]
    fn default_histogram_has_twenty_bins() {
        let data: Vec<Observation> = (0..40).map(|i| Observation::new(1980 + i, (i * i) as f64)).collect();
        let chart = build(&data, &meta(Category::Gdp), ChartType::Histogram);
        assert_eq!(chart.traces[0].x.len(), DEFAULT_HISTOGRAM_BINS);
    }

    #[test]
    fn forecast_chart_marks_the_boundary() {
        let history = obs(&[(2024, 3.0e11), (2025, 3.5e11)]);
        let forecast = vec![ForecastPoint {
            year: 2026,
            value: 4.0e11,
            lower: 3.8e11,
            upper: 4.2e11,
        }];
        let chart = forecast_chart("GDP", "Billion USD", &history, &forecast, 1e9);
        assert_eq!(chart.traces.len(), 3);
        assert_eq!(chart.layout.vertical_marker, Some(2025.5));
        assert_eq!(chart.traces[1].y, vec![Some(400.0)]);
        assert!(chart.traces[1].dashed);
        assert_eq!(chart.traces[2].y_lower, Some(vec![380.0]));
    }

    #[test]
    fn forecast_marker_ignores_a_trimmed_history() {
        let shown = obs(&[(2000, 1.0e11), (2001, 1.1e11)]);
        let forecast = vec![ForecastPoint {
            year: 2004,
            value: 1.4e11,
            lower: 1.3e11,
            upper: 1.5e11,
        }];
        let chart = forecast_chart("GDP", "Billion USD", &shown, &forecast, 1e9);
        assert_eq!(chart.layout.vertical_marker, Some(2003.5));

        let history_only = forecast_chart("GDP", "Billion USD", &shown, &[], 1e9);
        assert_eq!(history_only.layout.vertical_marker, Some(2001.5));
    }
}
