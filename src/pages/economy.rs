use crate::charts::{self, forecast_chart, AxisSeries, ChartDescription, ChartType, Slice};
use crate::dashboard::Dashboard;
use crate::data::filter::{filter_years, YearRange};
use crate::data::model::{Observation, SeriesMeta, Unit};
use crate::data::registry::{
    Category, LongSeriesSpec, AGRICULTURE_GROWTH, COLOR_ACCENT, COMMODITY_EXPORTS, CPI, DOMESTIC_DEBT, EXPORTS,
    EXTERNAL_DEBT, FOREIGN_INVESTMENT, GDP_SECTORS, GROSS_PUBLIC_DEBT, IMPORT_PAYMENTS, NEER, NET_EXPORT_BALANCE,
    REAL_GDP_GROWTH, REER, REMITTANCES, SERVICES_EXPORT, TOTAL_DEBT,
};
use crate::error::Severity;
use crate::forecast::{ForecastOutcome, ForecastSource};

use super::{category_chart, category_metric, filtered, Filters, Metric, Page, PageView, Section};

pub fn render(filters: &Filters, dashboard: &Dashboard) -> PageView {
    let mut view = PageView::new(
        Page::Economy,
        "Economic Indicators & Forecasting",
        "Trade, investment and GDP outlook for Pakistan",
        filters.tab,
    );
    view.sections = match view.active_tab {
        0 => data_tab(filters, dashboard),
        _ => forecast_tab(filters, dashboard),
    };
    view
}

// ---------------------------------------------------------------------------
// Economic Data tab
// ---------------------------------------------------------------------------

fn data_tab(filters: &Filters, dashboard: &Dashboard) -> Vec<Section> {
    let range = filters.year_range;

    let mut metrics = vec![category_metric(dashboard, Category::Gdp, range, "GDP")];
    metrics.extend(
        [EXPORTS, REMITTANCES, FOREIGN_INVESTMENT, CPI]
            .iter()
            .map(|spec| series_metric(dashboard, spec, range)),
    );

    vec![
        Section::heading("Key Economic Indicators"),
        Section::Metrics(metrics),
        Section::heading("GDP Analysis"),
        Section::Columns(vec![
            (2.0, vec![category_chart(dashboard, Category::Gdp, range, ChartType::Line)]),
            (1.0, vec![growth_chart(dashboard, range)]),
        ]),
        Section::heading("GDP Sectoral Composition"),
        sector_composition(dashboard, range),
        Section::heading("Trade & Exchange"),
        Section::Columns(vec![
            (
                1.0,
                vec![
                    series_chart(dashboard, &EXPORTS, range, ChartType::Area),
                    series_chart(dashboard, &REMITTANCES, range, ChartType::Line),
                ],
            ),
            (
                1.0,
                vec![
                    series_overlay(
                        dashboard,
                        "Exchange Rate Indices (NEER vs REER)",
                        "Index (2010 = 100)",
                        &[NEER, REER],
                        range,
                    ),
                    series_chart(dashboard, &IMPORT_PAYMENTS, range, ChartType::Bar),
                ],
            ),
        ]),
        Section::heading("Government Debt Analysis"),
        series_chart(dashboard, &TOTAL_DEBT, range, ChartType::Line),
        series_overlay(
            dashboard,
            "Government Debt Breakdown",
            "Debt (Billion PKR)",
            &[GROSS_PUBLIC_DEBT, DOMESTIC_DEBT, EXTERNAL_DEBT],
            range,
        ),
        Section::heading("Foreign Investment Analysis"),
        series_chart(dashboard, &FOREIGN_INVESTMENT, range, ChartType::Line),
        Section::heading("Net Export Balance Analysis"),
        series_chart(dashboard, &NET_EXPORT_BALANCE, range, ChartType::Bar),
        Section::heading("Sectoral Analysis"),
        Section::Columns(vec![
            (
                1.0,
                vec![
                    series_chart(dashboard, &AGRICULTURE_GROWTH, range, ChartType::Line),
                    series_chart(dashboard, &SERVICES_EXPORT, range, ChartType::Bar),
                ],
            ),
            (
                1.0,
                vec![
                    series_chart(dashboard, &CPI, range, ChartType::Line),
                    series_chart(dashboard, &COMMODITY_EXPORTS, range, ChartType::Area),
                ],
            ),
        ]),
    ]
}

fn series_metric(dashboard: &Dashboard, spec: &LongSeriesSpec, range: YearRange) -> Metric {
    let kpi = dashboard
        .load_series(spec)
        .map(|s| charts::kpi(&filter_years(&s, range), spec.unit))
        .unwrap_or_else(|e| {
            log::warn!("{}: {e}", spec.label);
            charts::Kpi::unavailable()
        });
    Metric::from_kpi(spec.label, &kpi)
}

fn series_chart(dashboard: &Dashboard, spec: &LongSeriesSpec, range: YearRange, chart_type: ChartType) -> Section {
    match dashboard.load_series(spec) {
        Ok(series) => Section::Chart(charts::build(&filter_years(&series, range), &spec.meta(), chart_type)),
        Err(e) => Section::from_error(spec.label, &e),
    }
}

/// Several series of one unit on a shared axis. Series that fail to load
/// are named in the chart notice; if none loads the section is a notice.
fn series_overlay(
    dashboard: &Dashboard,
    title: &str,
    y_title: &str,
    specs: &[LongSeriesSpec],
    range: YearRange,
) -> Section {
    let mut loaded = Vec::with_capacity(specs.len());
    let mut failed = Vec::new();
    for spec in specs {
        match dashboard.load_series(spec) {
            Ok(series) => loaded.push((spec.meta(), filter_years(&series, range))),
            Err(e) => {
                log::warn!("{}: {e}", spec.label);
                failed.push((spec.label, e));
            }
        }
    }
    if loaded.is_empty() {
        if let Some((_, e)) = failed.first() {
            return Section::from_error(title, e);
        }
    }

    let series: Vec<AxisSeries<'_>> = loaded.iter().map(|(meta, obs)| AxisSeries::new(meta, obs)).collect();
    let mut chart = charts::build_overlay(title, y_title, &series);
    if !failed.is_empty() {
        let names: Vec<&str> = failed.iter().map(|(label, _)| *label).collect();
        chart = chart.with_notice(format!("Unavailable: {}", names.join(", ")));
    }
    Section::Chart(chart)
}

/// Latest-year split of GDP across agriculture, industry and services.
fn sector_composition(dashboard: &Dashboard, range: YearRange) -> Section {
    const TITLE: &str = "GDP Sectoral Composition";

    let mut sectors = Vec::with_capacity(GDP_SECTORS.len());
    for spec in &GDP_SECTORS {
        // all sectors share one file, so one failure means the file is unusable
        match dashboard.load_series(spec) {
            Ok(series) => sectors.push((spec, filter_years(&series, range))),
            Err(e) => return Section::from_error(TITLE, &e),
        }
    }

    let Some(year) = sectors
        .iter()
        .filter_map(|(_, series)| series.last().map(|o| o.year))
        .max()
    else {
        return Section::Chart(ChartDescription::no_data(TITLE));
    };

    let slices: Vec<Slice> = sectors
        .iter()
        .filter_map(|(spec, series)| {
            series.iter().find(|o| o.year == year).map(|o| Slice {
                label: spec.label.to_string(),
                value: o.value,
                color: Some(spec.color.to_string()),
            })
        })
        .collect();
    Section::Chart(charts::composition(&format!("{TITLE} ({year})"), &slices))
}

fn nominal_growth_meta() -> SeriesMeta {
    SeriesMeta {
        name: "Nominal GDP Growth".to_string(),
        title: "Nominal GDP Growth (current US$, Annual %)".to_string(),
        y_axis: "Growth (%)".to_string(),
        unit: Unit::Percent,
        color: Some(COLOR_ACCENT.to_string()),
    }
}

/// Real growth from the national accounts; without them, the change of
/// current-dollar GDP, labelled as nominal.
fn growth_chart(dashboard: &Dashboard, range: YearRange) -> Section {
    let reason = match dashboard.load_series(&REAL_GDP_GROWTH) {
        Ok(series) if !series.is_empty() => {
            return Section::Chart(charts::build(
                &filter_years(&series, range),
                &REAL_GDP_GROWTH.meta(),
                ChartType::Bar,
            ));
        }
        Ok(_) => "no growth rows in the national accounts".to_string(),
        Err(e) => e.to_string(),
    };
    log::warn!("real GDP growth unavailable: {reason}");

    // growth needs the year before the window, so start from the full series
    match dashboard.load(Category::Gdp) {
        Ok(series) => {
            let growth = filter_years(&growth_rates(&series), range);
            let chart = charts::build(&growth, &nominal_growth_meta(), ChartType::Bar)
                .with_notice(format!("Real growth unavailable ({reason}); showing nominal change."));
            Section::Chart(chart)
        }
        Err(e) => Section::from_error("GDP growth", &e),
    }
}

/// Year-over-year change in percent. A year is skipped unless the
/// previous calendar year is present with a non-zero value.
pub fn growth_rates(observations: &[Observation]) -> Vec<Observation> {
    observations
        .windows(2)
        .filter(|w| w[1].year == w[0].year + 1 && w[0].value != 0.0)
        .map(|w| Observation::new(w[1].year, (w[1].value - w[0].value) / w[0].value * 100.0))
        .collect()
}

// ---------------------------------------------------------------------------
// AI Forecasting tab
// ---------------------------------------------------------------------------

fn forecast_tab(filters: &Filters, dashboard: &Dashboard) -> Vec<Section> {
    let config = dashboard.config();
    let mut sections = vec![
        Section::heading("GDP Forecast"),
        Section::Text(format!(
            "A sequence model trained on historical GDP predicts the next {} years. \
             Each prediction is fed back as input for the following year.",
            config.forecast_steps
        )),
    ];

    match dashboard.require(Category::Gdp) {
        Ok(history) => {
            let outcome = dashboard.forecast_gdp(&history);
            sections.push(source_notice(&outcome));

            let shown = match filtered(dashboard, Category::Gdp, filters.year_range) {
                Ok(v) => v,
                Err(notice) => {
                    sections.push(notice);
                    Vec::new()
                }
            };
            sections.push(Section::Chart(forecast_chart(
                &format!("Pakistan GDP Forecast (Next {} Years)", outcome.points.len()),
                "GDP (Billion USD)",
                &shown,
                &outcome.points,
                1e9,
            )));
            sections.push(Section::Metrics(forecast_metrics(history.last().copied(), &outcome)));
            sections.push(Section::notice(
                Severity::Info,
                format!(
                    "The shaded band is the forecast ±{:.0}% and is illustrative, not a statistical interval.",
                    config.band_fraction * 100.0
                ),
            ));
        }
        Err(e) => sections.push(Section::from_error("GDP history", &e)),
    }

    sections.push(Section::heading("Model Performance & Technical Details"));
    sections.push(Section::Columns(vec![
        (
            1.0,
            vec![Section::Text(format!(
                "Model: the artifact in {} (linear window or single-layer recurrent cell). \
                 Inputs are min-max scaled with {} before prediction and mapped back afterwards.",
                config.model_path().display(),
                config.scaler_path().display()
            ))],
        ),
        (
            1.0,
            vec![Section::Text(format!(
                "Method: the last K years of GDP form the window. Each of the {} predictions is \
                 appended to the window and the oldest year dropped, so errors compound with the \
                 horizon. The band is a flat ±{:.0}%.",
                config.forecast_steps,
                config.band_fraction * 100.0
            ))],
        ),
    ]));
    sections.push(Section::notice(
        Severity::Info,
        "Assumes historical patterns continue. Structural breaks and shocks are not modelled.",
    ));

    if !config.saved_charts.is_empty() {
        sections.push(Section::heading("Saved Forecast Charts"));
        for name in &config.saved_charts {
            sections.push(match dashboard.saved_chart(name) {
                Ok(chart) => Section::Chart(chart),
                Err(e) => Section::from_error(&format!("Saved chart '{name}'"), &e),
            });
        }
    }
    sections
}

fn source_notice(outcome: &ForecastOutcome) -> Section {
    match &outcome.source {
        ForecastSource::Live => Section::notice(Severity::Success, "Forecast generated by the trained model."),
        ForecastSource::Fallback { reason } => Section::notice(
            Severity::Warning,
            format!("Model unavailable, showing sample forecast data ({reason})."),
        ),
    }
}

/// Headline numbers for a forecast relative to the last historical value.
pub fn forecast_metrics(last: Option<Observation>, outcome: &ForecastOutcome) -> Vec<Metric> {
    let source = Metric::new(
        "Source",
        if outcome.is_fallback() { "Sample data" } else { "Trained model" },
        None,
    );
    let Some(end) = outcome.points.last() else {
        return vec![source];
    };
    let years = outcome.points.len();
    // without history the first forecast year is the baseline
    let (base_label, base) = match (last, outcome.points.first()) {
        (Some(o), _) => (o.year.to_string(), o.value),
        (None, Some(p)) => (p.year.to_string(), p.value),
        (None, None) => return vec![source],
    };

    let change_pct = (base != 0.0).then(|| (end.value - base) / base * 100.0);
    let avg_growth = cagr(base, end.value, years);

    vec![
        Metric::new(
            format!("{} GDP Forecast", end.year),
            format!("${:.1}B", end.value / 1e9),
            change_pct.map(|c| format!("{c:+.1}% vs {base_label}")),
        ),
        Metric::new(
            "Avg Annual Growth",
            avg_growth.map_or_else(|| "N/A".to_string(), |g| format!("{g:.2}%")),
            None,
        ),
        Metric::new(
            "Total Growth",
            format!("${:+.1}B", (end.value - base) / 1e9),
            Some(format!("over {years} years")),
        ),
        source,
    ]
}

/// Compound annual growth rate in percent.
fn cagr(start: f64, end: f64, years: usize) -> Option<f64> {
    (start > 0.0 && end > 0.0 && years > 0).then(|| ((end / start).powf(1.0 / years as f64) - 1.0) * 100.0)
}
