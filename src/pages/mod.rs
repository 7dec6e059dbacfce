//! Page renderer.
//!
//! `render` is a pure function from the current [`Filters`] and the
//! [`Dashboard`] to a [`PageView`] render tree. The UI host calls it after
//! every filter change and draws the result; nothing here touches egui.
//! Each section fails on its own: a missing file turns into a notice while
//! the rest of the page still renders.

use std::fmt;

use crate::charts::{self, ChartDescription, ChartType, Kpi};
use crate::dashboard::Dashboard;
use crate::data::filter::{filter_years, year_bounds as series_bounds, YearRange};
use crate::data::model::{Observation, Unit};
use crate::data::registry::Category;
use crate::error::{DashboardError, Severity};

pub mod economy;
pub mod overview;
pub mod sectors;

// ---------------------------------------------------------------------------
// Navigation and filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Overview,
    Economy,
    Education,
    Energy,
    Health,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Overview,
        Page::Economy,
        Page::Education,
        Page::Energy,
        Page::Health,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Page::Overview => "OVERVIEW",
            Page::Economy => "ECONOMY",
            Page::Education => "EDUCATION",
            Page::Energy => "ENERGY",
            Page::Health => "HEALTH",
        }
    }

    /// Categories whose years drive the slider on this page.
    pub fn categories(self) -> &'static [Category] {
        match self {
            Page::Overview => &[Category::Gdp, Category::Education, Category::Health],
            Page::Economy => &[Category::Gdp],
            Page::Education => &[Category::Education],
            Page::Energy => &[Category::Energy],
            Page::Health => &[Category::Health],
        }
    }

    pub fn tabs(self) -> &'static [&'static str] {
        match self {
            Page::Overview => &["Dashboard", "Indicator Explorer"],
            Page::Economy => &["Economic Data", "AI Forecasting"],
            Page::Education | Page::Energy | Page::Health => &["Overview", "Trends", "Data"],
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the user can change. A new value means a new render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filters {
    pub page: Page,
    pub year_range: YearRange,
    /// Indicator picked in the explorer drop-down.
    pub indicator: Category,
    pub tab: usize,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: Page::Overview,
            year_range: YearRange::everything(),
            indicator: Category::Gdp,
            tab: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Render tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: String,
    pub value: String,
    pub delta: Option<String>,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl Into<String>, delta: Option<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            delta,
        }
    }

    pub fn from_kpi(label: impl Into<String>, kpi: &Kpi) -> Self {
        Self::new(label, kpi.value.clone(), Some(kpi.delta_text()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Heading(String),
    Text(String),
    Metrics(Vec<Metric>),
    Chart(ChartDescription),
    Notice { severity: Severity, text: String },
    Table {
        title: String,
        unit: Unit,
        rows: Vec<Observation>,
    },
    /// Side-by-side groups with relative widths.
    Columns(Vec<(f32, Vec<Section>)>),
}

impl Section {
    pub fn heading(text: impl Into<String>) -> Self {
        Section::Heading(text.into())
    }

    pub fn notice(severity: Severity, text: impl Into<String>) -> Self {
        Section::Notice {
            severity,
            text: text.into(),
        }
    }

    pub fn from_error(context: &str, err: &DashboardError) -> Self {
        log::warn!("{context}: {err}");
        Section::notice(err.severity(), format!("{context}: {err}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub title: String,
    pub subtitle: String,
    pub tabs: Vec<String>,
    pub active_tab: usize,
    /// Sections of the active tab only.
    pub sections: Vec<Section>,
    pub footer: String,
}

impl PageView {
    fn new(page: Page, title: &str, subtitle: &str, active_tab: usize) -> Self {
        let tabs: Vec<String> = page.tabs().iter().map(|t| t.to_string()).collect();
        let active_tab = active_tab.min(tabs.len().saturating_sub(1));
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            tabs,
            active_tab,
            sections: Vec::new(),
            footer: format!("{} | Pakistan Data Twin Dashboard", page_footer(page)),
        }
    }

    /// Every chart in the view, including those nested in columns.
    pub fn charts(&self) -> Vec<&ChartDescription> {
        fn walk<'a>(sections: &'a [Section], out: &mut Vec<&'a ChartDescription>) {
            for s in sections {
                match s {
                    Section::Chart(c) => out.push(c),
                    Section::Columns(cols) => {
                        for (_, inner) in cols {
                            walk(inner, out);
                        }
                    }
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.sections, &mut out);
        out
    }

    /// Every notice in the view, including those nested in columns.
    pub fn notices(&self) -> Vec<(Severity, &str)> {
        fn walk<'a>(sections: &'a [Section], out: &mut Vec<(Severity, &'a str)>) {
            for s in sections {
                match s {
                    Section::Notice { severity, text } => out.push((*severity, text.as_str())),
                    Section::Columns(cols) => {
                        for (_, inner) in cols {
                            walk(inner, out);
                        }
                    }
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.sections, &mut out);
        out
    }
}

fn page_footer(page: Page) -> &'static str {
    match page {
        Page::Overview => "Socio-economic overview",
        Page::Economy => "Economic data analysis and AI forecasting",
        Page::Education => "Education sector analysis",
        Page::Energy => "Energy sector analysis",
        Page::Health => "Health sector analysis",
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

pub fn render(filters: &Filters, dashboard: &Dashboard) -> PageView {
    log::debug!("rendering {:?}", filters);
    match filters.page {
        Page::Overview => overview::render(filters, dashboard),
        Page::Economy => economy::render(filters, dashboard),
        Page::Education | Page::Energy | Page::Health => sectors::render(filters, dashboard),
    }
}

/// Slider limits for a page: the span of every series it shows that could
/// be loaded.
pub fn year_bounds(page: Page, dashboard: &Dashboard) -> Option<YearRange> {
    let loaded: Vec<_> = page
        .categories()
        .iter()
        .filter_map(|c| dashboard.load(*c).ok())
        .collect();
    series_bounds(loaded.iter().map(|s| s.as_slice()))
}

// ---------------------------------------------------------------------------
// Shared helpers for the page modules
// ---------------------------------------------------------------------------

/// Filtered view of a category, or the notice explaining why there is none.
pub(crate) fn filtered(
    dashboard: &Dashboard,
    category: Category,
    range: YearRange,
) -> Result<Vec<Observation>, Section> {
    dashboard
        .load(category)
        .map(|series| filter_years(&series, range))
        .map_err(|e| Section::from_error(&format!("{category} data"), &e))
}

/// Load, filter and chart one category. Empty selections come back as a
/// "no data" chart, load failures as a notice.
pub(crate) fn category_chart(
    dashboard: &Dashboard,
    category: Category,
    range: YearRange,
    chart_type: ChartType,
) -> Section {
    let meta = match dashboard.info(category) {
        Ok(info) => info.meta(),
        Err(e) => return Section::from_error("registry", &e),
    };
    match filtered(dashboard, category, range) {
        Ok(view) => Section::Chart(charts::build_with_bins(
            &view,
            &meta,
            chart_type,
            dashboard.config().histogram_bins,
        )),
        Err(notice) => notice,
    }
}

/// KPI metric for a category; unavailable data shows as N/A.
pub(crate) fn category_metric(
    dashboard: &Dashboard,
    category: Category,
    range: YearRange,
    label: &str,
) -> Metric {
    let kpi = match (dashboard.info(category), filtered(dashboard, category, range)) {
        (Ok(info), Ok(view)) => charts::kpi(&view, info.unit),
        _ => Kpi::unavailable(),
    };
    Metric::from_kpi(label, &kpi)
}

pub(crate) fn no_selection_notice(range: YearRange) -> Section {
    Section::notice(
        Severity::Info,
        format!(
            "No data available for the selected years ({}–{}).",
            range.min, range.max
        ),
    )
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::charts::TraceKind;
    use crate::config::DashboardConfig;

    const HEADER: &str = "Country Name,Country Code,Indicator Name,Indicator Code,1999,2000,2001,2002,2003";

    fn write_wide(dir: &Path, file: &str, indicator: &str, values: &str) {
        let body = format!("{HEADER}\nPakistan,PAK,{indicator},X.Y,{values}\n");
        fs::write(dir.join(file), body).unwrap();
    }

    /// GDP and education present, health missing, no model artifacts.
    fn dashboard(root: &Path) -> Dashboard {
        write_wide(root, "Pakistan_GDP.csv", "GDP (current US$)", "1,100e9,110e9,121e9,133.1e9");
        write_wide(
            root,
            "Pakistan_School_Enrollment.csv",
            "School enrollment, primary (% gross)",
            "1,70,72,,75",
        );
        let config = DashboardConfig {
            data_dir: root.to_path_buf(),
            models_dir: root.join("models"),
            plots_dir: root.join("saved_plots"),
            ..DashboardConfig::default()
        };
        Dashboard::with_config(config)
    }

    #[test]
    fn overview_survives_a_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(dir.path());
        let view = render(&Filters::default(), &dash);

        assert_eq!(view.tabs, vec!["Dashboard", "Indicator Explorer"]);
        let notices = view.notices();
        assert!(notices
            .iter()
            .any(|(s, t)| *s == Severity::Warning && t.contains("Health")));

        let charts = view.charts();
        assert!(charts.iter().any(|c| c.traces.first().map(|t| t.kind) == Some(TraceKind::Area)));
        // multi-axis still drawn with education alone on the secondary axis
        let combined = charts.iter().find(|c| c.has_secondary_axis()).unwrap();
        assert_eq!(combined.traces.len(), 2);
        // education 2002 is blank
        assert_eq!(combined.traces[1].y[2], None);
    }

    #[test]
    fn year_range_filters_every_chart() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(dir.path());
        let filters = Filters {
            page: Page::Education,
            tab: 1,
            year_range: YearRange::new(2001, 2003),
            ..Filters::default()
        };
        let view = render(&filters, &dash);
        for chart in view.charts() {
            for trace in &chart.traces {
                if trace.kind != TraceKind::Histogram {
                    assert!(trace.x.iter().all(|&x| (2001.0..=2003.0).contains(&x)));
                }
            }
        }
    }

    #[test]
    fn empty_selection_yields_no_data_charts() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(dir.path());
        let filters = Filters {
            page: Page::Energy,
            tab: 1,
            year_range: YearRange::new(1950, 1960),
            ..Filters::default()
        };
        let view = render(&filters, &dash);
        assert!(!view.charts().is_empty());
        assert!(view.charts().iter().all(|c| c.no_data));
    }

    #[test]
    fn forecast_tab_flags_the_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(dir.path());
        let filters = Filters {
            page: Page::Economy,
            tab: 1,
            ..Filters::default()
        };
        let view = render(&filters, &dash);

        let notices = view.notices();
        assert!(notices.iter().any(|(s, t)| *s == Severity::Warning && t.contains("sample")));
        let forecast = view
            .charts()
            .into_iter()
            .find(|c| c.traces.iter().any(|t| t.kind == TraceKind::Band))
            .unwrap();
        // history ends 2003, forecast starts 2004
        let line = forecast.traces.iter().find(|t| t.name == "Forecast").unwrap();
        assert_eq!(line.x[0], 2004.0);
        assert_eq!(forecast.layout.vertical_marker, Some(2003.5));
        // the saved payload is missing and reported, not fatal
        assert!(notices.iter().any(|(_, t)| t.contains("export_forecast")));
    }

    #[test]
    fn forecast_marker_stays_at_forecast_start_when_years_are_narrowed() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(dir.path());
        let filters = Filters {
            page: Page::Economy,
            tab: 1,
            year_range: YearRange::new(2000, 2001),
            ..Filters::default()
        };
        let view = render(&filters, &dash);
        let forecast = view
            .charts()
            .into_iter()
            .find(|c| c.traces.iter().any(|t| t.kind == TraceKind::Band))
            .unwrap();

        let history = forecast.traces.iter().find(|t| t.name == "Historical").unwrap();
        assert_eq!(history.x, vec![2000.0, 2001.0]);
        let line = forecast.traces.iter().find(|t| t.name == "Forecast").unwrap();
        assert_eq!(line.x[0], 2004.0);
        assert_eq!(forecast.layout.vertical_marker, Some(2003.5));
    }

    #[test]
    fn economy_sections_read_stacked_sources() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(dir.path());
        let economy = dir.path().join("Economy");
        fs::create_dir_all(&economy).unwrap();
        fs::write(
            economy.join("Pakistan_GDP_2000-2025.csv"),
            "\
Observation Date,Series name,Observation Value
2002-06-30,Growth Rate of Real Gross Domestic Product,3.1
2003-06-30,Growth Rate of Real Gross Domestic Product,4.7
2003-06-30,Agricultural Sector,25
2003-06-30,Industrial Sector,20
2003-06-30,Services Sector,55
2003-06-30,Commodity Producing Sector (a+b),45
",
        )
        .unwrap();
        fs::write(
            economy.join("Pakistan_Debt_and_Liabilities.csv"),
            "\
Date,Series_Name,Value
2002-06-30,Gross Public Debt (sum I to III),3000
2002-06-30,Government Domestic Debt,1800
2003-06-30,Government Domestic Debt,2000
",
        )
        .unwrap();

        let view = render(&Filters { page: Page::Economy, ..Filters::default() }, &dash);
        let charts = view.charts();

        let growth = charts.iter().find(|c| c.title == "Real GDP Growth Rate").unwrap();
        assert_eq!(growth.traces[0].y, vec![Some(3.1), Some(4.7)]);
        assert!(charts.iter().all(|c| !c.title.starts_with("Nominal GDP Growth")));

        let sectors = charts
            .iter()
            .find(|c| c.title == "GDP Sectoral Composition (2003)")
            .unwrap();
        assert_eq!(sectors.traces[0].labels, vec!["Agriculture", "Industry", "Services"]);
        assert_eq!(sectors.traces[0].y, vec![Some(25.0), Some(20.0), Some(55.0)]);

        let debt = charts.iter().find(|c| c.title == "Government Debt Breakdown").unwrap();
        // external debt has no rows: an empty series, not a failure
        assert_eq!(debt.traces.len(), 2);
        assert_eq!(debt.traces[1].y, vec![Some(1800.0), Some(2000.0)]);
        assert_eq!(debt.notice, None);

        // sources still missing are reported without hiding the rest
        let notices = view.notices();
        assert!(notices.iter().any(|(_, t)| t.contains("Exchange Rate Indices")));
        assert!(notices.iter().any(|(_, t)| t.contains("Net Export Balance")));
    }

    #[test]
    fn growth_falls_back_to_nominal_without_national_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(dir.path());
        let view = render(&Filters { page: Page::Economy, ..Filters::default() }, &dash);
        let growth = view
            .charts()
            .into_iter()
            .find(|c| c.title.starts_with("Nominal GDP Growth"))
            .unwrap();
        assert!(growth.notice.as_deref().unwrap().contains("nominal"));
        // 2001..=2003 against the previous year
        assert_eq!(growth.traces[0].x, vec![2001.0, 2002.0, 2003.0]);
    }

    #[test]
    fn configured_bin_count_reaches_page_histograms() {
        let dir = tempfile::tempdir().unwrap();
        write_wide(dir.path(), "Pakistan_GDP.csv", "GDP (current US$)", "1,100e9,110e9,121e9,133.1e9");
        let config = DashboardConfig {
            data_dir: dir.path().to_path_buf(),
            histogram_bins: 3,
            ..DashboardConfig::default()
        };
        let dash = Dashboard::with_config(config);
        let filters = Filters {
            page: Page::Energy,
            tab: 1,
            ..Filters::default()
        };
        let view = render(&filters, &dash);
        let hist = view
            .charts()
            .into_iter()
            .find(|c| c.traces.first().map(|t| t.kind) == Some(TraceKind::Histogram))
            .unwrap();
        assert_eq!(hist.traces[0].x.len(), 3);
    }

    #[test]
    fn out_of_range_tab_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(dir.path());
        let filters = Filters {
            page: Page::Overview,
            tab: 9,
            ..Filters::default()
        };
        assert_eq!(render(&filters, &dash).active_tab, 1);
    }

    #[test]
    fn slider_bounds_cover_loaded_series() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(dir.path());
        assert_eq!(
            year_bounds(Page::Overview, &dash),
            Some(YearRange::new(2000, 2003))
        );
        assert_eq!(year_bounds(Page::Health, &dash), None);
    }
}
