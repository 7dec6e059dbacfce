use crate::charts::{self, build_multi_axis, AxisSeries, ChartType};
use crate::dashboard::Dashboard;
use crate::data::registry::Category;
use crate::error::Severity;

use super::{category_chart, category_metric, filtered, no_selection_notice, Filters, Page, PageView, Section};

pub fn render(filters: &Filters, dashboard: &Dashboard) -> PageView {
    let mut view = PageView::new(
        Page::Overview,
        "Pakistan Data Twin Dashboard",
        "Socio-economic indicators at a glance",
        filters.tab,
    );
    view.sections = match view.active_tab {
        0 => dashboard_tab(filters, dashboard),
        _ => explorer_tab(filters, dashboard),
    };
    view
}

fn dashboard_tab(filters: &Filters, dashboard: &Dashboard) -> Vec<Section> {
    let range = filters.year_range;
    let mut sections = vec![Section::heading("Current Metrics Summary")];

    let metrics = dashboard
        .registry()
        .dashboard_indicators()
        .into_iter()
        .map(|c| category_metric(dashboard, c, range, &format!("Latest {}", c.name())))
        .collect();
    sections.push(Section::Metrics(metrics));

    sections.push(Section::Columns(vec![
        (
            1.0,
            vec![category_chart(dashboard, Category::Education, range, ChartType::HorizontalBar)],
        ),
        (
            2.0,
            vec![category_chart(dashboard, Category::Gdp, range, ChartType::Area)],
        ),
        (
            1.0,
            vec![category_chart(dashboard, Category::Health, range, ChartType::Donut)],
        ),
    ]));

    sections.push(Section::heading("Combined Indicator Trend (Multi-Axis)"));
    sections.push(combined_trend(filters, dashboard));
    sections
}

/// GDP bars with education and health on the percentage axis.
fn combined_trend(filters: &Filters, dashboard: &Dashboard) -> Section {
    let range = filters.year_range;
    let gdp = match filtered(dashboard, Category::Gdp, range) {
        Ok(v) => v,
        Err(notice) => return notice,
    };
    let gdp_meta = match dashboard.info(Category::Gdp) {
        Ok(info) => info.meta(),
        Err(e) => return Section::from_error("registry", &e),
    };

    // secondary series are optional; a missing one simply drops out
    let secondary: Vec<_> = [Category::Education, Category::Health]
        .into_iter()
        .filter_map(|c| {
            let meta = dashboard.info(c).ok()?.meta();
            let obs = filtered(dashboard, c, range).ok()?;
            Some((meta, obs))
        })
        .collect();
    let axes: Vec<AxisSeries<'_>> = secondary
        .iter()
        .map(|(meta, obs)| AxisSeries::new(meta, obs))
        .collect();

    let chart = build_multi_axis(AxisSeries::new(&gdp_meta, &gdp), &axes);
    if chart.no_data {
        return no_selection_notice(range);
    }
    Section::Chart(chart)
}

fn explorer_tab(filters: &Filters, dashboard: &Dashboard) -> Vec<Section> {
    let category = filters.indicator;
    let info = match dashboard.info(category) {
        Ok(info) => info,
        Err(e) => return vec![Section::from_error("Indicator Explorer", &e)],
    };
    let meta = info.meta();

    let mut sections = vec![
        Section::heading(format!("Explore: {}", meta.title)),
        Section::Text(info.description.clone()),
    ];

    let view = match filtered(dashboard, category, filters.year_range) {
        Ok(v) => v,
        Err(notice) => {
            sections.push(notice);
            return sections;
        }
    };
    if view.is_empty() {
        sections.push(no_selection_notice(filters.year_range));
        return sections;
    }

    // non-empty, so both ends exist
    let (first, last) = (view[0].year, view[view.len() - 1].year);
    sections.push(Section::notice(
        Severity::Info,
        format!("Data available from {first} to {last} ({} years).", view.len()),
    ));
    sections.push(Section::Metrics(vec![category_metric(
        dashboard,
        category,
        filters.year_range,
        &format!("Latest {}", category.name()),
    )]));
    sections.push(Section::Columns(vec![
        (1.0, vec![Section::Chart(charts::build(&view, &meta, ChartType::Line))]),
        (
            1.0,
            vec![Section::Chart(charts::histogram(
                &view,
                &meta,
                dashboard.config().histogram_bins,
            ))],
        ),
    ]));
    sections.push(Section::Table {
        title: format!("{} by year", meta.title),
        unit: meta.unit,
        rows: view,
    });
    sections
}
