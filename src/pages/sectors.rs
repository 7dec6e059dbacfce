//! Education, Energy and Health: one registry indicator each, shown as
//! headline metrics, charts and a data table.

use crate::charts::{self, ChartType};
use crate::dashboard::Dashboard;
use crate::data::model::Unit;
use crate::data::registry::Category;
use crate::error::Severity;

use super::{category_metric, filtered, no_selection_notice, Filters, Page, PageView, Section};

struct Sector {
    category: Category,
    title: &'static str,
    subtitle: &'static str,
    /// Shown above the charts when the data is a stand-in.
    caveat: Option<&'static str>,
}

fn sector(page: Page) -> Sector {
    match page {
        Page::Education => Sector {
            category: Category::Education,
            title: "Education Sector",
            subtitle: "School enrollment trends",
            caveat: None,
        },
        Page::Energy => Sector {
            category: Category::Energy,
            title: "Energy Sector",
            subtitle: "Energy indicators",
            caveat: Some("No dedicated energy dataset is available yet; GDP is shown as a proxy."),
        },
        _ => Sector {
            category: Category::Health,
            title: "Health & Digital Access",
            subtitle: "Internet penetration as a proxy for access to digital health services",
            caveat: None,
        },
    }
}

pub fn render(filters: &Filters, dashboard: &Dashboard) -> PageView {
    let sector = sector(filters.page);
    let mut view = PageView::new(filters.page, sector.title, sector.subtitle, filters.tab);

    let mut sections = Vec::new();
    if let Some(caveat) = sector.caveat {
        sections.push(Section::notice(Severity::Info, caveat));
    }
    sections.extend(match view.active_tab {
        0 => overview_tab(&sector, filters, dashboard),
        1 => trends_tab(&sector, filters, dashboard),
        _ => data_tab(&sector, filters, dashboard),
    });
    view.sections = sections;
    view
}

fn overview_tab(sector: &Sector, filters: &Filters, dashboard: &Dashboard) -> Vec<Section> {
    let category = sector.category;
    let info = match dashboard.info(category) {
        Ok(info) => info,
        Err(e) => return vec![Section::from_error(sector.title, &e)],
    };
    let meta = info.meta();

    let mut sections = vec![
        Section::Metrics(vec![category_metric(
            dashboard,
            category,
            filters.year_range,
            &format!("Latest {}", info.short_indicator()),
        )]),
        Section::Text(info.description.clone()),
    ];

    let view = match filtered(dashboard, category, filters.year_range) {
        Ok(v) => v,
        Err(notice) => {
            sections.push(notice);
            return sections;
        }
    };

    // the donut only makes sense for shares
    let side = if info.unit == Unit::Percent {
        charts::build(&view, &meta, ChartType::Donut)
    } else {
        charts::build(&view, &meta, ChartType::Bar)
    };
    sections.push(Section::Columns(vec![
        (2.0, vec![Section::Chart(charts::build(&view, &meta, ChartType::Area))]),
        (1.0, vec![Section::Chart(side)]),
    ]));
    sections
}

fn trends_tab(sector: &Sector, filters: &Filters, dashboard: &Dashboard) -> Vec<Section> {
    let category = sector.category;
    let meta = match dashboard.info(category) {
        Ok(info) => info.meta(),
        Err(e) => return vec![Section::from_error(sector.title, &e)],
    };
    let view = match filtered(dashboard, category, filters.year_range) {
        Ok(v) => v,
        Err(notice) => return vec![notice],
    };

    vec![
        Section::Chart(charts::build(&view, &meta, ChartType::Line)),
        Section::Columns(vec![
            (1.0, vec![Section::Chart(charts::build(&view, &meta, ChartType::Bar))]),
            (
                1.0,
                vec![Section::Chart(charts::histogram(
                    &view,
                    &meta,
                    dashboard.config().histogram_bins,
                ))],
            ),
        ]),
    ]
}

fn data_tab(sector: &Sector, filters: &Filters, dashboard: &Dashboard) -> Vec<Section> {
    let category = sector.category;
    let meta = match dashboard.info(category) {
        Ok(info) => info.meta(),
        Err(e) => return vec![Section::from_error(sector.title, &e)],
    };
    match filtered(dashboard, category, filters.year_range) {
        Ok(rows) if rows.is_empty() => vec![no_selection_notice(filters.year_range)],
        Ok(rows) => vec![Section::Table {
            title: meta.title,
            unit: meta.unit,
            rows,
        }],
        Err(notice) => vec![notice],
    }
}
