use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::charts::kpi::format_value;
use crate::data::model::{Observation, Unit};
use crate::error::Severity;
use crate::pages::{Metric, PageView, Section};
use crate::state::AppState;

use super::plot;

// ---------------------------------------------------------------------------
// Central panel – the current page
// ---------------------------------------------------------------------------

pub fn page(ui: &mut Ui, state: &mut AppState) {
    let view = &state.view;
    ui.heading(RichText::new(&view.title).strong());
    ui.label(RichText::new(&view.subtitle).color(Color32::GRAY));
    ui.add_space(4.0);

    if let Some(tab) = tab_bar(ui, view) {
        state.set_tab(tab);
    }
    ui.separator();

    let view = &state.view;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            sections(ui, "page", &view.sections);
            ui.add_space(12.0);
            ui.separator();
            ui.vertical_centered(|ui: &mut Ui| {
                ui.small(&view.footer);
            });
        });
}

/// Returns the newly clicked tab, if any.
fn tab_bar(ui: &mut Ui, view: &PageView) -> Option<usize> {
    let mut clicked = None;
    ui.horizontal(|ui: &mut Ui| {
        for (i, label) in view.tabs.iter().enumerate() {
            if ui
                .selectable_label(i == view.active_tab, RichText::new(label).strong())
                .clicked()
            {
                clicked = Some(i);
            }
        }
    });
    clicked
}

fn sections(ui: &mut Ui, id: &str, sections: &[Section]) {
    for (i, section) in sections.iter().enumerate() {
        let id = format!("{id}/{i}");
        match section {
            Section::Heading(text) => {
                ui.add_space(8.0);
                ui.heading(text);
            }
            Section::Text(text) => {
                ui.label(text);
            }
            Section::Metrics(metrics) => metric_row(ui, metrics),
            Section::Chart(chart) => plot::chart(ui, &id, chart),
            Section::Notice { severity, text } => notice(ui, *severity, text),
            Section::Table { title, unit, rows } => table(ui, &id, title, *unit, rows),
            Section::Columns(columns) => column_row(ui, &id, columns),
        }
        ui.add_space(6.0);
    }
}

fn column_row(ui: &mut Ui, id: &str, columns: &[(f32, Vec<Section>)]) {
    let total: f32 = columns.iter().map(|(w, _)| w.max(0.0)).sum();
    if columns.is_empty() || total <= 0.0 {
        return;
    }
    let spacing = ui.spacing().item_spacing.x;
    let usable = ui.available_width() - spacing * (columns.len() as f32 - 1.0);

    ui.horizontal_top(|ui: &mut Ui| {
        for (i, (weight, inner)) in columns.iter().enumerate() {
            let width = usable * weight.max(0.0) / total;
            ui.allocate_ui(egui::vec2(width, ui.available_height()), |ui: &mut Ui| {
                ui.set_width(width);
                ui.vertical(|ui: &mut Ui| sections(ui, &format!("{id}/c{i}"), inner));
            });
        }
    });
}

fn metric_row(ui: &mut Ui, metrics: &[Metric]) {
    if metrics.is_empty() {
        return;
    }
    ui.columns(metrics.len(), |cols: &mut [Ui]| {
        for (col, metric) in cols.iter_mut().zip(metrics) {
            col.group(|ui: &mut Ui| {
                ui.label(RichText::new(&metric.label).color(Color32::GRAY));
                ui.label(RichText::new(&metric.value).size(22.0).strong());
                if let Some(delta) = &metric.delta {
                    ui.label(RichText::new(delta).color(delta_color(delta)));
                }
            });
        }
    });
}

fn delta_color(delta: &str) -> Color32 {
    match delta.trim_start().chars().next() {
        Some('+') => Color32::from_rgb(0x2e, 0x7d, 0x32),
        Some('-') => Color32::from_rgb(0xc6, 0x28, 0x28),
        _ => Color32::GRAY,
    }
}

pub fn severity_color(severity: Severity) -> Color32 {
    match severity {
        Severity::Info => Color32::from_rgb(0x1e, 0x88, 0xe5),
        Severity::Success => Color32::from_rgb(0x2e, 0x7d, 0x32),
        Severity::Warning => Color32::from_rgb(0xef, 0x6c, 0x00),
        Severity::Error => Color32::RED,
    }
}

fn notice(ui: &mut Ui, severity: Severity, text: &str) {
    let color = severity_color(severity);
    egui::Frame::group(ui.style())
        .stroke(egui::Stroke::new(1.0, color))
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(text).color(color));
        });
}

fn table(ui: &mut Ui, id: &str, title: &str, unit: Unit, rows: &[Observation]) {
    ui.strong(title);
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(60.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("Year");
                });
                header.col(|ui: &mut Ui| {
                    ui.strong("Value");
                });
            })
            .body(|mut body| {
                for o in rows {
                    body.row(18.0, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(o.year.to_string());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(format_value(o.value, unit));
                        });
                    });
                }
            });
    });
}
