use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::filter::YearRange;
use crate::data::registry::Category;
use crate::pages::Page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – navigation and filters
// ---------------------------------------------------------------------------

/// Render the left navigation / filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new("Pakistan Data Twin").strong());
        ui.small("Socio-economic indicators");
    });
    ui.add_space(6.0);
    ui.separator();

    // ---- Page navigation ----
    for page in Page::ALL {
        let selected = state.filters.page == page;
        let button = egui::Button::new(RichText::new(page.label()).strong())
            .selected(selected)
            .min_size(egui::vec2(ui.available_width(), 28.0));
        if ui.add(button).clicked() {
            state.set_page(page);
        }
    }
    ui.separator();

    // ---- Year range ----
    ui.strong("Year range");
    match state.bounds {
        Some(bounds) => year_sliders(ui, state, bounds),
        None => {
            ui.label("No data loaded.");
        }
    }
    ui.separator();

    // ---- Indicator explorer selection ----
    if state.filters.page == Page::Overview {
        ui.strong("Explore indicator");
        let current = state.filters.indicator;
        let categories: Vec<Category> = state.dashboard.registry().categories().collect();
        egui::ComboBox::from_id_salt("indicator")
            .selected_text(current.name())
            .show_ui(ui, |ui: &mut Ui| {
                for category in categories {
                    if ui
                        .selectable_label(current == category, category.name())
                        .clicked()
                    {
                        state.set_indicator(category);
                    }
                }
            });
        ui.separator();
    }

    ui.small(format!("Data folder: {}", state.dashboard.config().data_dir.display()));
}

fn year_sliders(ui: &mut Ui, state: &mut AppState, bounds: YearRange) {
    let mut from = state.filters.year_range.min;
    let mut to = state.filters.year_range.max;

    let changed_from = ui
        .add(egui::Slider::new(&mut from, bounds.min..=bounds.max).text("From"))
        .changed();
    let changed_to = ui
        .add(egui::Slider::new(&mut to, bounds.min..=bounds.max).text("To"))
        .changed();

    if changed_from || changed_to {
        // keep the dragged end, push the other one along
        if changed_from && from > to {
            to = from;
        } else if changed_to && to < from {
            from = to;
        }
        state.set_year_range(YearRange::new(from, to));
    }

    if ui.small_button("All years").clicked() {
        state.set_year_range(bounds);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let range = state.filters.year_range;
        if state.bounds.is_some() {
            ui.label(format!(
                "{} | {}–{} | {}",
                state.filters.page,
                range.min,
                range.max,
                state.cache_summary()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open indicator data folder")
        .set_directory(&state.dashboard.config().data_dir)
        .pick_folder();

    if let Some(path) = folder {
        state.open_data_dir(&path);
        if let Some(msg) = &state.status_message {
            log::error!("{msg}");
        }
    }
}
