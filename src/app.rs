use eframe::egui;

use crate::dashboard::Dashboard;
use crate::state::AppState;
use crate::ui::{panels, view};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PakDataTwinApp {
    pub state: AppState,
}

impl PakDataTwinApp {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            state: AppState::new(dashboard),
        }
    }
}

impl eframe::App for PakDataTwinApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            view::page(ui, &mut self.state);
        });
    }
}
