use eframe::egui::{self, Color32, RichText};

use crate::state::{AppState, Tab};
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct HouseScopeApp {
    pub state: AppState,
}

impl eframe::App for HouseScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabbed dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui: &mut egui::Ui| {
                    ui.heading("Open a housing dataset to begin  (File → Open…)");
                });
                return;
            }

            // Filters excluding every row halt the render pass here; no
            // summary, charts or export are produced for the empty view.
            if self.state.view_is_empty() {
                ui.add_space(24.0);
                ui.label(
                    RichText::new("No rows match current filters. Try widening filters.")
                        .color(Color32::YELLOW)
                        .heading(),
                );
                return;
            }

            tab_bar(ui, &mut self.state);
            ui.separator();

            match self.state.selected_tab {
                Tab::Overview => charts::overview_tab(ui, &self.state),
                Tab::Visuals => charts::visuals_tab(ui, &mut self.state),
                Tab::Drivers => charts::drivers_tab(ui, &mut self.state),
                Tab::Data => charts::data_tab(ui, &mut self.state),
            }
        });
    }
}

fn tab_bar(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut egui::Ui| {
        for tab in Tab::ALL {
            if ui
                .selectable_label(state.selected_tab == tab, tab.label())
                .clicked()
            {
                state.selected_tab = tab;
            }
        }
    });
}
