use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::CellValue;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year Built range ----
            ui.strong("Year Built");
            if state.capabilities.has_year {
                if range_filter(ui, "year", state.year_bounds, &mut state.filters.year_range) {
                    state.refilter();
                }
            } else {
                ui.label("YearBuilt not found — year filter disabled.");
            }
            ui.separator();

            // ---- Overall Quality multi-select ----
            ui.strong("Overall Quality");
            if state.capabilities.has_quality {
                quality_select(ui, state);
            } else {
                ui.label("OverallQual not found — quality filter disabled.");
            }
            ui.separator();

            // ---- Living Area range ----
            ui.strong("Living Area (GrLivArea)");
            if state.capabilities.has_area {
                if range_filter(ui, "area", state.area_bounds, &mut state.filters.area_range) {
                    state.refilter();
                }
            } else {
                ui.label("GrLivArea not found — area filter disabled.");
            }
            ui.separator();

            // ---- Neighborhood multi-select ----
            ui.strong("Neighborhood");
            neighborhood_select(ui, state);
        });
}

/// Two bounded sliders for an inclusive numeric range. Returns whether the
/// range changed; keeps `hi >= lo` by dragging the other bound along.
fn range_filter(
    ui: &mut Ui,
    id: &str,
    bounds: Option<(f64, f64)>,
    range: &mut Option<(f64, f64)>,
) -> bool {
    let Some((lo, hi)) = range else {
        ui.label("No numeric values in this column.");
        return false;
    };
    let (min, max) = bounds.unwrap_or((*lo, *hi));

    let mut changed = false;
    ui.push_id(id, |ui: &mut Ui| {
        changed |= ui
            .add(egui::Slider::new(lo, min..=max).integer().text("from"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(hi, min..=max).integer().text("to"))
            .changed();
    });
    if changed && *hi < *lo {
        *hi = *lo;
    }
    changed
}

fn quality_select(ui: &mut Ui, state: &mut AppState) {
    let options: Vec<CellValue> = state
        .dataset
        .as_ref()
        .map(|ds| crate::data::filter::quality_options(ds).into_iter().collect())
        .unwrap_or_default();
    let selected: BTreeSet<CellValue> = state.filters.quality.clone().unwrap_or_default();

    let header = format!("values  ({}/{})", selected.len(), options.len());
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("quality_filter")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_quality();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_quality();
                }
            });

            for val in &options {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    state.toggle_quality_value(val);
                }
            }
        });
}

fn neighborhood_select(ui: &mut Ui, state: &mut AppState) {
    let options = state.neighborhood_options();
    let n_selected = state.filters.neighborhoods.len();

    let header = if n_selected == 0 {
        "all (none selected)".to_string()
    } else {
        format!("{n_selected} selected")
    };
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("neighborhood_filter")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                state.clear_neighborhoods();
            }
            ui.label("Empty selection = no constraint.");

            for label in &options {
                let mut checked = state.filters.neighborhoods.contains(label);
                if ui.checkbox(&mut checked, label).changed() {
                    state.toggle_neighborhood(label);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded, {} match filters",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open housing dataset")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
