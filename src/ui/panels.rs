use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::layer_color;
use crate::data::model::LayerRef;
use crate::map::compose::BaseMap;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – layers and base map
// ---------------------------------------------------------------------------

/// Render the left layer panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Layers");
    ui.separator();

    if state.store.is_empty() {
        ui.label("No layers loaded.");
    } else {
        let mut preview = None;
        ScrollArea::vertical()
            .max_height(ui.available_height() * 0.6)
            .auto_shrink([false, true])
            .show(ui, |ui: &mut Ui| {
                for layer in state.store.all_layers() {
                    ui.horizontal(|ui: &mut Ui| {
                        let (tag, detail) = match layer {
                            LayerRef::Point(l) => ("●", format!("{} pts", l.points.len())),
                            LayerRef::Vector(_) => ("▰", "vector".to_string()),
                        };
                        ui.label(RichText::new(tag).color(layer_color(layer.id())));
                        ui.label(layer.name());
                        ui.label(RichText::new(detail).weak());
                        if ui.small_button("Preview").clicked() {
                            preview = Some(layer.id());
                        }
                    });
                }
            });
        if let Some(id) = preview {
            state.open_preview(id);
        }

        if ui.button("Manage Layers…").clicked() {
            state.open_layer_manager();
        }
    }

    ui.add_space(8.0);
    ui.heading("Base map");
    ui.separator();
    base_map_controls(ui, state);
}

fn base_map_controls(ui: &mut Ui, state: &mut AppState) {
    let current = state.base_map.clone();
    if ui
        .radio(current == BaseMap::Standard, "Standard (OpenStreetMap)")
        .clicked()
    {
        state.set_base_map(BaseMap::Standard);
    }
    if ui
        .radio(current == BaseMap::Satellite, "Satellite (Google)")
        .clicked()
    {
        state.set_base_map(BaseMap::Satellite);
    }
    let temporal = matches!(current, BaseMap::TemporalImagery { .. });
    if ui.radio(temporal, "Sentinel-2 imagery").clicked() {
        state.set_base_map(state.temporal_mode());
    }

    ui.indent("imagery_date", |ui: &mut Ui| {
        ui.checkbox(&mut state.use_imagery_date, "Pick date");
        ui.add_enabled_ui(state.use_imagery_date, |ui: &mut Ui| {
            ui.add(egui_extras::DatePickerButton::new(&mut state.imagery_date).id_salt("imagery_date"));
        });
        if temporal && ui.button("Apply date").clicked() {
            state.set_base_map(state.temporal_mode());
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
            if ui.button("Load CSV Coordinates…").clicked() {
                open_csv_dialog(state);
                ui.close_menu();
            }
            if ui.button("Load Vector Layer…").clicked() {
                open_vector_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Capture Map…").clicked() {
                request_capture(ui.ctx(), state);
                ui.close_menu();
            }
            if ui.button("Open Map in Browser").clicked() {
                state.open_in_browser();
                ui.close_menu();
            }
        });

        ui.menu_button("Layers", |ui: &mut Ui| {
            if ui.button("Manage Layers…").clicked() {
                state.open_layer_manager();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(doc) = &state.document {
            ui.label(format!(
                "{} layer(s), {} marker(s) – {}",
                state.store.len(),
                doc.marker_count(),
                state.base_map
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_csv_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open CSV File")
        .add_filter("CSV Files", &["csv", "txt"])
        .pick_file();

    if let Some(path) = file {
        state.begin_csv_import(path);
    }
}

pub fn open_vector_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open Vector File")
        .add_filter("Vector files", &["geojson", "json", "shp", "gpkg"])
        .add_filter("GeoJSON", &["geojson", "json"])
        .add_filter("Shapefile", &["shp"])
        .add_filter("GeoPackage", &["gpkg"])
        .pick_file();

    if let Some(path) = file {
        state.begin_vector_import(path);
    }
}

fn request_capture(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save Map Capture")
        .add_filter("PNG", &["png"])
        .set_file_name("map_capture.png")
        .save_file();

    if let Some(path) = file {
        state.capture_target = Some(path);
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
    }
}
