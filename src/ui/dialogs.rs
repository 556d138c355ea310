use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::model::{Icon, LayerKind, Symbol};
use crate::state::{AppState, ColumnDialog};

/// What the user did with a modal-style window this frame.
enum Outcome {
    Open,
    Accepted,
    Cancelled,
}

fn ok_cancel(ui: &mut Ui) -> Outcome {
    let mut outcome = Outcome::Open;
    ui.separator();
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("OK").clicked() {
            outcome = Outcome::Accepted;
        }
        if ui.button("Cancel").clicked() {
            outcome = Outcome::Cancelled;
        }
    });
    outcome
}

/// Show whichever dialogs are open.
pub fn show(ctx: &egui::Context, state: &mut AppState) {
    column_dialog(ctx, state);
    vector_layer_dialog(ctx, state);
    layer_manager(ctx, state);
    layer_preview(ctx, state);
}

// ---------------------------------------------------------------------------
// CSV column / icon selection
// ---------------------------------------------------------------------------

fn column_dialog(ctx: &egui::Context, state: &mut AppState) {
    let Some(mut dialog) = state.column_dialog.take() else {
        return;
    };

    let mut outcome = Outcome::Open;
    egui::Window::new("Select CSV Columns and Icon")
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui: &mut Ui| {
            egui::Grid::new("column_grid")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui: &mut Ui| {
                    required_column(ui, "Longitude (X):", &dialog.headers, &mut dialog.x);
                    ui.end_row();
                    required_column(ui, "Latitude (Y):", &dialog.headers, &mut dialog.y);
                    ui.end_row();
                    optional_column(ui, "Altitude (Z):", &dialog.headers, &mut dialog.z);
                    ui.end_row();
                    optional_column(ui, "Precision (M):", &dialog.headers, &mut dialog.m);
                    ui.end_row();
                });
            ui.separator();
            icon_picker(ui, &mut dialog, &state.icons);
            outcome = ok_cancel(ui);
        });

    match outcome {
        Outcome::Open => state.column_dialog = Some(dialog),
        Outcome::Accepted => {
            let mapping = dialog.mapping();
            state.finish_csv_import(&dialog.path, &mapping, dialog.icon);
        }
        Outcome::Cancelled => {}
    }
}

fn required_column(ui: &mut Ui, label: &str, headers: &[String], selected: &mut usize) {
    ui.label(label);
    let text = headers.get(*selected).cloned().unwrap_or_default();
    egui::ComboBox::from_id_salt(label)
        .selected_text(text)
        .show_ui(ui, |ui: &mut Ui| {
            for (i, h) in headers.iter().enumerate() {
                ui.selectable_value(selected, i, h);
            }
        });
}

fn optional_column(ui: &mut Ui, label: &str, headers: &[String], selected: &mut Option<usize>) {
    ui.label(label);
    let text = selected
        .and_then(|i| headers.get(i).cloned())
        .unwrap_or_else(|| "None".to_string());
    egui::ComboBox::from_id_salt(label)
        .selected_text(text)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(selected, None, "None");
            for (i, h) in headers.iter().enumerate() {
                ui.selectable_value(selected, Some(i), h);
            }
        });
}

fn icon_picker(ui: &mut Ui, dialog: &mut ColumnDialog, icons: &[std::path::PathBuf]) {
    ui.strong("Icon");
    ui.horizontal(|ui: &mut Ui| {
        for symbol in Symbol::ALL {
            ui.selectable_value(&mut dialog.icon, Icon::Symbol(symbol), symbol.name());
        }
        if ui.button("Browse…").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Select an Icon")
                .add_filter("Icons", &["svg", "png"])
                .pick_file()
            {
                dialog.icon = Icon::resolve(&path.to_string_lossy());
            }
        }
    });

    if !icons.is_empty() {
        ScrollArea::vertical()
            .id_salt("icon_list")
            .max_height(160.0)
            .show(ui, |ui: &mut Ui| {
                for path in icons {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    ui.horizontal(|ui: &mut Ui| {
                        ui.add(
                            egui::Image::new(format!("file://{}", path.display()))
                                .fit_to_exact_size(egui::vec2(24.0, 24.0)),
                        );
                        ui.selectable_value(&mut dialog.icon, Icon::Custom(path.clone()), name);
                    });
                }
            });
    }

    if let Icon::Custom(path) = &dialog.icon {
        ui.label(RichText::new(format!("Custom: {}", path.display())).weak());
    }
}

// ---------------------------------------------------------------------------
// Vector sub-layer selection
// ---------------------------------------------------------------------------

fn vector_layer_dialog(ctx: &egui::Context, state: &mut AppState) {
    let Some(mut dialog) = state.vector_dialog.take() else {
        return;
    };

    let mut outcome = Outcome::Open;
    egui::Window::new("Select Layers from GeoPackage")
        .collapsible(false)
        .show(ctx, |ui: &mut Ui| {
            if dialog.layers.is_empty() {
                ui.label("The file contains no layers.");
            }
            for (name, checked) in &mut dialog.layers {
                ui.checkbox(checked, name.as_str());
            }
            outcome = ok_cancel(ui);
        });

    match outcome {
        Outcome::Open => state.vector_dialog = Some(dialog),
        Outcome::Accepted => state.import_vector_layers(&dialog.path, &dialog.selected()),
        Outcome::Cancelled => {}
    }
}

// ---------------------------------------------------------------------------
// Layer order
// ---------------------------------------------------------------------------

fn layer_manager(ctx: &egui::Context, state: &mut AppState) {
    let Some(mut manager) = state.layer_manager.take() else {
        return;
    };

    let mut outcome = Outcome::Open;
    egui::Window::new("Manage Layers")
        .collapsible(false)
        .show(ctx, |ui: &mut Ui| {
            for (i, (_, name, kind)) in manager.entries.iter().enumerate() {
                let text = match kind {
                    LayerKind::Point => format!("● {name}"),
                    LayerKind::Vector => format!("▰ {name}"),
                };
                if ui
                    .selectable_label(manager.selected == Some(i), text)
                    .clicked()
                {
                    manager.selected = Some(i);
                }
            }
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Move Up").clicked() {
                    manager.move_up();
                }
                if ui.button("Move Down").clicked() {
                    manager.move_down();
                }
            });
            ui.label(
                RichText::new("Point layers are always drawn before vector layers.").weak(),
            );
            outcome = ok_cancel(ui);
        });

    match outcome {
        Outcome::Open => state.layer_manager = Some(manager),
        Outcome::Accepted => state.apply_layer_order(&manager.order()),
        Outcome::Cancelled => {}
    }
}

// ---------------------------------------------------------------------------
// Layer preview
// ---------------------------------------------------------------------------

fn layer_preview(ctx: &egui::Context, state: &mut AppState) {
    let Some(preview) = &state.preview else {
        return;
    };

    let mut open = true;
    let mut closed = false;
    egui::Window::new(&preview.title)
        .open(&mut open)
        .default_size([480.0, 360.0])
        .show(ctx, |ui: &mut Ui| {
            ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut preview.text.as_str())
                        .code_editor()
                        .desired_width(f32::INFINITY),
                );
            });
            if ui.button("OK").clicked() {
                closed = true;
            }
        });

    if !open || closed {
        state.preview = None;
    }
}
