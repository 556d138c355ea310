use eframe::egui::{Rect, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoints, Points};

use crate::color::layer_color;
use crate::data::model::{Icon, Symbol};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Map preview (central panel)
// ---------------------------------------------------------------------------

/// Render point layers on a lon/lat plot.  Returns the area drawn, which is
/// what a map capture saves.
pub fn map_preview(ui: &mut Ui, state: &AppState) -> Rect {
    if state.store.point_layers().is_empty() {
        let response = ui.centered_and_justified(|ui: &mut Ui| {
            if state.store.is_empty() {
                ui.heading("Load a file to view layers  (File → Load CSV Coordinates…)");
            } else {
                ui.heading("Vector layers are shown in the browser map  (File → Open Map in Browser)");
            }
        });
        return response.response.rect;
    }

    let response = Plot::new("map_preview")
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(1.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for layer in state.store.point_layers() {
                let points: PlotPoints = layer
                    .points
                    .iter()
                    .map(|p| [p.longitude, p.latitude])
                    .collect();

                let series = Points::new(points)
                    .name(&layer.name)
                    .color(layer_color(layer.id))
                    .shape(marker_shape(&layer.icon))
                    .filled(true)
                    .radius(4.0);

                plot_ui.points(series);
            }
        });
    response.response.rect
}

fn marker_shape(icon: &Icon) -> MarkerShape {
    match icon {
        Icon::Symbol(Symbol::Pin) => MarkerShape::Circle,
        Icon::Symbol(Symbol::Mountain) => MarkerShape::Up,
        Icon::Symbol(Symbol::Star) => MarkerShape::Asterisk,
        Icon::Custom(_) => MarkerShape::Square,
    }
}
