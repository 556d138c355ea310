use std::sync::Arc;

use eframe::egui::{self, ColorImage, Rect};

use crate::capture;
use crate::state::AppState;
use crate::ui::{dialogs, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LiveMapApp {
    pub state: AppState,
    /// Screen area of the map preview, in points.
    map_rect: Option<Rect>,
}

impl LiveMapApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            map_rect: None,
        }
    }

    fn take_screenshot(ctx: &egui::Context) -> Option<Arc<ColorImage>> {
        ctx.input(|i| {
            i.raw.events.iter().find_map(|e| match e {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        })
    }

    fn save_capture(&mut self, ctx: &egui::Context) {
        let Some(image) = Self::take_screenshot(ctx) else {
            return;
        };
        let Some(path) = self.state.capture_target.take() else {
            return;
        };
        match capture::save_png(&image, self.map_rect, ctx.pixels_per_point(), &path) {
            Ok(()) => self.state.status_message = Some(format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("Map capture failed: {e:#}");
                self.state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

impl eframe::App for LiveMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.save_capture(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: layers and base map ----
        egui::SidePanel::left("layer_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: map preview ----
        egui::CentralPanel::default().show(ctx, |ui| {
            self.map_rect = Some(plot::map_preview(ui, &self.state));
        });

        dialogs::show(ctx, &mut self.state);
    }
}
