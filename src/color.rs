use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::LayerId;

// ---------------------------------------------------------------------------
// Layer colours for the preview plot
// ---------------------------------------------------------------------------

/// Hue step between consecutive layer ids.
const GOLDEN_ANGLE: f32 = 137.507_77;

/// Stable colour for a layer, derived from its id.
pub fn layer_color(id: LayerId) -> Color32 {
    let hue = (id.0 as f32 * GOLDEN_ANGLE) % 360.0;
    let hsl = Hsl::new(hue, 0.75, 0.5);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}
