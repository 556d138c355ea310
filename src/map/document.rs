use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ComposeError;

const TEMPLATE_NAME: &str = "map.html";
const TEMPLATE: &str = include_str!("../../assets/map.html.tera");

// ---------------------------------------------------------------------------
// MapDocument – everything the rendered page shows
// ---------------------------------------------------------------------------

/// Renderer-independent description of a map page.
///
/// Two documents compare equal exactly when they would render the same
/// markers, overlays and tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDocument {
    pub title: String,
    /// `[lat, lon]`.
    pub center: [f64; 2],
    pub zoom: u8,
    pub base: BaseTiles,
    /// Time-filtered imagery drawn over the base tiles.
    pub imagery: Option<WmsOverlay>,
    pub marker_groups: Vec<MarkerGroup>,
    pub feature_overlays: Vec<FeatureOverlay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseTiles {
    pub name: String,
    pub url: String,
    pub attribution: String,
    pub max_zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmsOverlay {
    pub name: String,
    pub url: String,
    pub layers: String,
    pub format: String,
    pub transparent: bool,
    pub time: String,
    pub maxcc: u8,
    pub access_token: String,
    pub attribution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Glyph {
    Builtin { name: &'static str, text: &'static str },
    Image { url: String, size: [u32; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
}

/// Markers of one point layer, toggled together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerGroup {
    /// Layer id; overlays are keyed by it, never by name.
    pub id: u64,
    pub name: String,
    /// `name` escaped for use as HTML.
    pub label: String,
    pub glyph: Glyph,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureOverlay {
    pub id: u64,
    pub name: String,
    pub label: String,
    /// Serialized FeatureCollection, parsed only by the page script.
    pub features: String,
}

impl MapDocument {
    /// Entries of the layer-visibility control, in display order.
    pub fn layer_names(&self) -> Vec<&str> {
        self.imagery
            .iter()
            .map(|w| w.name.as_str())
            .chain(self.marker_groups.iter().map(|g| g.name.as_str()))
            .chain(self.feature_overlays.iter().map(|o| o.name.as_str()))
            .collect()
    }

    pub fn marker_count(&self) -> usize {
        self.marker_groups.iter().map(|g| g.markers.len()).sum()
    }

    /// Render a standalone Leaflet page.
    pub fn render_html(&self) -> Result<String, ComposeError> {
        let payload = script_safe(&serde_json::to_string(self)?);

        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;
        let mut context = Context::new();
        context.insert("title", &self.title);
        context.insert("payload", &payload);
        Ok(tera.render(TEMPLATE_NAME, &context)?)
    }
}

/// JSON embedded in a `<script>` block must not close the block early.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
