use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::config::Config;
use crate::data::loader;
use crate::data::model::{ColumnMapping, Icon, LayerId, LayerKind};
use crate::data::store::{self, LayerStore};
use crate::data::vector;
use crate::map::auth::TokenProvider;
use crate::map::compose::{compose, BaseMap};
use crate::map::document::MapDocument;
use crate::map::icons;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Every user action runs to completion here.  A failed action reports its
/// error in `status_message` and leaves the store and base map as they were.
pub struct AppState {
    pub config: Config,
    pub store: LayerStore,
    pub base_map: BaseMap,

    /// Last successfully composed document.
    pub document: Option<MapDocument>,

    tokens: Box<dyn TokenProvider>,

    /// Custom icons found in the configured icons folder.
    pub icons: Vec<PathBuf>,

    /// Date chosen for temporal imagery; only used when `use_imagery_date`.
    pub imagery_date: NaiveDate,
    pub use_imagery_date: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    // ---- Open dialogs ----
    pub column_dialog: Option<ColumnDialog>,
    pub vector_dialog: Option<VectorLayerDialog>,
    pub layer_manager: Option<LayerManager>,
    pub preview: Option<LayerPreview>,

    /// Destination of a requested map capture, until the screenshot arrives.
    pub capture_target: Option<PathBuf>,
}

impl AppState {
    pub fn new(config: Config, tokens: Box<dyn TokenProvider>) -> Self {
        let icons = icons::discover(&config.icons_dir);
        let mut state = Self {
            config,
            store: LayerStore::new(),
            base_map: BaseMap::default(),
            document: None,
            tokens,
            icons,
            imagery_date: chrono::Local::now().date_naive(),
            use_imagery_date: false,
            status_message: None,
            column_dialog: None,
            vector_dialog: None,
            layer_manager: None,
            preview: None,
            capture_target: None,
        };
        state.refresh_map();
        state
    }

    fn report(&mut self, what: &str, err: impl std::fmt::Display) {
        log::error!("{what}: {err:#}");
        self.status_message = Some(format!("{what}: {err:#}"));
    }

    // ---- CSV import ----

    /// Read the header of a CSV file and open the column dialog for it.
    pub fn begin_csv_import(&mut self, path: PathBuf) {
        match loader::read_headers(&path) {
            Ok(headers) => {
                self.column_dialog = Some(ColumnDialog::new(path, headers));
            }
            Err(e) => self.report("Error reading CSV headers", e),
        }
    }

    /// Load points with the chosen mapping and add them as a new layer.
    pub fn finish_csv_import(&mut self, path: &Path, mapping: &ColumnMapping, icon: Icon) {
        match loader::load_coordinates(path, mapping) {
            Ok(points) => {
                let mut candidate = self.store.clone();
                candidate.add_point_layer(points, icon);
                self.commit(candidate, "Cannot add CSV layer");
            }
            Err(e) => self.report("Error reading CSV file", e),
        }
    }

    // ---- Vector import ----

    /// Import a vector file; multi-layer sources first open the layer picker.
    pub fn begin_vector_import(&mut self, path: PathBuf) {
        if !vector::is_multi_layer(&path) {
            self.import_vector(&path, None);
            return;
        }
        match vector::list_layers(&path) {
            Ok(layers) => self.vector_dialog = Some(VectorLayerDialog::new(path, layers)),
            Err(e) => self.report("Error listing layers", e),
        }
    }

    pub fn import_vector_layers(&mut self, path: &Path, layers: &[String]) {
        for layer in layers {
            self.import_vector(path, Some(layer));
        }
    }

    /// Returns whether a layer was added.
    pub fn import_vector(&mut self, path: &Path, layer: Option<&str>) -> bool {
        match vector::load_vector(path, layer) {
            Ok(features) => {
                let mut candidate = self.store.clone();
                candidate.add_vector_layer(features, vector::layer_display_name(path, layer));
                self.commit(candidate, "Cannot add vector layer")
            }
            Err(e) => {
                self.report("Error reading vector file", e);
                false
            }
        }
    }

    // ---- Layer management ----

    pub fn open_layer_manager(&mut self) {
        if self.store.is_empty() {
            return;
        }
        self.layer_manager = Some(LayerManager::new(&self.store));
    }

    pub fn apply_layer_order(&mut self, order: &[LayerId]) {
        let mut candidate = self.store.clone();
        match candidate.reorder(order) {
            Ok(()) => {
                self.commit(candidate, "Cannot reorder layers");
            }
            Err(e) => self.report("Cannot reorder layers", e),
        }
    }

    pub fn open_preview(&mut self, id: LayerId) {
        if let Some(layer) = self.store.get(id) {
            self.preview = Some(LayerPreview {
                title: format!("Preview - {}", layer.name()),
                text: layer.preview_text(),
            });
        }
    }

    // ---- Base map ----

    /// The temporal-imagery mode for the date currently selected in the UI.
    pub fn temporal_mode(&self) -> BaseMap {
        BaseMap::TemporalImagery {
            datetime: self
                .use_imagery_date
                .then(|| format!("{}T00:00:00Z", self.imagery_date.format("%Y-%m-%d"))),
        }
    }

    /// Switch the base map.  The switch only takes effect if the map can be
    /// composed with it.
    pub fn set_base_map(&mut self, mode: BaseMap) {
        match compose(&self.store, &mode, &self.config, self.tokens.as_mut()) {
            Ok(document) => {
                log::info!("Base map set to {mode}");
                self.base_map = mode;
                self.status_message = None;
                self.publish(document);
            }
            Err(e) => self.report(&format!("Cannot switch to {mode}"), e),
        }
    }

    // ---- Map document ----

    /// Replace the store with `candidate` if the map can be composed from it.
    /// Returns whether the change was kept.
    fn commit(&mut self, candidate: LayerStore, what: &str) -> bool {
        match compose(&candidate, &self.base_map, &self.config, self.tokens.as_mut()) {
            Ok(document) => {
                self.store = candidate;
                self.status_message = None;
                self.publish(document);
                true
            }
            Err(e) => {
                self.report(what, e);
                false
            }
        }
    }

    /// Recompose with the current layers and base map.
    pub fn refresh_map(&mut self) {
        match compose(&self.store, &self.base_map, &self.config, self.tokens.as_mut()) {
            Ok(document) => self.publish(document),
            Err(e) => self.report("Cannot compose map", e),
        }
    }

    fn publish(&mut self, document: MapDocument) {
        if let Err(e) = write_document(&document, &self.config.map_path()) {
            self.report("Cannot write map document", e);
        }
        self.document = Some(document);
    }

    pub fn open_in_browser(&mut self) {
        let path = self.config.map_path();
        if let Err(e) = webbrowser::open(&path.to_string_lossy()) {
            self.report("Failed to open browser", e);
        }
    }
}

/// Render the document and write it to `path`.
pub fn write_document(document: &MapDocument, path: &Path) -> Result<()> {
    let html = document.render_html().context("rendering map document")?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Dialog state
// ---------------------------------------------------------------------------

/// Column and icon selection for a CSV file being imported.
pub struct ColumnDialog {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub x: usize,
    pub y: usize,
    pub z: Option<usize>,
    pub m: Option<usize>,
    pub icon: Icon,
}

impl ColumnDialog {
    pub fn new(path: PathBuf, headers: Vec<String>) -> Self {
        let x = guess_column(&headers, &["lon", "longitude", "lng", "x"]).unwrap_or(0);
        let y = guess_column(&headers, &["lat", "latitude", "y"])
            .unwrap_or(if headers.len() > 1 { 1 } else { 0 });
        Self {
            path,
            headers,
            x,
            y,
            z: None,
            m: None,
            icon: Icon::default(),
        }
    }

    pub fn mapping(&self) -> ColumnMapping {
        let name = |i: usize| self.headers.get(i).cloned().unwrap_or_default();
        ColumnMapping {
            x: name(self.x),
            y: name(self.y),
            z: self.z.map(name),
            m: self.m.map(name),
        }
    }
}

fn guess_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| candidates.contains(&h.trim().to_ascii_lowercase().as_str()))
}

/// Sub-layer picker for multi-layer vector sources.
pub struct VectorLayerDialog {
    pub path: PathBuf,
    pub layers: Vec<(String, bool)>,
}

impl VectorLayerDialog {
    pub fn new(path: PathBuf, names: Vec<String>) -> Self {
        Self {
            path,
            layers: names.into_iter().map(|n| (n, false)).collect(),
        }
    }

    pub fn selected(&self) -> Vec<String> {
        self.layers
            .iter()
            .filter(|(_, checked)| *checked)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Editable copy of the layer order; applied only on OK.
pub struct LayerManager {
    pub entries: Vec<(LayerId, String, LayerKind)>,
    pub selected: Option<usize>,
}

impl LayerManager {
    pub fn new(store: &LayerStore) -> Self {
        Self {
            entries: store
                .all_layers()
                .iter()
                .map(|l| (l.id(), l.name().to_string(), l.kind()))
                .collect(),
            selected: None,
        }
    }

    pub fn move_up(&mut self) {
        if let Some(idx) = self.selected {
            if let Some(new_idx) = store::move_up(&mut self.entries, idx) {
                self.selected = Some(new_idx);
            }
        }
    }

    pub fn move_down(&mut self) {
        if let Some(idx) = self.selected {
            if let Some(new_idx) = store::move_down(&mut self.entries, idx) {
                self.selected = Some(new_idx);
            }
        }
    }

    pub fn order(&self) -> Vec<LayerId> {
        self.entries.iter().map(|(id, _, _)| *id).collect()
    }
}

pub struct LayerPreview {
    pub title: String,
    pub text: String,
}
