use std::fmt;
use std::path::Path;

use super::auth::TokenProvider;
use super::document::{BaseTiles, FeatureOverlay, Glyph, MapDocument, Marker, MarkerGroup, WmsOverlay};
use crate::config::Config;
use crate::data::model::{marker_label, Icon, PointLayer, Symbol};
use crate::data::store::LayerStore;
use crate::error::ComposeError;

const TITLE: &str = "Live Map Viewer";
const CUSTOM_ICON_SIZE: [u32; 2] = [32, 32];

const OSM_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";
const SATELLITE_URL: &str = "https://mt1.google.com/vt/lyrs=s&x={x}&y={y}&z={z}";
const SATELLITE_ATTRIBUTION: &str = "Google";

// ---------------------------------------------------------------------------
// BaseMap – selected background
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BaseMap {
    #[default]
    Standard,
    Satellite,
    /// Sentinel-2 imagery for a date-time (ISO-8601); the configured
    /// fallback is used when `None`.
    TemporalImagery { datetime: Option<String> },
}

impl BaseMap {
    pub fn label(&self) -> &'static str {
        match self {
            BaseMap::Standard => "Standard",
            BaseMap::Satellite => "Satellite",
            BaseMap::TemporalImagery { .. } => "Sentinel-2",
        }
    }
}

impl fmt::Display for BaseMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseMap::TemporalImagery { datetime: Some(dt) } => write!(f, "{} ({dt})", self.label()),
            _ => write!(f, "{}", self.label()),
        }
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Build the map document for the current layers and base map.
///
/// The token provider is consulted only for temporal imagery; if it fails,
/// composition fails rather than producing an unauthenticated overlay.
pub fn compose(
    store: &LayerStore,
    base_map: &BaseMap,
    config: &Config,
    tokens: &mut dyn TokenProvider,
) -> Result<MapDocument, ComposeError> {
    let (base, imagery) = match base_map {
        BaseMap::Standard => (osm_tiles(), None),
        BaseMap::Satellite => (
            BaseTiles {
                name: "Google Satellite".to_string(),
                url: SATELLITE_URL.to_string(),
                attribution: SATELLITE_ATTRIBUTION.to_string(),
                max_zoom: 20,
            },
            None,
        ),
        BaseMap::TemporalImagery { datetime } => {
            let token = tokens.access_token()?;
            let imagery = &config.imagery;
            let time = datetime
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| imagery.fallback_datetime.clone());
            let overlay = WmsOverlay {
                name: "Sentinel-2".to_string(),
                url: format!(
                    "{}/{}",
                    imagery.wms_url.trim_end_matches('/'),
                    imagery.instance_id
                ),
                layers: imagery.layer.clone(),
                format: "image/png".to_string(),
                transparent: true,
                time,
                maxcc: imagery.max_cloud_cover,
                access_token: token,
                attribution: "Sentinel Hub".to_string(),
            };
            (osm_tiles(), Some(overlay))
        }
    };

    let marker_groups = store.point_layers().iter().map(marker_group).collect();
    let feature_overlays = store
        .vector_layers()
        .iter()
        .map(|l| FeatureOverlay {
            id: l.id.0,
            name: l.name.clone(),
            label: tera::escape_html(&l.name),
            features: l.features.clone(),
        })
        .collect();

    let document = MapDocument {
        title: TITLE.to_string(),
        center: config.map_center,
        zoom: config.map_zoom,
        base,
        imagery,
        marker_groups,
        feature_overlays,
    };
    log::debug!(
        "Composed map: base {}, {} marker(s), layers [{}]",
        base_map,
        document.marker_count(),
        document.layer_names().join(", ")
    );
    Ok(document)
}

fn osm_tiles() -> BaseTiles {
    BaseTiles {
        name: "OpenStreetMap".to_string(),
        url: OSM_URL.to_string(),
        attribution: OSM_ATTRIBUTION.to_string(),
        max_zoom: 19,
    }
}

fn marker_group(layer: &PointLayer) -> MarkerGroup {
    MarkerGroup {
        id: layer.id.0,
        name: layer.name.clone(),
        label: tera::escape_html(&layer.name),
        glyph: glyph_for(&layer.icon),
        markers: layer
            .points
            .iter()
            .map(|p| Marker {
                lat: p.latitude,
                lon: p.longitude,
                label: marker_label(p),
            })
            .collect(),
    }
}

/// A custom icon renders as its image while the file exists; otherwise the
/// default built-in glyph is used.
pub fn glyph_for(icon: &Icon) -> Glyph {
    match icon {
        Icon::Custom(path) if path.is_file() => Glyph::Image {
            url: file_url(path),
            size: CUSTOM_ICON_SIZE,
        },
        Icon::Custom(path) => {
            log::warn!("Icon {} no longer exists, using default", path.display());
            builtin(Symbol::default())
        }
        Icon::Symbol(symbol) => builtin(*symbol),
    }
}

fn builtin(symbol: Symbol) -> Glyph {
    let text = match symbol {
        Symbol::Pin => "\u{1F4CD}",
        Symbol::Mountain => "\u{26F0}",
        Symbol::Star => "\u{2605}",
    };
    Glyph::Builtin {
        name: symbol.name(),
        text,
    }
}

fn file_url(path: &Path) -> String {
    let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let text = absolute.to_string_lossy().replace('\\', "/");
    let text = text.trim_start_matches("//?/");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PointRecord;
    use crate::error::AuthError;
    use crate::map::auth::StaticToken;

    struct FailingAuth;

    impl TokenProvider for FailingAuth {
        fn access_token(&mut self) -> Result<String, AuthError> {
            Err(AuthError::NoToken)
        }
    }

    struct CountingAuth(usize);

    impl TokenProvider for CountingAuth {
        fn access_token(&mut self) -> Result<String, AuthError> {
            self.0 += 1;
            Ok("tok".into())
        }
    }

    fn store() -> LayerStore {
        let mut store = LayerStore::new();
        store.add_point_layer(
            vec![
                PointRecord {
                    latitude: 20.0,
                    longitude: 10.0,
                    altitude: 5.0,
                    precision: None,
                },
                PointRecord {
                    latitude: -3.5,
                    longitude: 7.25,
                    altitude: 0.0,
                    precision: Some(2.0),
                },
            ],
            Icon::Symbol(Symbol::Mountain),
        );
        store.add_vector_layer(
            r#"{"type":"FeatureCollection","features":[]}"#.into(),
            "parks".into(),
        );
        store
    }

    #[test]
    fn markers_and_overlays_follow_store() {
        let doc = compose(
            &store(),
            &BaseMap::Standard,
            &Config::default(),
            &mut StaticToken("unused".into()),
        )
        .unwrap();

        assert_eq!(doc.base.url, OSM_URL);
        assert!(doc.imagery.is_none());
        assert_eq!(doc.layer_names(), vec!["CSV Layer 1", "parks"]);
        let group = &doc.marker_groups[0];
        assert_eq!(
            group.glyph,
            Glyph::Builtin {
                name: "Mountain",
                text: "\u{26F0}"
            }
        );
        assert_eq!(group.markers[0].lat, 20.0);
        assert_eq!(group.markers[0].lon, 10.0);
        assert_eq!(group.markers[0].label, "Altitude: 5.0 m");
        assert_eq!(group.markers[1].label, "Altitude: 0.0 m, Precision: 2.0 m");
    }

    #[test]
    fn composition_is_deterministic() {
        let store = store();
        let config = Config::default();
        let mode = BaseMap::TemporalImagery {
            datetime: Some("2023-07-01T00:00:00Z".into()),
        };
        let a = compose(&store, &mode, &config, &mut StaticToken("t".into())).unwrap();
        let b = compose(&store, &mode, &config, &mut StaticToken("t".into())).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.render_html().unwrap(), b.render_html().unwrap());
    }

    #[test]
    fn satellite_uses_imagery_tiles_without_token() {
        let mut auth = CountingAuth(0);
        let doc = compose(&store(), &BaseMap::Satellite, &Config::default(), &mut auth).unwrap();
        assert_eq!(doc.base.url, SATELLITE_URL);
        assert_eq!(auth.0, 0);
    }

    #[test]
    fn temporal_imagery_without_date_uses_fallback() {
        let mut config = Config::default();
        config.imagery.instance_id = "inst".into();
        let mut auth = CountingAuth(0);
        let doc = compose(
            &store(),
            &BaseMap::TemporalImagery { datetime: None },
            &config,
            &mut auth,
        )
        .unwrap();

        let wms = doc.imagery.expect("imagery overlay");
        assert_eq!(wms.time, config.imagery.fallback_datetime);
        assert_eq!(wms.maxcc, 20);
        assert_eq!(wms.access_token, "tok");
        assert_eq!(wms.url, "https://services.sentinel-hub.com/ogc/wms/inst");
        assert_eq!(auth.0, 1);
    }

    #[test]
    fn token_failure_fails_composition() {
        let result = compose(
            &store(),
            &BaseMap::TemporalImagery { datetime: None },
            &Config::default(),
            &mut FailingAuth,
        );
        assert!(matches!(result, Err(ComposeError::Auth(AuthError::NoToken))));
    }

    #[test]
    fn overlay_labels_are_escaped_and_ids_distinct() {
        let mut store = store();
        store.add_vector_layer(
            r#"{"type":"FeatureCollection","features":[]}"#.into(),
            "parks".into(),
        );
        store.add_vector_layer(
            r#"{"type":"FeatureCollection","features":[]}"#.into(),
            "<b>roads</b>".into(),
        );
        let doc = compose(
            &store,
            &BaseMap::Standard,
            &Config::default(),
            &mut StaticToken("unused".into()),
        )
        .unwrap();

        let overlays = &doc.feature_overlays;
        assert_eq!(overlays[0].name, overlays[1].name);
        assert_ne!(overlays[0].id, overlays[1].id);
        assert_eq!(overlays[2].label, "&lt;b&gt;roads&lt;&#x2F;b&gt;");
        assert_eq!(doc.marker_groups[0].label, "CSV Layer 1");
    }

    #[test]
    fn missing_custom_icon_falls_back_to_pin() {
        let glyph = glyph_for(&Icon::Custom("/nonexistent/icon.png".into()));
        assert!(matches!(glyph, Glyph::Builtin { name: "Pin", .. }));

        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        match glyph_for(&Icon::Custom(file.path().to_path_buf())) {
            Glyph::Image { url, size } => {
                assert!(url.starts_with("file://"));
                assert_eq!(size, [32, 32]);
            }
            other => panic!("expected image glyph, got {other:?}"),
        }
    }
}
