use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson};

use crate::error::VectorError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Names of the layers a vector source exposes.
///
/// GeoJSON files hold a single layer named after the file stem; GDAL sources
/// (Shapefile, GeoPackage, ...) report their own layer names.
pub fn list_layers(path: &Path) -> Result<Vec<String>, VectorError> {
    match source_kind(path) {
        SourceKind::GeoJson => {
            // Validate the file so a broken source never reaches the picker.
            read_geojson(path)?;
            Ok(vec![file_stem(path)])
        }
        SourceKind::Ogr => ogr_list_layers(path),
    }
}

/// Read one layer (or the default one) as a serialized FeatureCollection.
///
/// Nothing partial is returned: any failure yields an error and no string.
pub fn load_vector(path: &Path, layer: Option<&str>) -> Result<String, VectorError> {
    match source_kind(path) {
        SourceKind::GeoJson => {
            if let Some(name) = layer {
                if name != file_stem(path) {
                    return Err(VectorError::MissingLayer {
                        path: path.to_path_buf(),
                        layer: name.to_string(),
                    });
                }
            }
            let collection = read_geojson(path)?;
            log::info!(
                "Loaded {} feature(s) from {}",
                collection.features.len(),
                path.display()
            );
            Ok(collection.to_string())
        }
        SourceKind::Ogr => ogr_load(path, layer),
    }
}

/// Display name of a vector layer: the chosen sub-layer, else the file stem.
pub fn layer_display_name(path: &Path, layer: Option<&str>) -> String {
    layer.map(str::to_string).unwrap_or_else(|| file_stem(path))
}

/// Whether a file can hold more than one named layer (the user must pick).
pub fn is_multi_layer(path: &Path) -> bool {
    matches!(extension(path).as_str(), "gpkg" | "sqlite" | "gdb")
}

// ---------------------------------------------------------------------------
// GeoJSON
// ---------------------------------------------------------------------------

enum SourceKind {
    GeoJson,
    Ogr,
}

fn source_kind(path: &Path) -> SourceKind {
    match extension(path).as_str() {
        "geojson" | "json" => SourceKind::GeoJson,
        _ => SourceKind::Ogr,
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse any GeoJSON object and normalise it to a FeatureCollection.
fn read_geojson(path: &Path) -> Result<FeatureCollection, VectorError> {
    let text = std::fs::read_to_string(path).map_err(|source| VectorError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson: GeoJson = text.parse().map_err(|e: geojson::Error| VectorError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => return Ok(fc),
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(g) => vec![Feature::from(g)],
    };
    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

// ---------------------------------------------------------------------------
// GDAL / OGR sources
// ---------------------------------------------------------------------------

#[cfg(feature = "gdal")]
fn ogr_list_layers(path: &Path) -> Result<Vec<String>, VectorError> {
    ogr::list_layers(path)
}

#[cfg(feature = "gdal")]
fn ogr_load(path: &Path, layer: Option<&str>) -> Result<String, VectorError> {
    ogr::load(path, layer)
}

#[cfg(not(feature = "gdal"))]
fn ogr_list_layers(path: &Path) -> Result<Vec<String>, VectorError> {
    Err(VectorError::Unsupported {
        path: path.to_path_buf(),
    })
}

#[cfg(not(feature = "gdal"))]
fn ogr_load(path: &Path, _layer: Option<&str>) -> Result<String, VectorError> {
    Err(VectorError::Unsupported {
        path: path.to_path_buf(),
    })
}

#[cfg(feature = "gdal")]
mod ogr {
    use std::path::Path;

    use gdal::vector::{FieldValue, LayerAccess};
    use gdal::Dataset;
    use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};

    use crate::error::VectorError;

    fn open(path: &Path) -> Result<Dataset, VectorError> {
        Dataset::open(path).map_err(|source| VectorError::Gdal {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn list_layers(path: &Path) -> Result<Vec<String>, VectorError> {
        let dataset = open(path)?;
        Ok(dataset.layers().map(|l| l.name()).collect())
    }

    pub fn load(path: &Path, layer_name: Option<&str>) -> Result<String, VectorError> {
        let gdal_err = |source| VectorError::Gdal {
            path: path.to_path_buf(),
            source,
        };
        let dataset = open(path)?;
        let mut layer = match layer_name {
            Some(name) => dataset
                .layer_by_name(name)
                .map_err(|_| VectorError::MissingLayer {
                    path: path.to_path_buf(),
                    layer: name.to_string(),
                })?,
            None => dataset
                .layers()
                .next()
                .ok_or_else(|| VectorError::MissingLayer {
                    path: path.to_path_buf(),
                    layer: "<default>".to_string(),
                })?,
        };

        let mut features = Vec::new();
        for feature in layer.features() {
            let geometry = match feature.geometry() {
                Some(g) => {
                    let json = g.json().map_err(gdal_err)?;
                    let geometry: Geometry =
                        serde_json::from_str(&json).map_err(|e| VectorError::Malformed {
                            path: path.to_path_buf(),
                            reason: e.to_string(),
                        })?;
                    Some(geometry)
                }
                None => None,
            };

            let mut properties = JsonObject::new();
            for (name, value) in feature.fields() {
                properties.insert(name, value.map(field_to_json).unwrap_or(JsonValue::Null));
            }

            features.push(Feature {
                bbox: None,
                geometry,
                id: None,
                properties: Some(properties),
                foreign_members: None,
            });
        }

        log::info!(
            "Loaded {} feature(s) from {}{}",
            features.len(),
            path.display(),
            layer_name.map(|n| format!(" [{n}]")).unwrap_or_default()
        );
        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
        .to_string())
    }

    fn field_to_json(value: FieldValue) -> JsonValue {
        match value {
            FieldValue::IntegerValue(i) => JsonValue::from(i),
            FieldValue::Integer64Value(i) => JsonValue::from(i),
            FieldValue::RealValue(f) => JsonValue::from(f),
            FieldValue::StringValue(s) => JsonValue::from(s),
            FieldValue::IntegerListValue(v) => JsonValue::from(v),
            FieldValue::Integer64ListValue(v) => JsonValue::from(v),
            FieldValue::RealListValue(v) => JsonValue::from(v),
            FieldValue::StringListValue(v) => JsonValue::from(v),
            FieldValue::DateValue(d) => JsonValue::from(d.to_string()),
            FieldValue::DateTimeValue(dt) => JsonValue::from(dt.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn features(out: &str) -> Vec<Feature> {
        match out.parse::<GeoJson>().unwrap() {
            GeoJson::FeatureCollection(fc) => fc.features,
            other => panic!("expected a FeatureCollection, got {other}"),
        }
    }

    const PARKS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "North"},
             "geometry": {"type": "Point", "coordinates": [10.0, 20.0]}},
            {"type": "Feature", "properties": {"name": "South"},
             "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}
        ]
    }"#;

    #[test]
    fn loads_feature_collection() {
        let file = write_file(".geojson", PARKS);
        let out = load_vector(file.path(), None).unwrap();
        assert_eq!(features(&out).len(), 2);
    }

    #[test]
    fn bare_geometry_becomes_collection() {
        let file = write_file(
            ".geojson",
            r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#,
        );
        let out = load_vector(file.path(), None).unwrap();
        let features = features(&out);
        assert_eq!(features.len(), 1);
        assert!(features[0].geometry.is_some());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let file = write_file(".geojson", "{ not json");
        assert!(matches!(
            load_vector(file.path(), None),
            Err(VectorError::Malformed { .. })
        ));
        assert!(list_layers(file.path()).is_err());
    }

    #[test]
    fn geojson_exposes_one_layer_named_after_file() {
        let file = write_file(".geojson", PARKS);
        let stem = file_stem(file.path());
        assert_eq!(list_layers(file.path()).unwrap(), vec![stem.clone()]);
        assert!(load_vector(file.path(), Some(&stem)).is_ok());
        assert!(matches!(
            load_vector(file.path(), Some("roads")),
            Err(VectorError::MissingLayer { .. })
        ));
    }

    #[test]
    fn display_name_prefers_sub_layer() {
        let path = Path::new("/data/city.gpkg");
        assert_eq!(layer_display_name(path, Some("roads")), "roads");
        assert_eq!(layer_display_name(path, None), "city");
        assert!(is_multi_layer(path));
        assert!(!is_multi_layer(Path::new("parks.geojson")));
    }

    #[cfg(not(feature = "gdal"))]
    #[test]
    fn ogr_formats_need_gdal() {
        assert!(matches!(
            load_vector(Path::new("roads.shp"), None),
            Err(VectorError::Unsupported { .. })
        ));
    }

    #[cfg(feature = "gdal")]
    #[test]
    fn ogr_reads_named_layer_with_properties() {
        let file = write_file(
            ".geojson",
            r#"{
                "type": "FeatureCollection",
                "name": "parks",
                "features": [
                    {"type": "Feature", "properties": {"name": "North", "area": 12},
                     "geometry": {"type": "Point", "coordinates": [10.0, 20.0]}}
                ]
            }"#,
        );

        assert_eq!(ogr::list_layers(file.path()).unwrap(), vec!["parks".to_string()]);
        let out = ogr::load(file.path(), Some("parks")).unwrap();
        let features = features(&out);
        assert_eq!(features.len(), 1);
        assert!(features[0].geometry.is_some());
        let properties = features[0].properties.as_ref().unwrap();
        assert_eq!(properties["name"], "North");
        assert!(matches!(
            ogr::load(file.path(), Some("roads")),
            Err(VectorError::MissingLayer { .. })
        ));
    }

    #[cfg(feature = "gdal")]
    #[test]
    fn unreadable_ogr_source_is_an_error() {
        let file = write_file(".shp", "not a shapefile");
        assert!(load_vector(file.path(), None).is_err());
        assert!(list_layers(file.path()).is_err());
    }
}
