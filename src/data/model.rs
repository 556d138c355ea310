use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// PointRecord – one validated row of a coordinate file
// ---------------------------------------------------------------------------

/// A single geographic point.  Immutable once ingested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres; 0 when the source column is unset, blank or not numeric.
    pub altitude: f64,
    /// Metres; `None` (not zero) under the same conditions.
    pub precision: Option<f64>,
}

// ---------------------------------------------------------------------------
// ColumnMapping – which source column feeds which coordinate role
// ---------------------------------------------------------------------------

/// Column names chosen by the user for the X/Y/Z/M roles.
/// Names are matched exactly and case-sensitively against the header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnMapping {
    /// Longitude.
    pub x: String,
    /// Latitude.
    pub y: String,
    /// Altitude (optional).
    pub z: Option<String>,
    /// Precision (optional).
    pub m: Option<String>,
}

// ---------------------------------------------------------------------------
// Icons
// ---------------------------------------------------------------------------

/// Built-in marker glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symbol {
    #[default]
    Pin,
    Mountain,
    Star,
}

impl Symbol {
    pub const ALL: [Symbol; 3] = [Symbol::Pin, Symbol::Mountain, Symbol::Star];

    /// Look up a symbol by its display name, falling back to [`Symbol::Pin`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "Mountain" => Symbol::Mountain,
            "Star" => Symbol::Star,
            _ => Symbol::Pin,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Pin => "Pin",
            Symbol::Mountain => "Mountain",
            Symbol::Star => "Star",
        }
    }
}

/// Marker icon of a point layer: a built-in symbol or a custom image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    Symbol(Symbol),
    Custom(PathBuf),
}

impl Default for Icon {
    fn default() -> Self {
        Icon::Symbol(Symbol::Pin)
    }
}

impl Icon {
    /// Resolve a user-supplied icon value.
    ///
    /// An existing file path becomes a custom image; anything else is looked
    /// up in the built-in symbol set, defaulting to `Pin`.
    pub fn resolve(value: &str) -> Self {
        let path = Path::new(value);
        if !value.is_empty() && path.is_file() {
            Icon::Custom(path.to_path_buf())
        } else {
            Icon::Symbol(Symbol::from_name(value))
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Icon::Symbol(s) => write!(f, "{}", s.name()),
            Icon::Custom(p) => write!(f, "{}", p.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// Store-assigned identity of a layer, independent of its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named group of point markers sharing one icon.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLayer {
    pub id: LayerId,
    pub name: String,
    pub points: Vec<PointRecord>,
    pub icon: Icon,
}

/// A named overlay of features read from a GIS file.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorLayer {
    pub id: LayerId,
    pub name: String,
    /// Serialized GeoJSON FeatureCollection, forwarded as-is to the map.
    pub features: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Point,
    Vector,
}

/// Borrowed view of either kind of layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerRef<'a> {
    Point(&'a PointLayer),
    Vector(&'a VectorLayer),
}

impl<'a> LayerRef<'a> {
    pub fn id(&self) -> LayerId {
        match self {
            LayerRef::Point(l) => l.id,
            LayerRef::Vector(l) => l.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            LayerRef::Point(l) => &l.name,
            LayerRef::Vector(l) => &l.name,
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            LayerRef::Point(_) => LayerKind::Point,
            LayerRef::Vector(_) => LayerKind::Vector,
        }
    }

    /// Plain-text rendering for the preview dialog.
    pub fn preview_text(&self) -> String {
        match self {
            LayerRef::Vector(l) => l.features.clone(),
            LayerRef::Point(l) => {
                let mut out = format!("{} point(s), icon: {}\n", l.points.len(), l.icon);
                for p in &l.points {
                    out.push_str(&format!(
                        "lat {}, lon {}, {}\n",
                        format_float(p.latitude),
                        format_float(p.longitude),
                        marker_label(p)
                    ));
                }
                out
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Label formatting
// ---------------------------------------------------------------------------

/// Format a float the way the marker labels show it: integral values keep a
/// trailing `.0` (`5.0`, not `5`), and magnitudes from 1e16 up or below 1e-4
/// use an exponent with an explicit sign (`1e+20`, `2.5e-05`).
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = v.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let s = format!("{v:e}");
        if let Some((mantissa, exp)) = s.split_once('e') {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            return format!("{mantissa}e{sign}{:02}", exp.abs());
        }
    }
    let s = v.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{s}.0")
    }
}

/// Popup text of a point marker.
pub fn marker_label(p: &PointRecord) -> String {
    let mut label = format!("Altitude: {} m", format_float(p.altitude));
    if let Some(precision) = p.precision {
        label.push_str(&format!(", Precision: {} m", format_float(precision)));
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_symbol_falls_back_to_pin() {
        assert_eq!(Icon::resolve("Star"), Icon::Symbol(Symbol::Star));
        assert_eq!(Icon::resolve("Balloon"), Icon::Symbol(Symbol::Pin));
        assert_eq!(Icon::resolve(""), Icon::Symbol(Symbol::Pin));
    }

    #[test]
    fn existing_file_resolves_to_custom_icon() {
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        let value = file.path().to_string_lossy().into_owned();
        assert_eq!(Icon::resolve(&value), Icon::Custom(file.path().to_path_buf()));
    }

    #[test]
    fn labels_keep_trailing_zero() {
        let p = PointRecord {
            latitude: 20.0,
            longitude: 10.0,
            altitude: 5.0,
            precision: None,
        };
        assert_eq!(marker_label(&p), "Altitude: 5.0 m");

        let p = PointRecord {
            precision: Some(0.25),
            altitude: 1234.5,
            ..p
        };
        assert_eq!(marker_label(&p), "Altitude: 1234.5 m, Precision: 0.25 m");
    }

    #[test]
    fn extreme_magnitudes_use_exponent() {
        assert_eq!(format_float(1e20), "1e+20");
        assert_eq!(format_float(-1.5e16), "-1.5e+16");
        assert_eq!(format_float(2.5e-5), "2.5e-05");
        assert_eq!(format_float(1e-100), "1e-100");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(9999999999999998.0), "9999999999999998.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NAN), "nan");
    }
}
