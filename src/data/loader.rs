use std::path::Path;

use csv::StringRecord;

use super::model::{ColumnMapping, PointRecord};
use crate::error::IngestError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Column names from the header row, for the column-selection dialog.
pub fn read_headers(path: &Path) -> Result<Vec<String>, IngestError> {
    let text = decode_file(path)?;
    let mut reader = csv_reader(&text);
    let headers = reader.headers().map_err(|source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(headers.iter().map(|h| h.to_string()).collect())
}

/// Load point records from a delimited text file.
///
/// Rows whose X or Y field is blank or not numeric are skipped.  A blank or
/// non-numeric Z gives altitude 0, a blank or non-numeric M gives no
/// precision.  A mapped column missing from the header fails the whole file
/// before any row is read.
pub fn load_coordinates(
    path: &Path,
    mapping: &ColumnMapping,
) -> Result<Vec<PointRecord>, IngestError> {
    let text = decode_file(path)?;
    let mut reader = csv_reader(&text);
    let headers = reader
        .headers()
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let column = |name: &str| -> Result<usize, IngestError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IngestError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };
    let x_idx = column(&mapping.x)?;
    let y_idx = column(&mapping.y)?;
    let z_idx = mapping.z.as_deref().map(column).transpose()?;
    let m_idx = mapping.m.as_deref().map(column).transpose()?;

    let mut points = Vec::new();
    let mut skipped = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let (lon, lat) = match (parse_field(&record, x_idx), parse_field(&record, y_idx)) {
            (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => (lon, lat),
            _ => {
                log::debug!(
                    "{}: row {}: missing or non-numeric X/Y, skipping",
                    path.display(),
                    row_no + 1
                );
                skipped += 1;
                continue;
            }
        };

        let altitude = z_idx.and_then(|i| parse_field(&record, i)).unwrap_or(0.0);
        let precision = m_idx.and_then(|i| parse_field(&record, i));

        points.push(PointRecord {
            latitude: lat,
            longitude: lon,
            altitude,
            precision,
        });
    }

    log::info!(
        "Loaded {} point(s) from {} ({} row(s) skipped)",
        points.len(),
        path.display(),
        skipped
    );
    Ok(points)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read the whole file as single-byte text.  Every byte sequence decodes, so
/// files with stray non-UTF-8 bytes still load.
fn decode_file(path: &Path) -> Result<String, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(&bytes);
    Ok(text.into_owned())
}

fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes())
}

/// Trimmed numeric value of a field; `None` when absent, blank or invalid.
fn parse_field(record: &StringRecord, idx: usize) -> Option<f64> {
    let raw = record.get(idx)?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    fn mapping(x: &str, y: &str, z: Option<&str>, m: Option<&str>) -> ColumnMapping {
        ColumnMapping {
            x: x.to_string(),
            y: y.to_string(),
            z: z.map(str::to_string),
            m: m.map(str::to_string),
        }
    }

    #[test]
    fn drops_rows_with_invalid_mandatory_fields() {
        let file = write_csv(b"Lon,Lat,Elev\n10,20,5\n,30,1\n40,abc,2\n");
        let points =
            load_coordinates(file.path(), &mapping("Lon", "Lat", Some("Elev"), None)).unwrap();
        assert_eq!(
            points,
            vec![PointRecord {
                latitude: 20.0,
                longitude: 10.0,
                altitude: 5.0,
                precision: None,
            }]
        );
    }

    #[test]
    fn optional_fields_fall_back_to_defaults() {
        let file = write_csv(b"x,y,z,m\n1,2,,\n3,4,high,n/a\n5,6, 7 , 0.5 \n");
        let points =
            load_coordinates(file.path(), &mapping("x", "y", Some("z"), Some("m"))).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].altitude, 0.0);
        assert_eq!(points[0].precision, None);
        assert_eq!(points[1].altitude, 0.0);
        assert_eq!(points[1].precision, None);
        assert_eq!(points[2].altitude, 7.0);
        assert_eq!(points[2].precision, Some(0.5));
    }

    #[test]
    fn unset_optional_columns_are_ignored() {
        let file = write_csv(b"x,y,z\n1,2,9\n");
        let points = load_coordinates(file.path(), &mapping("x", "y", None, None)).unwrap();
        assert_eq!(points[0].altitude, 0.0);
        assert_eq!(points[0].precision, None);
    }

    #[test]
    fn missing_column_fails_whole_file() {
        let file = write_csv(b"lon,lat\n1,2\n");
        let err = load_coordinates(file.path(), &mapping("Lon", "lat", None, None)).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "Lon"));
    }

    #[test]
    fn short_rows_count_as_blank() {
        let file = write_csv(b"x,y,z\n1,2\n3\n");
        let points = load_coordinates(file.path(), &mapping("x", "y", Some("z"), None)).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].altitude, 0.0);
    }

    #[test]
    fn tolerates_non_utf8_bytes() {
        let file = write_csv(b"Name,Lon,Lat\nM\xfcnchen,11.5,48.1\n");
        let headers = read_headers(file.path()).unwrap();
        assert_eq!(headers, vec!["Name", "Lon", "Lat"]);
        let points = load_coordinates(file.path(), &mapping("Lon", "Lat", None, None)).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].latitude, 48.1);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let err = load_coordinates(Path::new("/nonexistent/points.csv"), &ColumnMapping::default())
            .unwrap_err();
        assert!(matches!(err, IngestError::FileRead { .. }));
    }
}
