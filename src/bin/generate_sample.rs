use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;

/// Minimal deterministic PRNG (xorshift64*)
struct SimpleRng(u64);

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + unit * (hi - lo)
    }
}

/// Survey points around a few peaks, with some rows broken the way field
/// exports tend to be (blank cells, text in numeric columns, latin-1 names).
fn write_points(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let peaks: [(&[u8], f64, f64, f64); 4] = [
        (b"Zugspitze", 47.421, 10.985, 2962.0),
        (b"Gro\xdfglockner", 47.074, 12.694, 3798.0),
        (b"Monte Rosa", 45.937, 7.867, 4634.0),
        (b"Tr\xe9sor", 45.832, 6.865, 4808.0),
    ];

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["Name", "Lon", "Lat", "Elev", "Accuracy"])?;

    let mut rows = 0;
    for (name, lat, lon, elev) in peaks {
        for i in 0..25 {
            let lat = lat + rng.range(-0.05, 0.05);
            let lon = lon + rng.range(-0.05, 0.05);
            let elev = elev - rng.range(0.0, 800.0);
            let accuracy = rng.range(0.5, 10.0);

            let lon_field = if i == 7 { String::new() } else { format!("{lon:.6}") };
            let lat_field = if i == 13 { "n/a".to_string() } else { format!("{lat:.6}") };
            let elev_field = if i % 9 == 4 { String::new() } else { format!("{elev:.1}") };
            let acc_field = if i % 5 == 2 { "?".to_string() } else { format!("{accuracy:.2}") };

            writer.write_record([
                name,
                lon_field.as_bytes(),
                lat_field.as_bytes(),
                elev_field.as_bytes(),
                acc_field.as_bytes(),
            ])?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

/// A couple of polygons and a line as a GeoJSON FeatureCollection.
fn write_areas(path: &Path) -> Result<()> {
    let square = |name: &str, lon: f64, lat: f64, size: f64| {
        json!({
            "type": "Feature",
            "properties": { "name": name },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [lon, lat],
                    [lon + size, lat],
                    [lon + size, lat + size],
                    [lon, lat + size],
                    [lon, lat]
                ]]
            }
        })
    };

    let collection = json!({
        "type": "FeatureCollection",
        "features": [
            square("Wetterstein", 10.9, 47.35, 0.15),
            square("Glockner Group", 12.6, 47.0, 0.2),
            {
                "type": "Feature",
                "properties": { "name": "Traverse" },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[6.865, 45.832], [7.867, 45.937], [10.985, 47.421]]
                }
            }
        ]
    });

    fs::write(path, serde_json::to_string_pretty(&collection)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    let points_path = out_dir.join("summits.csv");
    let rows = write_points(&points_path, &mut rng)?;
    println!("Wrote {rows} rows to {}", points_path.display());

    let areas_path = out_dir.join("ranges.geojson");
    write_areas(&areas_path)?;
    println!("Wrote {}", areas_path.display());

    Ok(())
}
