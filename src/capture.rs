use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{vec2, ColorImage, Pos2, Rect};

/// Save the part of a window screenshot covered by `region` (in points) as
/// a PNG.  With no region the whole screenshot is saved.
pub fn save_png(
    screenshot: &ColorImage,
    region: Option<Rect>,
    pixels_per_point: f32,
    path: &Path,
) -> Result<()> {
    let bounds = Rect::from_min_size(
        Pos2::ZERO,
        vec2(screenshot.size[0] as f32, screenshot.size[1] as f32) / pixels_per_point,
    );
    let image = match region.map(|r| r.intersect(bounds)).filter(|r| r.is_positive()) {
        Some(rect) => screenshot.region(&rect, Some(pixels_per_point)),
        None => screenshot.clone(),
    };
    let [width, height] = image.size;
    let rgba: Vec<u8> = image.pixels.iter().flat_map(|c| c.to_array()).collect();
    let buffer = image::RgbaImage::from_raw(width as u32, height as u32, rgba)
        .context("screenshot buffer has unexpected size")?;
    buffer
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("saving capture to {}", path.display()))?;
    log::info!("Saved map capture ({width}x{height}) to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, Color32};

    use super::*;

    #[test]
    fn crops_region_and_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.png");
        let screenshot = ColorImage::new([10, 10], Color32::RED);

        let region = Rect::from_min_max(pos2(1.0, 1.0), pos2(3.0, 4.0));
        save_png(&screenshot, Some(region), 2.0, &path).unwrap();

        let saved = image::open(&path).unwrap();
        assert_eq!((saved.width(), saved.height()), (4, 6));
    }

    #[test]
    fn region_is_clamped_to_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.png");
        let screenshot = ColorImage::new([10, 10], Color32::BLUE);

        let region = Rect::from_min_max(pos2(2.0, 2.0), pos2(50.0, 50.0));
        save_png(&screenshot, Some(region), 1.0, &path).unwrap();

        let saved = image::open(&path).unwrap();
        assert_eq!((saved.width(), saved.height()), (8, 8));
    }
}
