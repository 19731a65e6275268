//! Decode, flatten, and encode screenshots.

use crate::error::{ChainError, Result};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::path::Path;

const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Load a jpg/jpeg/png file. Anything else is rejected before decoding.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ChainError::UnsupportedImage(path.display().to_string()));
    }

    let start = std::time::Instant::now();
    let image = image::open(path)?;
    log::info!(
        "[CAPTURE] Loaded {} ({}x{}, {:?}) in {}ms",
        path.display(),
        image.width(),
        image.height(),
        image.color(),
        start.elapsed().as_millis()
    );
    Ok(image)
}

/// Flatten to 3-channel RGB. Alpha is dropped, not composited.
pub fn normalize_rgb(image: &DynamicImage) -> RgbImage {
    if image.color().has_alpha() {
        log::info!("[CAPTURE] Dropping alpha channel ({:?} -> Rgb8)", image.color());
    }
    image.to_rgb8()
}

/// Encode to JPEG bytes in memory.
pub fn encode_jpeg(rgb: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    rgb.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Jpeg)?;
    Ok(bytes)
}
