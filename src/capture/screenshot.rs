//! Live capture of the primary monitor via xcap.

use crate::error::{ChainError, Result};
use image::DynamicImage;

/// Capture the primary monitor as an RGBA image.
///
/// Falls back to the first monitor when none reports itself as primary.
pub fn capture_primary_monitor() -> Result<DynamicImage> {
    let start = std::time::Instant::now();

    let monitors = xcap::Monitor::all().map_err(|e| ChainError::Capture(e.to_string()))?;
    let monitor = monitors
        .iter()
        .find(|m| m.is_primary().unwrap_or(false))
        .or_else(|| monitors.first())
        .ok_or_else(|| ChainError::Capture("no monitors found".to_string()))?;

    let image = monitor
        .capture_image()
        .map_err(|e| ChainError::Capture(e.to_string()))?;

    log::info!(
        "[CAPTURE] Primary monitor {}x{} captured in {}ms",
        image.width(),
        image.height(),
        start.elapsed().as_millis()
    );

    Ok(DynamicImage::ImageRgba8(image))
}
