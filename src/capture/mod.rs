//! Screenshot domain: public API.
//!
//! This module owns getting a UI image into the shape the model expects:
//! decoded, flattened to RGB, and parked as a JPEG at a fixed temp path.
//! External code should only use the items exported here.

mod normalize;
mod screenshot;

pub use normalize::{encode_jpeg, load_image, normalize_rgb};
pub use screenshot::capture_primary_monitor;

use crate::error::Result;
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// MIME type of every image sent to the model.
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Handle to the prepared screenshot on disk.
///
/// The bytes are read back from `path` for every turn. The file is shared,
/// unguarded state; one interactive user per process keeps that safe.
#[derive(Debug, Clone)]
pub struct ImageRef {
    path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ImageRef {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &'static str {
        IMAGE_MIME_TYPE
    }

    /// Read the JPEG bytes for one turn.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.path)?)
    }
}

/// Normalize `image` to RGB and write it as JPEG to `temp_path`.
pub fn prepare(image: &DynamicImage, temp_path: &Path) -> Result<ImageRef> {
    let start = std::time::Instant::now();
    let rgb = normalize_rgb(image);
    let bytes = encode_jpeg(&rgb)?;
    std::fs::write(temp_path, &bytes)?;

    log::info!(
        "[CAPTURE] Prepared {}x{} image at {} ({} bytes) in {}ms",
        rgb.width(),
        rgb.height(),
        temp_path.display(),
        bytes.len(),
        start.elapsed().as_millis()
    );

    Ok(ImageRef {
        path: temp_path.to_path_buf(),
        width: rgb.width(),
        height: rgb.height(),
    })
}
