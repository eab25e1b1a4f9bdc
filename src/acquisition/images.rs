//! Camera captures from disk
//!
//! Files are read as encoded bytes; decoding happens during analysis so a
//! corrupt capture only costs that one image.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::AcquisitionError;
use crate::types::ImageRecord;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Load one capture. The image id is the file stem and `captured_at` is the
/// file's modification time, falling back to now.
pub fn load_image_file(path: &Path) -> Result<ImageRecord, AcquisitionError> {
    let bytes = std::fs::read(path).map_err(|e| AcquisitionError::io(path, e))?;
    let captured_at = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_or_else(|_| Utc::now(), DateTime::<Utc>::from);
    let image_id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    debug!(image_id = %image_id, bytes = bytes.len(), "Loaded image file");
    Ok(ImageRecord::from_encoded(image_id, path.display().to_string(), captured_at, bytes))
}

/// Load every image file in `dir` (non-recursive), sorted by file name.
pub fn load_image_dir(dir: &Path) -> Result<Vec<ImageRecord>, AcquisitionError> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| AcquisitionError::io(dir, e))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    paths.sort();

    let images = paths
        .iter()
        .map(|p| load_image_file(p))
        .collect::<Result<Vec<_>, _>>()?;
    info!(count = images.len(), dir = %dir.display(), "Loaded inspection images");
    Ok(images)
}
