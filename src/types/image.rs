//! Image intake: ImageRecord (raster + metadata) and its serializable ImageMetadata

use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::Location;
use crate::error::InspectionError;

/// Pixel data handed over by the acquisition collaborator.
///
/// Raster data is shared behind `Arc` so session snapshots stay cheap.
#[derive(Debug, Clone)]
pub enum RasterPayload {
    /// Already decoded 8-bit RGB raster
    Decoded(Arc<RgbImage>),
    /// Encoded container bytes (PNG, JPEG, ...) decoded on analysis
    Encoded(Arc<[u8]>),
}

/// One captured image of the inspected surface.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub image_id: String,
    /// Source path or feed identifier
    pub source: String,
    pub captured_at: DateTime<Utc>,
    pub location: Location,
    payload: RasterPayload,
}

impl ImageRecord {
    pub fn from_raster(
        image_id: impl Into<String>,
        source: impl Into<String>,
        captured_at: DateTime<Utc>,
        raster: RgbImage,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            source: source.into(),
            captured_at,
            location: Location::default(),
            payload: RasterPayload::Decoded(Arc::new(raster)),
        }
    }

    pub fn from_encoded(
        image_id: impl Into<String>,
        source: impl Into<String>,
        captured_at: DateTime<Utc>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            source: source.into(),
            captured_at,
            location: Location::default(),
            payload: RasterPayload::Encoded(Arc::from(bytes)),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn payload(&self) -> &RasterPayload {
        &self.payload
    }

    /// Produce an RGB raster suitable for analysis.
    pub fn decode(&self) -> Result<Arc<RgbImage>, InspectionError> {
        let raster = match &self.payload {
            RasterPayload::Decoded(raster) => Arc::clone(raster),
            RasterPayload::Encoded(bytes) => {
                let decoded = image::load_from_memory(bytes)
                    .map_err(|e| InspectionError::decode(self.image_id.clone(), e.to_string()))?;
                Arc::new(decoded.to_rgb8())
            }
        };
        if raster.width() == 0 || raster.height() == 0 {
            return Err(InspectionError::decode(
                self.image_id.clone(),
                "raster has zero width or height",
            ));
        }
        Ok(raster)
    }

    pub fn metadata(&self) -> ImageMetadata {
        let (width, height, encoded_bytes) = match &self.payload {
            RasterPayload::Decoded(raster) => (Some(raster.width()), Some(raster.height()), None),
            RasterPayload::Encoded(bytes) => (None, None, Some(bytes.len())),
        };
        ImageMetadata {
            image_id: self.image_id.clone(),
            source: self.source.clone(),
            captured_at: self.captured_at,
            location: self.location,
            width,
            height,
            encoded_bytes,
        }
    }
}

/// Report-facing description of an image (no pixel data).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageMetadata {
    pub image_id: String,
    pub source: String,
    pub captured_at: DateTime<Utc>,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded_bytes: Option<usize>,
}
