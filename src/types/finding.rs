//! Detector output: CorrosionFinding

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shape-derived corrosion morphology.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CorrosionType {
    /// Compact, near-isotropic patch
    Uniform,
    /// Irregular or elongated region
    Localized,
    /// One of many small isolated pits
    Pitting,
}

impl std::fmt::Display for CorrosionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrosionType::Uniform => write!(f, "uniform"),
            CorrosionType::Localized => write!(f, "localized"),
            CorrosionType::Pitting => write!(f, "pitting"),
        }
    }
}

/// Axis-aligned box in image pixel coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// One detected corrosion region. Never mutated once attached to a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrosionFinding {
    /// Unique within a session, assigned in encounter order
    pub finding_id: String,
    pub image_id: Option<String>,
    pub area_mm2: f64,
    pub depth_mm: f64,
    pub corrosion_type: CorrosionType,
    /// Detection confidence in [0, 1]
    pub confidence: f64,
    pub bounding_boxes: Vec<BoundingBox>,
    pub detected_at: DateTime<Utc>,
    /// Component size before physical scaling
    pub pixel_area: u32,
    /// pixel area / convex hull area
    pub solidity: f64,
    /// long side / short side of the bounding box (>= 1)
    pub aspect_ratio: f64,
}

/// Finding id for the `index`-th (0-based) finding of a session.
pub fn finding_id(index: usize) -> String {
    format!("finding-{:04}", index + 1)
}
