//! Image-based corrosion detection
//!
//! ## Per-image procedure
//!
//! 1. Optional median denoise (`denoise`), then RGB -> HSV (`hsv`)
//! 2. Color-band threshold to a binary mask (`hsv::ColorBand`)
//! 3. Opening then closing (`morphology`)
//! 4. 8-connected components above the noise floor (`components`)
//! 5. Area, depth, shape class and confidence per component (`detector`)
//!
//! `thickness` refines the resulting findings with wall-thickness readings.

pub mod components;
pub mod denoise;
pub mod detector;
pub mod hsv;
pub mod morphology;
pub mod thickness;

pub use detector::{CorrosionDetector, DetectionOutcome, RegionMeasurement};
pub use thickness::fuse_thickness;
