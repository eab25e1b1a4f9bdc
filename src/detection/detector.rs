//! Corrosion Detector - rule-based rust detection over captured images
//!
//! Per image: optional median denoise, HSV conversion, color-band mask, opening then closing,
//! 8-connected components, noise floor, then per-component measurement and
//! shape classification. Images are independent; results are merged in
//! input order and finding ids are assigned in that order.

use chrono::{DateTime, Utc};
use image::RgbImage;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::DetectionConfig;
use crate::error::InspectionError;
use crate::types::{finding_id, BoundingBox, CorrosionFinding, CorrosionType, ImageRecord};

use super::components::{find_components, Component};
use super::denoise::median_filter;
use super::hsv::{ColorBand, HsvImage};
use super::morphology::{self, BinaryMask};

/// Findings plus the warnings for images that could not be analyzed.
#[derive(Debug, Clone, Default)]
pub struct DetectionOutcome {
    pub findings: Vec<CorrosionFinding>,
    pub warnings: Vec<String>,
}

/// Measurements for one surviving component, before a session id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMeasurement {
    pub bbox: BoundingBox,
    pub pixel_area: u32,
    pub area_mm2: f64,
    pub depth_mm: f64,
    pub corrosion_type: CorrosionType,
    pub confidence: f64,
    pub solidity: f64,
    pub aspect_ratio: f64,
}

impl RegionMeasurement {
    fn into_finding(self, index: usize, image_id: &str, detected_at: DateTime<Utc>) -> CorrosionFinding {
        CorrosionFinding {
            finding_id: finding_id(index),
            image_id: Some(image_id.to_string()),
            area_mm2: self.area_mm2,
            depth_mm: self.depth_mm,
            corrosion_type: self.corrosion_type,
            confidence: self.confidence,
            bounding_boxes: vec![self.bbox],
            detected_at,
            pixel_area: self.pixel_area,
            solidity: self.solidity,
            aspect_ratio: self.aspect_ratio,
        }
    }
}

pub struct CorrosionDetector {
    config: DetectionConfig,
    band: ColorBand,
}

impl CorrosionDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            config: config.clone(),
            band: ColorBand::from_config(config),
        }
    }

    /// Analyze every image and concatenate the findings in input order.
    ///
    /// An image that fails to decode yields a warning and no findings.
    pub fn detect(&self, images: &[ImageRecord]) -> DetectionOutcome {
        let per_image: Vec<Result<Vec<RegionMeasurement>, InspectionError>> = if self.config.parallel {
            images.par_iter().map(|img| self.analyze_image(img)).collect()
        } else {
            images.iter().map(|img| self.analyze_image(img)).collect()
        };

        let mut outcome = DetectionOutcome::default();
        for (image, result) in images.iter().zip(per_image) {
            match result {
                Ok(regions) => {
                    debug!(image_id = %image.image_id, regions = regions.len(), "Image analyzed");
                    for region in regions {
                        let index = outcome.findings.len();
                        outcome
                            .findings
                            .push(region.into_finding(index, &image.image_id, image.captured_at));
                    }
                }
                Err(e) => {
                    warn!(image_id = %image.image_id, error = %e, "Image excluded from analysis");
                    outcome.warnings.push(e.to_string());
                }
            }
        }
        outcome
    }

    pub fn analyze_image(&self, image: &ImageRecord) -> Result<Vec<RegionMeasurement>, InspectionError> {
        let raster = image.decode()?;
        Ok(self.analyze_raster(&raster))
    }

    /// Run the full per-image procedure on a decoded raster.
    pub fn analyze_raster(&self, raster: &RgbImage) -> Vec<RegionMeasurement> {
        let denoised;
        let raster = if self.config.median_kernel_size >= 3 {
            denoised = median_filter(raster, self.config.median_kernel_size);
            &denoised
        } else {
            raster
        };
        let hsv = HsvImage::from_rgb(raster);
        let raw = self.band.threshold(&hsv);
        let cleaned = morphology::clean(&raw, self.config.kernel_size);

        let components: Vec<Component> = find_components(&cleaned)
            .into_iter()
            .filter(|c| c.area() >= self.config.min_component_area_px)
            .collect();

        let image_area = f64::from(raster.width()) * f64::from(raster.height());
        let many_components = components.len() >= self.config.pitting_min_components;

        components
            .iter()
            .map(|c| self.measure(c, &hsv, &raw, image_area, many_components))
            .collect()
    }

    fn measure(
        &self,
        component: &Component,
        hsv: &HsvImage,
        raw: &BinaryMask,
        image_area: f64,
        many_components: bool,
    ) -> RegionMeasurement {
        let pixel_area = component.area();
        let count = f64::from(pixel_area);

        let (signal_sum, in_band) = component.pixels.iter().fold((0.0, 0_u32), |(sum, hits), &(x, y)| {
            (sum + hsv.get(x, y).rust_signal(), hits + u32::from(raw.get(x, y)))
        });
        let mean_signal = signal_sum / count;
        let color_fraction = f64::from(in_band) / count;

        let solidity = component.solidity();
        let aspect_ratio = component.aspect_ratio();
        let area_fraction = count / image_area;

        let corrosion_type = self.classify(solidity, aspect_ratio, area_fraction, many_components);

        RegionMeasurement {
            bbox: component.bbox,
            pixel_area,
            area_mm2: count * self.config.mm_per_pixel * self.config.mm_per_pixel,
            depth_mm: (self.config.depth_scale_mm * mean_signal).min(self.config.max_depth_mm),
            corrosion_type,
            confidence: (color_fraction * (0.5 + 0.5 * solidity)).clamp(0.0, 1.0),
            solidity,
            aspect_ratio,
        }
    }

    /// Shape rule, first match wins:
    /// 1. many components in the image and this one tiny => pitting
    /// 2. compact and near-square => uniform
    /// 3. low solidity or elongated => localized
    /// 4. in between: uniform while the combined shortfall from the uniform
    ///    thresholds is less than one full band width, otherwise localized
    pub fn classify(
        &self,
        solidity: f64,
        aspect_ratio: f64,
        area_fraction: f64,
        many_components: bool,
    ) -> CorrosionType {
        let c = &self.config;
        if many_components && area_fraction < c.pitting_max_area_fraction {
            return CorrosionType::Pitting;
        }
        if solidity >= c.uniform_min_solidity && aspect_ratio <= c.uniform_max_aspect_ratio {
            return CorrosionType::Uniform;
        }
        if solidity <= c.localized_max_solidity || aspect_ratio >= c.localized_min_aspect_ratio {
            return CorrosionType::Localized;
        }

        let solidity_gap = (c.uniform_min_solidity - solidity).max(0.0)
            / (c.uniform_min_solidity - c.localized_max_solidity);
        let aspect_gap = (aspect_ratio - c.uniform_max_aspect_ratio).max(0.0)
            / (c.localized_min_aspect_ratio - c.uniform_max_aspect_ratio);
        if solidity_gap + aspect_gap < 1.0 {
            CorrosionType::Uniform
        } else {
            CorrosionType::Localized
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
