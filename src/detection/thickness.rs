//! Thickness-gauge fusion: ultrasonic wall-thickness readings refine
//! image-derived depth estimates before findings are attached to a session.

use tracing::debug;

use crate::config::ThicknessConfig;
use crate::types::{mean_for, CorrosionFinding, SensorCategory, SensorReading};

/// Return refined copies of `findings`.
///
/// With thickness readings present, each depth becomes at least the measured
/// wall loss times `loss_to_depth_ratio`, and confidence rises by
/// `confidence_boost` up to `confidence_cap`. Confidence is never lowered.
pub fn fuse_thickness(
    findings: Vec<CorrosionFinding>,
    readings: &[SensorReading],
    config: &ThicknessConfig,
) -> Vec<CorrosionFinding> {
    if !config.enabled || findings.is_empty() {
        return findings;
    }
    let Some(mean_thickness) = mean_for(readings, SensorCategory::Thickness) else {
        return findings;
    };

    let wall_loss = (config.nominal_thickness_mm - mean_thickness).max(0.0);
    let fused_depth = (wall_loss * config.loss_to_depth_ratio).min(config.nominal_thickness_mm);
    debug!(mean_thickness, wall_loss, fused_depth, "Fusing thickness readings into findings");

    findings
        .into_iter()
        .map(|f| CorrosionFinding {
            depth_mm: f.depth_mm.max(fused_depth),
            confidence: (f.confidence + config.confidence_boost)
                .min(config.confidence_cap)
                .max(f.confidence),
            ..f
        })
        .collect()
}
