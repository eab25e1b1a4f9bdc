//! Fixed-template report summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::defaults::UNASSESSED_LABEL;
use crate::types::{RiskAssessment, Urgency};

/// The computed structured fields a summary is written from.
///
/// Also handed to a `SummaryHook`, so an enhancement layer sees exactly the
/// numbers the template uses.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryFields {
    pub platform_id: String,
    pub area: String,
    pub start_time: DateTime<Utc>,
    pub sensor_count: usize,
    pub image_count: usize,
    pub finding_count: usize,
    pub total_area_mm2: f64,
    pub max_depth_mm: f64,
    /// `LOW`..`CRITICAL`, or `UNASSESSED` when scoring never ran
    pub level_label: String,
    pub risk_score: Option<f64>,
    pub urgency: Option<Urgency>,
    pub next_inspection_date: DateTime<Utc>,
}

impl SummaryFields {
    pub fn level_from(assessment: Option<&RiskAssessment>) -> String {
        assessment.map_or_else(|| UNASSESSED_LABEL.to_string(), |a| a.corrosion_level.to_string())
    }
}

pub fn render_summary(f: &SummaryFields) -> String {
    let mut lines = vec![
        format!("Platform: {}", f.platform_id),
        format!("Inspected area: {}", f.area),
        format!("Inspection started: {} UTC", f.start_time.format("%Y-%m-%d %H:%M:%S")),
        format!("Sensor data: {} readings", f.sensor_count),
        format!("Image data: {} images", f.image_count),
        format!(
            "Corrosion findings: {}, total area {:.2} mm², max depth {:.2} mm",
            f.finding_count, f.total_area_mm2, f.max_depth_mm
        ),
    ];
    match (f.risk_score, f.urgency) {
        (Some(score), Some(urgency)) => lines.push(format!(
            "Risk level: {} (score {:.2}, urgency {})",
            f.level_label, score, urgency
        )),
        _ => lines.push(format!("Risk level: {}", f.level_label)),
    }
    lines.push(format!("Next inspection: {}", f.next_inspection_date.format("%Y-%m-%d")));
    lines.join("\n")
}
