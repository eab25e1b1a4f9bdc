//! Terminal session entity: InspectionReport and MaintenanceRecommendation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CorrosionFinding, ImageMetadata, RiskAssessment, SensorReading};
use crate::pipeline::SessionStage;

/// A structured maintenance work item attached to a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaintenanceRecommendation {
    pub recommendation_id: String,
    /// 1 (lowest) to 5 (highest)
    pub priority: u8,
    pub action_type: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration_hours: Option<u32>,
    pub required_resources: Vec<String>,
}

/// Final inspection report. Produced exactly once per session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectionReport {
    pub report_id: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub inspector: String,
    pub platform_id: String,
    pub area_inspected: String,
    pub sensor_data: Vec<SensorReading>,
    pub image_data: Vec<ImageMetadata>,
    pub corrosion_findings: Vec<CorrosionFinding>,
    pub risk_assessment: Option<RiskAssessment>,
    pub maintenance_recommendations: Vec<MaintenanceRecommendation>,
    pub summary: String,
    pub next_inspection_date: DateTime<Utc>,
    /// Stage marker the session ended in (DONE, FAILED, or the stage reached before cancellation)
    pub final_stage: SessionStage,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl InspectionReport {
    /// True when any stage failed or any input was dropped.
    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty() || self.final_stage != SessionStage::Done
    }

    /// Sum of all finding areas in mm².
    pub fn total_area_mm2(&self) -> f64 {
        self.corrosion_findings.iter().map(|f| f.area_mm2).sum()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
