//! Scorer output: RiskAssessment, CorrosionLevel, Urgency

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LevelThresholds;

/// Factor keys used in `RiskAssessment::factors`.
pub mod factor {
    pub const AREA: &str = "area";
    pub const DEPTH: &str = "depth";
    pub const COUNT: &str = "count";
    pub const ENVIRONMENT: &str = "environment";
}

/// Banded corrosion severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CorrosionLevel {
    #[default]
    Low = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
}

impl CorrosionLevel {
    /// Band a risk score. Intervals are closed-open; a boundary value belongs
    /// to the higher band, and the top band is unbounded above.
    pub fn from_score(score: f64, levels: &LevelThresholds) -> Self {
        if score >= levels.critical {
            CorrosionLevel::Critical
        } else if score >= levels.high {
            CorrosionLevel::High
        } else if score >= levels.medium {
            CorrosionLevel::Medium
        } else {
            CorrosionLevel::Low
        }
    }

    pub fn urgency(&self) -> Urgency {
        match self {
            CorrosionLevel::Low => Urgency::Routine,
            CorrosionLevel::Medium => Urgency::Moderate,
            CorrosionLevel::High => Urgency::High,
            CorrosionLevel::Critical => Urgency::Immediate,
        }
    }
}

impl std::fmt::Display for CorrosionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrosionLevel::Low => write!(f, "LOW"),
            CorrosionLevel::Medium => write!(f, "MEDIUM"),
            CorrosionLevel::High => write!(f, "HIGH"),
            CorrosionLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Human-facing urgency label; a function of level only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Routine,
    Moderate,
    High,
    Immediate,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Routine => write!(f, "routine"),
            Urgency::Moderate => write!(f, "moderate"),
            Urgency::High => write!(f, "high"),
            Urgency::Immediate => write!(f, "immediate"),
        }
    }
}

/// Multi-factor risk assessment, produced once per session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub assessment_id: String,
    pub corrosion_level: CorrosionLevel,
    /// Weighted sum of factors, in [0, 1]
    pub risk_score: f64,
    /// Factor name -> weighted contribution
    pub factors: BTreeMap<String, f64>,
    pub recommendations: Vec<String>,
    pub urgency: Urgency,
    /// Sum of finding areas fed into the area factor (mm²)
    pub total_area_mm2: f64,
    /// Maximum finding depth fed into the depth factor (mm)
    pub max_depth_mm: f64,
    pub finding_count: usize,
    pub assessed_at: DateTime<Utc>,
}
