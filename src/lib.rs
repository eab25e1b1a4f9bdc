//! Corrosion Sentinel: offshore structural corrosion inspection
//!
//! One inspection session flows through a fixed state machine:
//!
//! - **Collecting**: sanitize sensor readings and captured images
//! - **Analyzing**: HSV rust segmentation, morphology, connected components,
//!   shape classification, ultrasonic thickness fusion
//! - **Assessing**: weighted multi-factor risk score and level
//! - **Reporting**: maintenance plan, summary and next inspection date
//!
//! Per-item problems degrade the session to warnings; stage errors move it to
//! FAILED. Every run returns a report.

pub mod acquisition;
pub mod config;
pub mod detection;
pub mod error;
pub mod hooks;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod types;

pub use config::{ConfigError, InspectionConfig};
pub use error::InspectionError;
pub use hooks::{Hooks, RecommendationEnhancement, RecommendationHook, SummaryHook};
pub use pipeline::{InspectionRequest, PipelineCoordinator, SessionStage, SessionState};

pub use types::{
    BoundingBox, CorrosionFinding, CorrosionLevel, CorrosionType, ImageRecord, InspectionReport,
    Location, MaintenanceRecommendation, RiskAssessment, SensorCategory, SensorReading, Urgency,
};
