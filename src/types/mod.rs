//! Shared data structures for the corrosion inspection pipeline
//!
//! - Intake: SensorReading, ImageRecord / ImageMetadata
//! - Detection: CorrosionFinding, BoundingBox, CorrosionType
//! - Scoring: RiskAssessment, CorrosionLevel, Urgency
//! - Reporting: InspectionReport, MaintenanceRecommendation

mod sensor;
mod image;
mod finding;
mod assessment;
mod report;

pub use sensor::*;
pub use image::*;
pub use finding::*;
pub use assessment::*;
pub use report::*;
