//! Report Builder
//!
//! Turns any session state, including a FAILED or cancelled one, into the
//! terminal `InspectionReport`. Building never fails: a summary hook error is
//! recorded as a report warning and the template summary is kept.

pub mod maintenance;
pub mod summary;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::config::{InspectionConfig, ScheduleConfig};
use crate::hooks::SummaryHook;
use crate::pipeline::SessionState;
use crate::types::{CorrosionLevel, InspectionReport};

pub use maintenance::{maintenance_for, maintenance_unassessed};
pub use summary::{render_summary, SummaryFields};

/// Days until the next inspection for `level`.
pub fn interval_days(level: CorrosionLevel, schedule: &ScheduleConfig) -> u32 {
    match level {
        CorrosionLevel::Low => schedule.low_days,
        CorrosionLevel::Medium => schedule.medium_days,
        CorrosionLevel::High => schedule.high_days,
        CorrosionLevel::Critical => schedule.critical_days,
    }
}

/// `start_time + interval(level)`.
pub fn next_inspection_date(
    start_time: DateTime<Utc>,
    level: CorrosionLevel,
    schedule: &ScheduleConfig,
) -> DateTime<Utc> {
    start_time + Duration::days(i64::from(interval_days(level, schedule)))
}

pub struct ReportBuilder {
    schedule: ScheduleConfig,
    summary_hook: Option<Arc<dyn SummaryHook>>,
}

impl ReportBuilder {
    pub fn new(config: &InspectionConfig) -> Self {
        Self {
            schedule: config.schedule.clone(),
            summary_hook: None,
        }
    }

    pub fn with_summary_hook(mut self, hook: Option<Arc<dyn SummaryHook>>) -> Self {
        self.summary_hook = hook;
        self
    }

    /// Assemble the report for `session`.
    ///
    /// The report id derives from the session id and the timestamp is the
    /// session's last update, so the same state always yields the same report.
    pub fn build(&self, session: &SessionState) -> InspectionReport {
        let assessment = session.assessment();

        // An unassessed session is rescheduled on the routine interval
        let level = assessment.map_or(CorrosionLevel::Low, |a| a.corrosion_level);
        let next_inspection = next_inspection_date(session.start_time(), level, &self.schedule);

        let maintenance = match assessment {
            Some(a) => maintenance_for(a.corrosion_level),
            None => maintenance_unassessed(),
        };

        let findings = session.findings();
        let fields = SummaryFields {
            platform_id: session.platform_id().to_string(),
            area: session.area().to_string(),
            start_time: session.start_time(),
            sensor_count: session.readings().len(),
            image_count: session.images().len(),
            finding_count: findings.len(),
            total_area_mm2: findings.iter().map(|f| f.area_mm2).sum(),
            max_depth_mm: findings.iter().map(|f| f.depth_mm).fold(0.0, f64::max),
            level_label: SummaryFields::level_from(assessment),
            risk_score: assessment.map(|a| a.risk_score),
            urgency: assessment.map(|a| a.urgency),
            next_inspection_date: next_inspection,
        };

        let mut warnings = session.warnings().to_vec();
        let summary = match &self.summary_hook {
            Some(hook) => match hook.summarize(&fields) {
                Ok(text) => text,
                Err(e) => {
                    warn!(session_id = %session.session_id(), error = %e, "Summary hook failed, using template");
                    warnings.push(format!("summary hook failed: {e}"));
                    render_summary(&fields)
                }
            },
            None => render_summary(&fields),
        };

        InspectionReport {
            report_id: format!("report-{}", session.session_id()),
            session_id: session.session_id().to_string(),
            timestamp: session.last_update(),
            inspector: session.inspector().to_string(),
            platform_id: session.platform_id().to_string(),
            area_inspected: session.area().to_string(),
            sensor_data: session.readings().to_vec(),
            image_data: session.images().iter().map(|i| i.metadata()).collect(),
            corrosion_findings: findings.to_vec(),
            risk_assessment: assessment.cloned(),
            maintenance_recommendations: maintenance,
            summary,
            next_inspection_date: next_inspection,
            final_stage: session.stage(),
            errors: session.errors().to_vec(),
            warnings,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
