//! Session state machine
//!
//! One `SessionState` per inspection request, threaded through the stages by
//! value. Invariants enforced here:
//! - the stage marker only moves forward through the fixed order
//! - FAILED is reachable from COLLECTING, ANALYZING or ASSESSING and is terminal
//! - `last_update` never decreases
//! - findings, assessment and report are each attached once and never replaced

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InspectionError;
use crate::types::{CorrosionFinding, ImageRecord, InspectionReport, RiskAssessment, SensorReading};

// ============================================================================
// Stage Marker
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStage {
    Collecting,
    Analyzing,
    Assessing,
    Reporting,
    Done,
    Failed,
}

impl SessionStage {
    /// Position in the fixed order. FAILED sits outside the forward chain.
    const fn rank(self) -> u8 {
        match self {
            SessionStage::Collecting => 0,
            SessionStage::Analyzing => 1,
            SessionStage::Assessing => 2,
            SessionStage::Reporting => 3,
            SessionStage::Done => 4,
            SessionStage::Failed => 5,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, SessionStage::Done | SessionStage::Failed)
    }

    /// Whether a session at `self` may move to `next`.
    pub const fn can_advance_to(self, next: SessionStage) -> bool {
        match (self, next) {
            (SessionStage::Collecting | SessionStage::Analyzing | SessionStage::Assessing, SessionStage::Failed) => {
                true
            }
            (_, SessionStage::Failed) | (SessionStage::Failed, _) => false,
            _ => next.rank() > self.rank(),
        }
    }
}

impl std::fmt::Display for SessionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStage::Collecting => write!(f, "COLLECTING"),
            SessionStage::Analyzing => write!(f, "ANALYZING"),
            SessionStage::Assessing => write!(f, "ASSESSING"),
            SessionStage::Reporting => write!(f, "REPORTING"),
            SessionStage::Done => write!(f, "DONE"),
            SessionStage::Failed => write!(f, "FAILED"),
        }
    }
}

// ============================================================================
// Request
// ============================================================================

/// What the data-collection collaborator hands to the coordinator.
#[derive(Debug, Clone, Default)]
pub struct InspectionRequest {
    pub platform_id: String,
    pub area: String,
    pub readings: Vec<SensorReading>,
    pub images: Vec<ImageRecord>,
    /// Overrides `[platform].inspector` for this session
    pub inspector: Option<String>,
}

impl InspectionRequest {
    pub fn new(platform_id: impl Into<String>, area: impl Into<String>) -> Self {
        Self {
            platform_id: platform_id.into(),
            area: area.into(),
            ..Self::default()
        }
    }

    pub fn with_readings(mut self, readings: Vec<SensorReading>) -> Self {
        self.readings = readings;
        self
    }

    pub fn with_images(mut self, images: Vec<ImageRecord>) -> Self {
        self.images = images;
        self
    }

    pub fn with_inspector(mut self, inspector: impl Into<String>) -> Self {
        self.inspector = Some(inspector.into());
        self
    }
}

// ============================================================================
// Session State
// ============================================================================

#[derive(Debug, Clone)]
pub struct SessionState {
    session_id: String,
    stage: SessionStage,
    platform_id: String,
    area: String,
    inspector: String,
    start_time: DateTime<Utc>,
    last_update: DateTime<Utc>,
    readings: Vec<SensorReading>,
    images: Vec<ImageRecord>,
    findings: Vec<CorrosionFinding>,
    findings_attached: bool,
    assessment: Option<RiskAssessment>,
    report: Option<InspectionReport>,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl SessionState {
    pub fn new(
        session_id: impl Into<String>,
        platform_id: impl Into<String>,
        area: impl Into<String>,
        inspector: impl Into<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            stage: SessionStage::Collecting,
            platform_id: platform_id.into(),
            area: area.into(),
            inspector: inspector.into(),
            start_time,
            last_update: start_time,
            readings: Vec::new(),
            images: Vec::new(),
            findings: Vec::new(),
            findings_attached: false,
            assessment: None,
            report: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn platform_id(&self) -> &str {
        &self.platform_id
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn inspector(&self) -> &str {
        &self.inspector
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn findings(&self) -> &[CorrosionFinding] {
        &self.findings
    }

    pub fn assessment(&self) -> Option<&RiskAssessment> {
        self.assessment.as_ref()
    }

    pub fn report(&self) -> Option<&InspectionReport> {
        self.report.as_ref()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Record a mutation time. Clock steps backwards are ignored.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_update {
            self.last_update = now;
        }
    }

    fn touch_now(&mut self) {
        self.touch(Utc::now());
    }

    pub fn advance(&mut self, next: SessionStage) -> Result<(), InspectionError> {
        if !self.stage.can_advance_to(next) {
            return Err(InspectionError::stage(
                "state",
                format!("illegal transition {} -> {}", self.stage, next),
            ));
        }
        self.stage = next;
        self.touch_now();
        Ok(())
    }

    /// Append an error and move to FAILED when that transition is legal.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        if self.stage.can_advance_to(SessionStage::Failed) {
            self.stage = SessionStage::Failed;
        }
        self.touch_now();
    }

    /// Demote a recoverable error to a warning; anything else fails the session.
    pub fn record(&mut self, error: &InspectionError) {
        if error.is_recoverable() {
            self.warn(error.to_string());
        } else {
            self.fail(error.to_string());
        }
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
        self.touch_now();
    }

    /// Replace the collected inputs. Only legal while COLLECTING.
    pub fn set_inputs(
        &mut self,
        readings: Vec<SensorReading>,
        images: Vec<ImageRecord>,
    ) -> Result<(), InspectionError> {
        if self.stage != SessionStage::Collecting {
            return Err(InspectionError::stage(
                "state",
                format!("inputs can only be collected in COLLECTING, session is {}", self.stage),
            ));
        }
        self.readings = readings;
        self.images = images;
        self.touch_now();
        Ok(())
    }

    /// Move the raw inputs out for sanitation. Only legal while COLLECTING.
    pub fn take_inputs(&mut self) -> Result<(Vec<SensorReading>, Vec<ImageRecord>), InspectionError> {
        if self.stage != SessionStage::Collecting {
            return Err(InspectionError::stage(
                "state",
                format!("inputs can only be collected in COLLECTING, session is {}", self.stage),
            ));
        }
        Ok((std::mem::take(&mut self.readings), std::mem::take(&mut self.images)))
    }

    pub fn attach_findings(&mut self, findings: Vec<CorrosionFinding>) -> Result<(), InspectionError> {
        if self.findings_attached {
            return Err(InspectionError::stage("state", "findings already attached"));
        }
        self.findings = findings;
        self.findings_attached = true;
        self.touch_now();
        Ok(())
    }

    pub fn attach_assessment(&mut self, assessment: RiskAssessment) -> Result<(), InspectionError> {
        if self.assessment.is_some() {
            return Err(InspectionError::stage("state", "risk assessment already attached"));
        }
        self.assessment = Some(assessment);
        self.touch_now();
        Ok(())
    }

    pub fn attach_report(&mut self, report: InspectionReport) -> Result<(), InspectionError> {
        if self.report.is_some() {
            return Err(InspectionError::stage("state", "report already attached"));
        }
        self.report = Some(report);
        self.touch_now();
        Ok(())
    }

    /// Consume the session, yielding its attached report if any.
    pub fn into_report(self) -> Option<InspectionReport> {
        self.report
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn state() -> SessionState {
        SessionState::new("s1", "PLT-1", "deck", "QA", Utc::now())
    }

    #[test]
    fn test_forward_order() {
        let mut s = state();
        for next in [
            SessionStage::Analyzing,
            SessionStage::Assessing,
            SessionStage::Reporting,
            SessionStage::Done,
        ] {
            s.advance(next).unwrap();
            assert_eq!(s.stage(), next);
        }
    }

    #[test]
    fn test_skip_forward_is_allowed_but_regression_is_not() {
        let mut s = state();
        s.advance(SessionStage::Assessing).unwrap();
        assert!(s.advance(SessionStage::Analyzing).is_err());
        assert!(s.advance(SessionStage::Assessing).is_err());
        assert_eq!(s.stage(), SessionStage::Assessing);
    }

    #[test]
    fn test_failed_only_from_first_three_and_terminal() {
        assert!(SessionStage::Collecting.can_advance_to(SessionStage::Failed));
        assert!(SessionStage::Assessing.can_advance_to(SessionStage::Failed));
        assert!(!SessionStage::Reporting.can_advance_to(SessionStage::Failed));
        assert!(!SessionStage::Done.can_advance_to(SessionStage::Failed));
        assert!(!SessionStage::Failed.can_advance_to(SessionStage::Done));
    }

    #[test]
    fn test_fail_records_error() {
        let mut s = state();
        s.fail("boom");
        assert_eq!(s.stage(), SessionStage::Failed);
        assert_eq!(s.errors(), ["boom".to_string()]);
        assert!(s.advance(SessionStage::Analyzing).is_err());
    }

    #[test]
    fn test_record_demotes_only_recoverable_errors() {
        let mut s = state();
        s.record(&InspectionError::decode("img_1", "bad header"));
        assert_eq!(s.stage(), SessionStage::Collecting);
        assert_eq!(s.warnings(), ["decode error (img_1): bad header".to_string()]);
        assert!(s.errors().is_empty());

        s.record(&InspectionError::stage("collecting", "worker panicked"));
        assert_eq!(s.stage(), SessionStage::Failed);
        assert_eq!(s.errors().len(), 1);
    }

    #[test]
    fn test_last_update_never_decreases() {
        let mut s = state();
        let before = s.last_update();
        s.touch(before - Duration::hours(1));
        assert_eq!(s.last_update(), before);
        s.warn("w");
        assert!(s.last_update() >= before);
    }

    #[test]
    fn test_attachments_are_once_only() {
        let mut s = state();
        s.attach_findings(Vec::new()).unwrap();
        assert!(s.attach_findings(Vec::new()).is_err());
    }

    #[test]
    fn test_stage_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&SessionStage::Done).unwrap(), "\"DONE\"");
    }
}
