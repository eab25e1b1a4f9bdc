//! The four pipeline stages
//!
//! Each stage consumes the session by value and returns it with its output
//! attached and the marker advanced. A stage error hands the session back
//! inside `StageFailure` so nothing already committed is lost.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::defaults::NO_USABLE_INPUT_WARNING;
use crate::config::InspectionConfig;
use crate::detection::{fuse_thickness, CorrosionDetector};
use crate::error::InspectionError;
use crate::hooks::{Hooks, RecommendationHook};
use crate::report::ReportBuilder;
use crate::scoring::RiskScorer;
use crate::types::{ImageRecord, RasterPayload, SensorReading};

use super::state::{SessionStage, SessionState};

/// A stage error together with the session as it stood when it happened.
#[derive(Debug)]
pub struct StageFailure {
    pub state: SessionState,
    pub error: InspectionError,
}

/// One step of the inspection state machine.
pub trait Stage: Send + Sync {
    /// Stage name for logs and error messages
    fn name(&self) -> &'static str;

    /// The marker a session must carry for this stage to run
    fn marker(&self) -> SessionStage;

    /// Do the stage's work on an owned session.
    fn apply(&self, state: &mut SessionState) -> Result<(), InspectionError>;

    fn step(&self, mut state: SessionState) -> Result<SessionState, StageFailure> {
        match self.apply(&mut state) {
            Ok(()) => Ok(state),
            Err(error) => Err(StageFailure { state, error }),
        }
    }
}

/// The standard COLLECTING -> ANALYZING -> ASSESSING -> REPORTING sequence.
pub fn default_stages(config: &Arc<InspectionConfig>, hooks: &Hooks) -> Vec<Arc<dyn Stage>> {
    vec![
        Arc::new(CollectingStage::new(config)),
        Arc::new(AnalyzingStage::new(config)),
        Arc::new(AssessingStage::new(config, hooks.recommendations.clone())),
        Arc::new(ReportingStage::new(config, hooks)),
    ]
}

// ============================================================================
// COLLECTING
// ============================================================================

/// Sanitizes the request's readings and images. Bad items become warnings.
pub struct CollectingStage {
    config: Arc<InspectionConfig>,
}

impl CollectingStage {
    pub fn new(config: &Arc<InspectionConfig>) -> Self {
        Self {
            config: Arc::clone(config),
        }
    }

    fn sanitize_readings(&self, readings: Vec<SensorReading>, state: &mut SessionState) -> Vec<SensorReading> {
        let mut kept = Vec::with_capacity(readings.len());
        for reading in readings {
            match reading.validate(&self.config.sensors) {
                Ok(()) => kept.push(reading),
                Err(e) => {
                    warn!(session_id = %state.session_id(), error = %e, "Sensor reading dropped");
                    state.record(&e);
                }
            }
        }
        kept
    }

    fn sanitize_images(images: Vec<ImageRecord>, state: &mut SessionState) -> Vec<ImageRecord> {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(images.len());
        for image in images {
            let problem = if image.image_id.trim().is_empty() {
                Some(InspectionError::input(image.source.clone(), "image has no id"))
            } else if !seen.insert(image.image_id.clone()) {
                Some(InspectionError::input(image.image_id.clone(), "duplicate image id"))
            } else {
                match image.payload() {
                    RasterPayload::Decoded(r) if r.width() == 0 || r.height() == 0 => Some(
                        InspectionError::decode(image.image_id.clone(), "raster has zero width or height"),
                    ),
                    RasterPayload::Encoded(bytes) if bytes.is_empty() => {
                        Some(InspectionError::decode(image.image_id.clone(), "empty image payload"))
                    }
                    _ => None,
                }
            };
            match problem {
                Some(e) => {
                    warn!(session_id = %state.session_id(), error = %e, "Image dropped");
                    state.record(&e);
                }
                None => kept.push(image),
            }
        }
        kept
    }
}

impl Stage for CollectingStage {
    fn name(&self) -> &'static str {
        "collecting"
    }

    fn marker(&self) -> SessionStage {
        SessionStage::Collecting
    }

    fn apply(&self, state: &mut SessionState) -> Result<(), InspectionError> {
        let (raw_readings, raw_images) = state.take_inputs()?;
        let readings = self.sanitize_readings(raw_readings, state);
        let images = Self::sanitize_images(raw_images, state);
        let (reading_count, image_count) = (readings.len(), images.len());
        state.set_inputs(readings, images)?;

        if reading_count == 0 && image_count == 0 {
            warn!(session_id = %state.session_id(), "No usable input, skipping analysis");
            state.warn(NO_USABLE_INPUT_WARNING);
            state.advance(SessionStage::Assessing)?;
        } else if image_count == 0 {
            // Nothing to analyze, but the (empty) findings list still belongs to the session
            state.attach_findings(Vec::new())?;
            state.advance(SessionStage::Assessing)?;
        } else {
            state.advance(SessionStage::Analyzing)?;
        }

        info!(
            session_id = %state.session_id(),
            readings = reading_count,
            images = image_count,
            next = %state.stage(),
            "Inputs collected"
        );
        Ok(())
    }
}

// ============================================================================
// ANALYZING
// ============================================================================

/// Runs the detector over every image and fuses thickness readings.
pub struct AnalyzingStage {
    detector: CorrosionDetector,
    config: Arc<InspectionConfig>,
}

impl AnalyzingStage {
    pub fn new(config: &Arc<InspectionConfig>) -> Self {
        Self {
            detector: CorrosionDetector::new(&config.detection),
            config: Arc::clone(config),
        }
    }
}

impl Stage for AnalyzingStage {
    fn name(&self) -> &'static str {
        "analyzing"
    }

    fn marker(&self) -> SessionStage {
        SessionStage::Analyzing
    }

    fn apply(&self, state: &mut SessionState) -> Result<(), InspectionError> {
        let started = Instant::now();
        let outcome = self.detector.detect(state.images());
        for w in outcome.warnings {
            state.warn(w);
        }

        let findings = fuse_thickness(outcome.findings, state.readings(), &self.config.thickness);
        let count = findings.len();
        state.attach_findings(findings)?;
        state.advance(SessionStage::Assessing)?;

        info!(
            session_id = %state.session_id(),
            images = state.images().len(),
            findings = count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Images analyzed"
        );
        Ok(())
    }
}

// ============================================================================
// ASSESSING
// ============================================================================

/// Scores the session and applies the optional recommendation hook.
pub struct AssessingStage {
    scorer: RiskScorer,
    hook: Option<Arc<dyn RecommendationHook>>,
}

impl AssessingStage {
    pub fn new(config: &Arc<InspectionConfig>, hook: Option<Arc<dyn RecommendationHook>>) -> Self {
        Self {
            scorer: RiskScorer::new(&config.scoring),
            hook,
        }
    }
}

impl Stage for AssessingStage {
    fn name(&self) -> &'static str {
        "assessing"
    }

    fn marker(&self) -> SessionStage {
        SessionStage::Assessing
    }

    fn apply(&self, state: &mut SessionState) -> Result<(), InspectionError> {
        let mut assessment = self.scorer.score(
            format!("assessment-{}", state.session_id()),
            state.findings(),
            state.readings(),
            Utc::now(),
        );

        if let Some(hook) = &self.hook {
            match hook.enhance(&assessment) {
                Ok(enhancement) => {
                    let recommendations = std::mem::take(&mut assessment.recommendations);
                    assessment.recommendations = enhancement.apply(recommendations);
                }
                Err(e) => {
                    warn!(session_id = %state.session_id(), error = %e, "Recommendation hook failed, keeping template");
                    state.warn(format!("recommendation hook failed: {e}"));
                }
            }
        }

        info!(
            session_id = %state.session_id(),
            risk_score = assessment.risk_score,
            level = %assessment.corrosion_level,
            urgency = %assessment.urgency,
            "Risk assessed"
        );
        state.attach_assessment(assessment)?;
        state.advance(SessionStage::Reporting)?;
        Ok(())
    }
}

// ============================================================================
// REPORTING
// ============================================================================

/// Builds and attaches the terminal report.
pub struct ReportingStage {
    builder: ReportBuilder,
}

impl ReportingStage {
    pub fn new(config: &Arc<InspectionConfig>, hooks: &Hooks) -> Self {
        Self {
            builder: ReportBuilder::new(config).with_summary_hook(hooks.summary.clone()),
        }
    }
}

impl Stage for ReportingStage {
    fn name(&self) -> &'static str {
        "reporting"
    }

    fn marker(&self) -> SessionStage {
        SessionStage::Reporting
    }

    fn apply(&self, state: &mut SessionState) -> Result<(), InspectionError> {
        state.advance(SessionStage::Done)?;
        let report = self.builder.build(state);

        // The builder may add a hook warning; keep the session in step with the report
        let known = state.warnings().len();
        for w in report.warnings.iter().skip(known) {
            state.warn(w.clone());
        }

        info!(
            session_id = %state.session_id(),
            report_id = %report.report_id,
            next_inspection = %report.next_inspection_date,
            "Report built"
        );
        state.attach_report(report)?;
        Ok(())
    }
}
