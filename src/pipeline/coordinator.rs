//! Pipeline Coordinator - fixed four-stage inspection sequence
//!
//! ```text
//! COLLECTING  sanitize readings and images (bad items -> warnings)
//! ANALYZING   per-image rust detection on the rayon pool, thickness fusion
//! ASSESSING   multi-factor risk score, optional recommendation hook
//! REPORTING   report assembly, optional summary hook
//! DONE
//! ```
//!
//! A stage error appends to the session's error list, moves it to FAILED and
//! still yields a best-effort report. Only an invalid configuration is
//! surfaced to the caller, and that happens before any session exists.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::defaults::CANCELLED_WARNING;
use crate::config::InspectionConfig;
use crate::error::InspectionError;
use crate::hooks::Hooks;
use crate::report::ReportBuilder;
use crate::types::InspectionReport;

use super::stages::{default_stages, Stage, StageFailure};
use super::state::{InspectionRequest, SessionState};

pub struct PipelineCoordinator {
    config: Arc<InspectionConfig>,
    hooks: Hooks,
    stages: Vec<Arc<dyn Stage>>,
    /// Builds reports for sessions that never reached REPORTING
    fallback: ReportBuilder,
}

impl PipelineCoordinator {
    /// Validate `config` and wire the default stages. Fails fast with
    /// `InspectionError::Configuration`; no session is started.
    pub fn new(config: InspectionConfig) -> Result<Self, InspectionError> {
        config.validate()?;
        let config = Arc::new(config);
        let hooks = Hooks::none();
        info!(
            inspector = %config.platform.inspector,
            parallel = config.detection.parallel,
            "Initializing inspection pipeline"
        );
        Ok(Self {
            stages: default_stages(&config, &hooks),
            fallback: ReportBuilder::new(&config),
            config,
            hooks,
        })
    }

    /// Install summary and recommendation hooks, rebuilding the default stages.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.stages = default_stages(&self.config, &hooks);
        self.fallback = ReportBuilder::new(&self.config).with_summary_hook(hooks.summary.clone());
        self.hooks = hooks;
        self
    }

    /// Replace the stage sequence.
    pub fn with_stages(mut self, stages: Vec<Arc<dyn Stage>>) -> Self {
        self.stages = stages;
        self
    }

    pub fn config(&self) -> &Arc<InspectionConfig> {
        &self.config
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    fn start_session(&self, request: InspectionRequest) -> SessionState {
        let session_id = Uuid::new_v4().to_string();
        let area = if request.area.trim().is_empty() {
            self.config.platform.default_area.clone()
        } else {
            request.area
        };
        let inspector = request
            .inspector
            .unwrap_or_else(|| self.config.platform.inspector.clone());

        let mut state = SessionState::new(session_id, request.platform_id, area, inspector, Utc::now());
        // A fresh session is always COLLECTING, so this cannot be rejected
        if let Err(e) = state.set_inputs(request.readings, request.images) {
            state.fail(e.to_string());
        }
        info!(
            session_id = %state.session_id(),
            platform = %state.platform_id(),
            area = %state.area(),
            readings = state.readings().len(),
            images = state.images().len(),
            "Inspection session started"
        );
        state
    }

    /// Whether `stage` should run on a session currently at `state`.
    fn is_due(stage: &dyn Stage, state: &SessionState) -> bool {
        !state.stage().is_terminal() && state.stage() == stage.marker()
    }

    /// Fold a stage result back into a session value.
    fn settle(stage: &dyn Stage, result: Result<SessionState, StageFailure>) -> SessionState {
        match result {
            Ok(state) if state.stage() == stage.marker() => {
                let mut state = state;
                let e = InspectionError::stage(stage.name(), "stage completed without advancing the session");
                error!(session_id = %state.session_id(), stage = stage.name(), "{}", e);
                state.fail(e.to_string());
                state
            }
            Ok(state) => state,
            Err(StageFailure { mut state, error }) => {
                error!(session_id = %state.session_id(), stage = stage.name(), error = %error, "Stage failed");
                state.fail(error.to_string());
                state
            }
        }
    }

    fn finish(&self, state: SessionState) -> InspectionReport {
        let report = match state.report() {
            Some(report) => report.clone(),
            None => self.fallback.build(&state),
        };
        info!(
            session_id = %report.session_id,
            final_stage = %report.final_stage,
            findings = report.corrosion_findings.len(),
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Inspection session finished"
        );
        report
    }

    /// Run the whole sequence on the calling thread.
    pub fn run(&self, request: InspectionRequest) -> InspectionReport {
        let mut state = self.start_session(request);
        for stage in &self.stages {
            if Self::is_due(stage.as_ref(), &state) {
                state = Self::settle(stage.as_ref(), stage.step(state));
            }
        }
        self.finish(state)
    }

    /// Run the sequence with each stage on the blocking pool.
    ///
    /// `cancel` is checked between stages only. On cancellation the session
    /// stops where it is and the partial state is reported with a
    /// "cancelled before completion" warning.
    pub async fn run_async(&self, request: InspectionRequest, cancel: CancellationToken) -> InspectionReport {
        let mut state = self.start_session(request);

        for stage in &self.stages {
            if state.stage().is_terminal() {
                break;
            }
            if cancel.is_cancelled() {
                warn!(session_id = %state.session_id(), stage = %state.stage(), "Inspection cancelled");
                state.warn(CANCELLED_WARNING);
                return self.finish(state);
            }
            if !Self::is_due(stage.as_ref(), &state) {
                continue;
            }

            let checkpoint = state.clone();
            let worker = Arc::clone(stage);
            let result = tokio::task::spawn_blocking(move || worker.step(state)).await;
            state = match result {
                Ok(result) => Self::settle(stage.as_ref(), result),
                Err(join_error) => {
                    let mut state = checkpoint;
                    let e = InspectionError::stage(stage.name(), format!("worker aborted: {join_error}"));
                    error!(session_id = %state.session_id(), stage = stage.name(), "{}", e);
                    state.fail(e.to_string());
                    state
                }
            };
            tokio::task::yield_now().await;
        }

        self.finish(state)
    }

    /// `run_async` bounded by a deadline. Expiry cancels at the next stage
    /// boundary, exactly like an external cancellation.
    pub async fn run_with_deadline(&self, request: InspectionRequest, deadline: Duration) -> InspectionReport {
        let cancel = CancellationToken::new();
        let run = self.run_async(request, cancel.clone());
        tokio::pin!(run);

        tokio::select! {
            report = &mut run => report,
            () = tokio::time::sleep(deadline) => {
                info!(deadline_ms = deadline.as_millis() as u64, "Inspection deadline expired");
                cancel.cancel();
                run.await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::NO_USABLE_INPUT_WARNING;
    use crate::config::ConfigError;
    use crate::pipeline::SessionStage;
    use crate::types::{SensorCategory, SensorReading};

    fn coordinator() -> PipelineCoordinator {
        PipelineCoordinator::new(InspectionConfig::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = InspectionConfig::default();
        config.detection.kernel_size = 2;
        assert!(matches!(
            PipelineCoordinator::new(config),
            Err(InspectionError::Configuration(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn test_session_ids_are_unique() {
        let c = coordinator();
        let a = c.run(InspectionRequest::new("PLT-1", "deck"));
        let b = c.run(InspectionRequest::new("PLT-1", "deck"));
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(a.report_id, format!("report-{}", a.session_id));
    }

    #[test]
    fn test_async_zero_input_reaches_done() {
        let report = tokio_test::block_on(
            coordinator().run_async(InspectionRequest::new("PLT-1", "deck"), CancellationToken::new()),
        );
        assert_eq!(report.final_stage, SessionStage::Done);
        assert_eq!(report.warnings, vec![NO_USABLE_INPUT_WARNING.to_string()]);
    }

    #[test]
    fn test_empty_stage_list_reports_collecting() {
        let reading = SensorReading::new("t1", SensorCategory::Temperature, 20.0, Utc::now());
        let report = coordinator()
            .with_stages(Vec::new())
            .run(InspectionRequest::new("PLT-1", "deck").with_readings(vec![reading]));
        assert_eq!(report.final_stage, SessionStage::Collecting);
        assert_eq!(report.sensor_data.len(), 1);
        assert!(report.risk_assessment.is_none());
    }
}
