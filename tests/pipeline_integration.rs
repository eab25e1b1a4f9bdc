//! Pipeline Integration Tests
//!
//! Drives whole sessions through `PipelineCoordinator` with synthetic
//! rasters and sensor readings: degenerate inputs, partial decode failure,
//! determinism, cancellation, deadlines, failing stages and hooks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use image::{Rgb, RgbImage};
use tokio_util::sync::CancellationToken;

use corrosion_sentinel::config::defaults::{
    BASELINE_RECOMMENDATION, CANCELLED_WARNING, NO_USABLE_INPUT_WARNING,
};
use corrosion_sentinel::error::InspectionError;
use corrosion_sentinel::pipeline::{default_stages, Stage};
use corrosion_sentinel::report::SummaryFields;
use corrosion_sentinel::scoring::templates::recommendations_for;
use corrosion_sentinel::{
    CorrosionLevel, CorrosionType, Hooks, ImageRecord, InspectionConfig, InspectionRequest,
    PipelineCoordinator, RecommendationEnhancement, RecommendationHook, RiskAssessment,
    SensorCategory, SensorReading, SessionStage, SessionState, SummaryHook,
};

// ============================================================================
// Fixtures
// ============================================================================

const RUST: Rgb<u8> = Rgb([170, 85, 40]);
const STEEL: Rgb<u8> = Rgb([120, 125, 130]);

fn captured() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
}

/// 200x200 steel plate with one 40x40 rust patch (16 mm² at 0.1 mm/px).
fn rusty_plate(id: &str) -> ImageRecord {
    let mut img = RgbImage::from_pixel(200, 200, STEEL);
    for y in 60..100 {
        for x in 50..90 {
            img.put_pixel(x, y, RUST);
        }
    }
    ImageRecord::from_raster(id, format!("cam0/{id}.png"), captured(), img)
}

fn clean_plate(id: &str) -> ImageRecord {
    ImageRecord::from_raster(id, "cam0", captured(), RgbImage::from_pixel(64, 64, STEEL))
}

fn reading(id: &str, category: SensorCategory, value: f64) -> SensorReading {
    SensorReading::new(id, category, value, captured())
}

/// Temperature, humidity and pH at the centre of their benign ranges.
fn optimal_environment() -> Vec<SensorReading> {
    vec![
        reading("temp_1", SensorCategory::Temperature, 25.0),
        reading("hum_1", SensorCategory::Humidity, 75.0),
        reading("ph_1", SensorCategory::Ph, 8.0),
    ]
}

fn coordinator() -> PipelineCoordinator {
    PipelineCoordinator::new(InspectionConfig::default()).unwrap()
}

fn request() -> InspectionRequest {
    InspectionRequest::new("PLT-07", "splash zone leg B2")
}

// ============================================================================
// Degenerate and nominal sessions
// ============================================================================

#[test]
fn zero_input_session_completes_with_baseline_recommendation() {
    let report = coordinator().run(request());

    assert_eq!(report.final_stage, SessionStage::Done);
    assert!(report.corrosion_findings.is_empty());
    assert!(report.errors.is_empty());
    assert_eq!(report.warnings, vec![NO_USABLE_INPUT_WARNING.to_string()]);

    let assessment = report.risk_assessment.as_ref().unwrap();
    assert_eq!(assessment.risk_score, 0.0);
    assert_eq!(assessment.corrosion_level, CorrosionLevel::Low);
    assert_eq!(assessment.recommendations, vec![BASELINE_RECOMMENDATION.to_string()]);
    assert_eq!(report.maintenance_recommendations.len(), 1);
}

#[test]
fn optimal_environment_without_images_scores_zero() {
    let report = coordinator().run(request().with_readings(optimal_environment()));

    assert_eq!(report.final_stage, SessionStage::Done);
    assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    let assessment = report.risk_assessment.as_ref().unwrap();
    assert!(assessment.risk_score.abs() < 1e-12);
    assert_eq!(assessment.corrosion_level, CorrosionLevel::Low);
    assert_eq!(assessment.recommendations, recommendations_for(CorrosionLevel::Low));
    assert_eq!(report.sensor_data.len(), 3);
}

#[test]
fn rust_patch_produces_uniform_finding_and_schedule() {
    let report = coordinator().run(
        request()
            .with_readings(optimal_environment())
            .with_images(vec![rusty_plate("img_001")]),
    );

    assert_eq!(report.final_stage, SessionStage::Done);
    assert_eq!(report.corrosion_findings.len(), 1);
    let finding = &report.corrosion_findings[0];
    assert_eq!(finding.finding_id, "finding-0001");
    assert_eq!(finding.image_id.as_deref(), Some("img_001"));
    assert_eq!(finding.corrosion_type, CorrosionType::Uniform);
    assert!((finding.area_mm2 - 16.0).abs() < 1e-9);
    assert_eq!(finding.detected_at, captured());

    // One small patch, benign environment: area, count and depth keep it LOW
    let assessment = report.risk_assessment.as_ref().unwrap();
    assert_eq!(assessment.corrosion_level, CorrosionLevel::Low);
    assert!(assessment.risk_score > 0.0 && assessment.risk_score < 0.3);
    assert_eq!(assessment.finding_count, 1);
    assert_eq!(report.maintenance_recommendations[0].action_type, "preventive_maintenance");
    assert!(report.next_inspection_date - report.timestamp > chrono::Duration::days(170));
    assert_eq!(report.image_data[0].width, Some(200));
}

#[test]
fn summary_reports_aggregate_area_across_images() {
    let garbage = ImageRecord::from_encoded("img_bad", "cam1", captured(), vec![0xde, 0xad]);
    let report = coordinator().run(
        request()
            .with_readings(vec![reading("ut_1", SensorCategory::Thickness, 9.0)])
            .with_images(vec![rusty_plate("a"), garbage, rusty_plate("b")]),
    );

    assert_eq!(report.final_stage, SessionStage::Done);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.corrosion_findings.len(), 2);
    assert_eq!(report.corrosion_findings[1].finding_id, "finding-0002");
    assert!((report.total_area_mm2() - 32.0).abs() < 1e-9);

    // The scored area is the same total the summary reports
    let assessment = report.risk_assessment.as_ref().unwrap();
    assert!((assessment.total_area_mm2 - report.total_area_mm2()).abs() < 1e-9);
    let config = InspectionConfig::default();
    let expected_area_factor =
        report.total_area_mm2() / config.scoring.area_saturation_mm2 * config.scoring.weights.area;
    assert!((assessment.factors["area"] - expected_area_factor).abs() < 1e-12);
    assert!((assessment.max_depth_mm - 2.4).abs() < 1e-9);
    assert!(
        report.summary.contains("Corrosion findings: 2, total area 32.00 mm²"),
        "summary was:\n{}",
        report.summary
    );
}

#[test]
fn thickness_readings_deepen_findings() {
    // 12 mm nominal, 9 mm measured: 3 mm loss * 0.8 = 2.4 mm
    let readings = vec![reading("ut_1", SensorCategory::Thickness, 9.0)];
    let report = coordinator().run(
        request()
            .with_readings(readings)
            .with_images(vec![rusty_plate("img_001")]),
    );
    let finding = &report.corrosion_findings[0];
    assert!((finding.depth_mm - 2.4).abs() < 1e-9);
    assert!(finding.confidence <= 1.0);
}

#[test]
fn clean_surface_has_no_findings() {
    let report = coordinator().run(request().with_images(vec![clean_plate("img_clean")]));
    assert_eq!(report.final_stage, SessionStage::Done);
    assert!(report.corrosion_findings.is_empty());
    assert_eq!(report.risk_assessment.unwrap().finding_count, 0);
}

// ============================================================================
// Degradation
// ============================================================================

#[test]
fn undecodable_image_is_a_warning_not_a_failure() {
    let garbage = ImageRecord::from_encoded("img_bad", "cam1", captured(), vec![0x00, 0x01, 0x02, 0x03]);
    let report = coordinator().run(request().with_images(vec![garbage, rusty_plate("img_ok")]));

    assert_eq!(report.final_stage, SessionStage::Done);
    assert!(report.errors.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("img_bad"));
    assert_eq!(report.corrosion_findings.len(), 1);
    assert_eq!(report.corrosion_findings[0].image_id.as_deref(), Some("img_ok"));
}

#[test]
fn invalid_readings_and_duplicate_images_are_dropped() {
    let readings = vec![
        reading("temp_1", SensorCategory::Temperature, f64::NAN),
        reading("hum_1", SensorCategory::Humidity, 75.0),
    ];
    let images = vec![rusty_plate("img_001"), rusty_plate("img_001")];
    let report = coordinator().run(request().with_readings(readings).with_images(images));

    assert_eq!(report.final_stage, SessionStage::Done);
    assert_eq!(report.sensor_data.len(), 1);
    assert_eq!(report.image_data.len(), 1);
    assert_eq!(report.warnings.len(), 2);
    assert_eq!(report.corrosion_findings.len(), 1);
}

#[test]
fn physically_impossible_readings_are_dropped() {
    let baseline = coordinator().run(request().with_images(vec![rusty_plate("img_001")]));
    let readings = vec![
        reading("ut_1", SensorCategory::Thickness, -5.0),
        reading("ph_1", SensorCategory::Ph, 25.0),
        reading("hum_1", SensorCategory::Humidity, 400.0),
    ];
    let report = coordinator().run(
        request()
            .with_readings(readings)
            .with_images(vec![rusty_plate("img_001")]),
    );

    assert_eq!(report.final_stage, SessionStage::Done);
    assert!(report.sensor_data.is_empty());
    assert_eq!(report.warnings.len(), 3);
    assert!(report.warnings[0].contains("ut_1"));
    assert!(report.warnings[1].contains("ph_1"));
    assert!(report.warnings[2].contains("hum_1"));

    let (base, bad) = (baseline.risk_assessment.unwrap(), report.risk_assessment.unwrap());
    assert_eq!(bad.corrosion_level, base.corrosion_level);
    assert!((bad.risk_score - base.risk_score).abs() < 1e-12);
    assert!((bad.max_depth_mm - base.max_depth_mm).abs() < 1e-12);
}

#[test]
fn sensor_limits_come_from_config() {
    let mut config = InspectionConfig::default();
    config.sensors.ph_max = 9.0;
    let coordinator = PipelineCoordinator::new(config).unwrap();
    let report = coordinator.run(request().with_readings(vec![
        reading("ph_1", SensorCategory::Ph, 8.5),
        reading("ph_2", SensorCategory::Ph, 9.5),
    ]));

    assert_eq!(report.sensor_data.len(), 1);
    assert_eq!(report.sensor_data[0].sensor_id, "ph_1");
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("ph_2"));
}

#[test]
fn identical_inputs_give_identical_results() {
    let make = || {
        request()
            .with_readings(optimal_environment())
            .with_images(vec![rusty_plate("a"), clean_plate("b"), rusty_plate("c")])
    };
    let coordinator = coordinator();
    let first = coordinator.run(make());
    let second = coordinator.run(make());

    assert_ne!(first.session_id, second.session_id);
    assert_eq!(first.corrosion_findings, second.corrosion_findings);
    let (a, b) = (first.risk_assessment.unwrap(), second.risk_assessment.unwrap());
    assert_eq!(a.risk_score, b.risk_score);
    assert_eq!(a.factors, b.factors);
    assert_eq!(a.recommendations, b.recommendations);
}

#[test]
fn blank_area_and_inspector_fall_back_to_config() {
    let config = InspectionConfig::default();
    let expected_area = config.platform.default_area.clone();
    let expected_inspector = config.platform.inspector.clone();
    let report = coordinator().run(InspectionRequest::new("PLT-07", "  "));
    assert_eq!(report.area_inspected, expected_area);
    assert_eq!(report.inspector, expected_inspector);

    let report = coordinator().run(request().with_inspector("R. Okafor"));
    assert_eq!(report.inspector, "R. Okafor");
}

#[test]
fn report_json_uses_uppercase_stage_and_level() {
    let report = coordinator().run(request().with_readings(optimal_environment()));
    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["final_stage"], "DONE");
    assert_eq!(json["risk_assessment"]["corrosion_level"], "LOW");
    assert_eq!(json["report_id"], format!("report-{}", report.session_id));
}

// ============================================================================
// Stage failures
// ============================================================================

struct BrokenAnalysis;

impl Stage for BrokenAnalysis {
    fn name(&self) -> &'static str {
        "analyzing"
    }

    fn marker(&self) -> SessionStage {
        SessionStage::Analyzing
    }

    fn apply(&self, _state: &mut SessionState) -> Result<(), InspectionError> {
        Err(InspectionError::stage("analyzing", "detector crashed"))
    }
}

struct Stalled;

impl Stage for Stalled {
    fn name(&self) -> &'static str {
        "analyzing"
    }

    fn marker(&self) -> SessionStage {
        SessionStage::Analyzing
    }

    fn apply(&self, _state: &mut SessionState) -> Result<(), InspectionError> {
        Ok(())
    }
}

struct Panicking;

impl Stage for Panicking {
    fn name(&self) -> &'static str {
        "analyzing"
    }

    fn marker(&self) -> SessionStage {
        SessionStage::Analyzing
    }

    fn apply(&self, _state: &mut SessionState) -> Result<(), InspectionError> {
        panic!("segmentation bug")
    }
}

fn with_analysis(stage: Arc<dyn Stage>) -> PipelineCoordinator {
    let base = coordinator();
    let mut stages = default_stages(base.config(), &Hooks::none());
    stages[1] = stage;
    base.with_stages(stages)
}

fn assert_best_effort_failure(report: &corrosion_sentinel::InspectionReport) {
    assert_eq!(report.final_stage, SessionStage::Failed);
    assert_eq!(report.errors.len(), 1);
    assert!(report.risk_assessment.is_none());
    assert_eq!(report.maintenance_recommendations[0].action_type, "reinspection");
    assert!(report.summary.contains("UNASSESSED"));
    assert_eq!(report.image_data.len(), 1);
}

#[test]
fn stage_error_yields_failed_best_effort_report() {
    let report = with_analysis(Arc::new(BrokenAnalysis)).run(request().with_images(vec![rusty_plate("img_001")]));
    assert_best_effort_failure(&report);
    assert!(report.errors[0].contains("detector crashed"));
}

#[test]
fn stage_that_does_not_advance_fails_the_session() {
    let report = with_analysis(Arc::new(Stalled)).run(request().with_images(vec![rusty_plate("img_001")]));
    assert_best_effort_failure(&report);
}

#[tokio::test]
async fn panicking_stage_fails_the_session_in_async_mode() {
    let report = with_analysis(Arc::new(Panicking))
        .run_async(request().with_images(vec![rusty_plate("img_001")]), CancellationToken::new())
        .await;
    assert_best_effort_failure(&report);
    assert!(report.errors[0].contains("worker aborted"));
}

#[test]
fn invalid_config_is_rejected_before_any_session() {
    let mut config = InspectionConfig::default();
    config.scoring.weights.depth = 0.9;
    let err = PipelineCoordinator::new(config).err().unwrap();
    assert!(matches!(err, InspectionError::Configuration(_)), "got {err}");
}

// ============================================================================
// Async, cancellation and deadlines
// ============================================================================

#[tokio::test]
async fn async_run_matches_blocking_run() {
    let make = || request().with_images(vec![rusty_plate("a"), rusty_plate("b")]);
    let coordinator = coordinator();
    let blocking = coordinator.run(make());
    let async_report = coordinator.run_async(make(), CancellationToken::new()).await;

    assert_eq!(async_report.final_stage, SessionStage::Done);
    assert_eq!(async_report.corrosion_findings, blocking.corrosion_findings);
}

#[tokio::test]
async fn cancelled_before_start_reports_partial_state() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = coordinator()
        .run_async(request().with_images(vec![rusty_plate("img_001")]), cancel)
        .await;

    assert_eq!(report.final_stage, SessionStage::Collecting);
    assert!(report.warnings.contains(&CANCELLED_WARNING.to_string()));
    assert!(report.risk_assessment.is_none());
    assert!(report.corrosion_findings.is_empty());
}

/// Delegates to another stage, then trips a cancellation token.
struct CancelAfter {
    inner: Arc<dyn Stage>,
    cancel: CancellationToken,
}

impl Stage for CancelAfter {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn marker(&self) -> SessionStage {
        self.inner.marker()
    }

    fn apply(&self, state: &mut SessionState) -> Result<(), InspectionError> {
        let result = self.inner.apply(state);
        self.cancel.cancel();
        result
    }
}

#[tokio::test]
async fn cancellation_between_stages_keeps_completed_work() {
    let cancel = CancellationToken::new();
    let base = coordinator();
    let mut stages = default_stages(base.config(), &Hooks::none());
    stages[1] = Arc::new(CancelAfter {
        inner: Arc::clone(&stages[1]),
        cancel: cancel.clone(),
    });
    let coordinator = base.with_stages(stages);

    let report = coordinator
        .run_async(request().with_images(vec![rusty_plate("img_001")]), cancel)
        .await;

    assert_eq!(report.final_stage, SessionStage::Assessing);
    assert_eq!(report.corrosion_findings.len(), 1, "analysis output is kept");
    assert!(report.risk_assessment.is_none());
    assert_eq!(report.warnings, vec![CANCELLED_WARNING.to_string()]);
}

/// Sleeps on the worker before delegating.
struct Slow {
    inner: Arc<dyn Stage>,
    delay: Duration,
}

impl Stage for Slow {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn marker(&self) -> SessionStage {
        self.inner.marker()
    }

    fn apply(&self, state: &mut SessionState) -> Result<(), InspectionError> {
        std::thread::sleep(self.delay);
        self.inner.apply(state)
    }
}

#[tokio::test]
async fn deadline_stops_at_next_stage_boundary() {
    let base = coordinator();
    let mut stages = default_stages(base.config(), &Hooks::none());
    stages[0] = Arc::new(Slow {
        inner: Arc::clone(&stages[0]),
        delay: Duration::from_millis(300),
    });
    let coordinator = base.with_stages(stages);

    let report = coordinator
        .run_with_deadline(request().with_readings(optimal_environment()), Duration::from_millis(20))
        .await;

    // COLLECTING ran to completion, then the expired deadline stopped the session
    assert_eq!(report.final_stage, SessionStage::Assessing);
    assert_eq!(report.sensor_data.len(), 3);
    assert!(report.warnings.contains(&CANCELLED_WARNING.to_string()));
}

#[tokio::test]
async fn generous_deadline_completes_normally() {
    let report = coordinator()
        .run_with_deadline(request().with_images(vec![rusty_plate("img_001")]), Duration::from_secs(30))
        .await;
    assert_eq!(report.final_stage, SessionStage::Done);
    assert!(report.warnings.is_empty());
}

// ============================================================================
// Hooks
// ============================================================================

struct Narrator;

impl SummaryHook for Narrator {
    fn summarize(&self, fields: &SummaryFields) -> anyhow::Result<String> {
        Ok(format!(
            "{} on {}: {} findings, level {}",
            fields.area, fields.platform_id, fields.finding_count, fields.level_label
        ))
    }
}

struct ExtraAdvice;

impl RecommendationHook for ExtraAdvice {
    fn enhance(&self, assessment: &RiskAssessment) -> anyhow::Result<RecommendationEnhancement> {
        Ok(RecommendationEnhancement::Append(vec![format!(
            "Log {} finding(s) in the integrity register",
            assessment.finding_count
        )]))
    }
}

struct Offline;

impl SummaryHook for Offline {
    fn summarize(&self, _fields: &SummaryFields) -> anyhow::Result<String> {
        anyhow::bail!("narrative service unreachable")
    }
}

impl RecommendationHook for Offline {
    fn enhance(&self, _assessment: &RiskAssessment) -> anyhow::Result<RecommendationEnhancement> {
        anyhow::bail!("narrative service unreachable")
    }
}

#[test]
fn hooks_enhance_text_without_touching_structured_fields() {
    let make = || request().with_images(vec![rusty_plate("img_001")]);
    let plain = coordinator().run(make());
    let hooked = coordinator()
        .with_hooks(Hooks {
            summary: Some(Arc::new(Narrator)),
            recommendations: Some(Arc::new(ExtraAdvice)),
        })
        .run(make());

    assert_eq!(hooked.summary, "splash zone leg B2 on PLT-07: 1 findings, level LOW");
    assert!(hooked.warnings.is_empty());
    assert_eq!(hooked.corrosion_findings, plain.corrosion_findings);

    let (p, h) = (plain.risk_assessment.unwrap(), hooked.risk_assessment.unwrap());
    assert_eq!(h.risk_score, p.risk_score);
    assert_eq!(h.corrosion_level, p.corrosion_level);
    assert_eq!(&h.recommendations[..p.recommendations.len()], &p.recommendations[..]);
    assert_eq!(h.recommendations.last().unwrap(), "Log 1 finding(s) in the integrity register");
}

#[test]
fn failing_hooks_fall_back_to_templates_with_warnings() {
    let make = || request().with_readings(optimal_environment());
    let plain = coordinator().run(make());
    let offline = Arc::new(Offline);
    let report = coordinator()
        .with_hooks(Hooks {
            summary: Some(offline.clone()),
            recommendations: Some(offline),
        })
        .run(make());

    assert_eq!(report.final_stage, SessionStage::Done);
    assert_eq!(report.summary, plain.summary);
    assert_eq!(
        report.risk_assessment.unwrap().recommendations,
        plain.risk_assessment.unwrap().recommendations
    );
    assert_eq!(report.warnings.len(), 2);
    assert!(report.warnings[0].starts_with("recommendation hook failed"));
    assert!(report.warnings[1].starts_with("summary hook failed"));
}
