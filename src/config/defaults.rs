//! System-wide default constants.
//!
//! Calibration values live in `InspectionConfig`; this file holds the fixed
//! names, messages and tolerances that are not operator-tunable.

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable holding an explicit config file path.
pub const CONFIG_ENV_VAR: &str = "CORROSION_CONFIG";

/// Config file searched for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "inspection.toml";

/// Allowed deviation of the factor weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

// ============================================================================
// Pipeline
// ============================================================================

/// Warning attached to a report when the caller cancels between stages.
pub const CANCELLED_WARNING: &str = "cancelled before completion";

/// Warning attached when intake yields neither readings nor images.
pub const NO_USABLE_INPUT_WARNING: &str = "no usable input: analysis skipped";

// ============================================================================
// Scoring
// ============================================================================

/// The single recommendation issued when a session has nothing to score.
pub const BASELINE_RECOMMENDATION: &str = "Insufficient data: schedule baseline inspection";

// ============================================================================
// Reporting
// ============================================================================

/// Level label used in summaries of sessions that never produced an assessment.
pub const UNASSESSED_LABEL: &str = "UNASSESSED";
