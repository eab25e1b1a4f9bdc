//! Inspection Configuration - every calibration constant as an operator-tunable TOML value
//!
//! Each struct implements `Default` with the calibrated values, so a missing
//! file (or a missing section) behaves exactly like the built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults::{CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE, WEIGHT_SUM_TOLERANCE};
use crate::types::SensorCategory;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an inspection deployment.
///
/// Constructed once, validated, and handed to `PipelineCoordinator::new`.
/// Load with `InspectionConfig::load()` which searches:
/// 1. `$CORROSION_CONFIG` env var
/// 2. `./inspection.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InspectionConfig {
    /// Report header metadata
    #[serde(default)]
    pub platform: PlatformInfo,

    /// Image-based rust detection calibration
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Thickness-gauge fusion into findings
    #[serde(default)]
    pub thickness: ThicknessConfig,

    /// Physically plausible reading ranges; readings outside are dropped
    #[serde(default)]
    pub sensors: SensorLimits,

    /// Risk scoring weights, saturations and level bands
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Re-inspection intervals per level
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl InspectionConfig {
    /// Load configuration using the standard search order:
    /// 1. `$CORROSION_CONFIG` environment variable
    /// 2. `./inspection.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// A file that exists but fails to parse or validate is an error; only a
    /// missing file falls through to the next source.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                let config = Self::load_from_file(&p)?;
                info!(path = %p.display(), "Loaded inspection config from {}", CONFIG_ENV_VAR);
                return Ok(config);
            }
            warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            let config = Self::load_from_file(&local)?;
            info!("Loaded inspection config from ./{}", DEFAULT_CONFIG_FILE);
            return Ok(config);
        }

        info!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::parse_toml(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys are logged, not rejected.
    pub fn parse_toml(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Every numeric value must be finite
    /// - Color bands must satisfy min <= max and stay inside channel range
    /// - Morphology kernel must be odd and non-zero
    /// - Factor weights must sum to approximately 1.0
    /// - Level thresholds must be strictly increasing inside (0, 1]
    /// - Saturations and intervals must be positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        for (name, value) in self.numeric_fields() {
            if !value.is_finite() {
                errors.push(format!("{name} must be a finite number (got {value})"));
            }
        }

        let d = &self.detection;
        Self::check_band(f64::from(d.hue_min), f64::from(d.hue_max), "detection.hue", &mut errors);
        Self::check_band(
            f64::from(d.saturation_min),
            f64::from(d.saturation_max),
            "detection.saturation",
            &mut errors,
        );
        Self::check_band(
            f64::from(d.value_min),
            f64::from(d.value_max),
            "detection.value",
            &mut errors,
        );
        if d.kernel_size == 0 || d.kernel_size % 2 == 0 {
            errors.push(format!(
                "detection.kernel_size must be odd and > 0 (got {})",
                d.kernel_size
            ));
        }
        if d.median_kernel_size != 0 && d.median_kernel_size % 2 == 0 {
            errors.push(format!(
                "detection.median_kernel_size must be 0 or odd (got {})",
                d.median_kernel_size
            ));
        }
        if d.mm_per_pixel <= 0.0 {
            errors.push("detection.mm_per_pixel must be > 0".to_string());
        }
        if d.depth_scale_mm <= 0.0 {
            errors.push("detection.depth_scale_mm must be > 0".to_string());
        }
        if d.max_depth_mm <= 0.0 {
            errors.push("detection.max_depth_mm must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&d.uniform_min_solidity) {
            errors.push("detection.uniform_min_solidity must be in [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&d.localized_max_solidity) {
            errors.push("detection.localized_max_solidity must be in [0, 1]".to_string());
        }
        if d.uniform_max_aspect_ratio < 1.0 {
            errors.push("detection.uniform_max_aspect_ratio must be >= 1".to_string());
        }
        if d.localized_min_aspect_ratio <= d.uniform_max_aspect_ratio {
            errors.push(format!(
                "detection.localized_min_aspect_ratio ({:.2}) must be > uniform_max_aspect_ratio ({:.2})",
                d.localized_min_aspect_ratio, d.uniform_max_aspect_ratio
            ));
        }
        if d.localized_max_solidity >= d.uniform_min_solidity {
            errors.push(format!(
                "detection.localized_max_solidity ({:.2}) must be < uniform_min_solidity ({:.2})",
                d.localized_max_solidity, d.uniform_min_solidity
            ));
        }
        if d.pitting_min_components == 0 {
            errors.push("detection.pitting_min_components must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&d.pitting_max_area_fraction) {
            errors.push("detection.pitting_max_area_fraction must be in [0, 1]".to_string());
        }

        let t = &self.thickness;
        if t.nominal_thickness_mm <= 0.0 {
            errors.push("thickness.nominal_thickness_mm must be > 0".to_string());
        }
        if t.loss_to_depth_ratio < 0.0 {
            errors.push("thickness.loss_to_depth_ratio must be >= 0".to_string());
        }
        if !(0.0..=1.0).contains(&t.confidence_cap) {
            errors.push("thickness.confidence_cap must be in [0, 1]".to_string());
        }

        let l = &self.sensors;
        for (name, min, max) in [
            ("sensors.thickness", l.thickness_min_mm, l.thickness_max_mm),
            ("sensors.temperature", l.temperature_min_c, l.temperature_max_c),
            ("sensors.humidity", l.humidity_min_pct, l.humidity_max_pct),
            ("sensors.ph", l.ph_min, l.ph_max),
        ] {
            Self::check_band(min, max, name, &mut errors);
        }

        let s = &self.scoring;
        if s.area_saturation_mm2 <= 0.0 {
            errors.push("scoring.area_saturation_mm2 must be > 0".to_string());
        }
        if s.depth_saturation_mm <= 0.0 {
            errors.push("scoring.depth_saturation_mm must be > 0".to_string());
        }
        if s.count_saturation == 0 {
            errors.push("scoring.count_saturation must be > 0".to_string());
        }

        // Factor weights: must sum to ~1.0 so the weighted score stays in [0, 1]
        let w = &s.weights;
        if [w.area, w.depth, w.count, w.environment].iter().any(|v| *v < 0.0) {
            errors.push("scoring.weights must all be >= 0".to_string());
        }
        let weight_sum = w.area + w.depth + w.count + w.environment;
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.push(format!("scoring.weights must sum to ~1.0, got {weight_sum:.3}"));
        }

        let l = &s.levels;
        if !(0.0 < l.medium && l.medium < l.high && l.high < l.critical && l.critical <= 1.0) {
            errors.push(format!(
                "scoring.levels must satisfy 0 < medium < high < critical <= 1 (got {:.2}/{:.2}/{:.2})",
                l.medium, l.high, l.critical
            ));
        }

        let e = &s.environment;
        Self::check_band(
            e.temperature_min_c,
            e.temperature_max_c,
            "scoring.environment.temperature",
            &mut errors,
        );
        Self::check_band(
            e.humidity_min_pct,
            e.humidity_max_pct,
            "scoring.environment.humidity",
            &mut errors,
        );
        if e.temperature_max_c <= e.temperature_min_c {
            errors.push("scoring.environment.temperature range must have non-zero width".to_string());
        }
        if e.humidity_max_pct <= e.humidity_min_pct {
            errors.push("scoring.environment.humidity range must have non-zero width".to_string());
        }
        if e.ph_tolerance <= 0.0 {
            errors.push("scoring.environment.ph_tolerance must be > 0".to_string());
        }

        let sc = &self.schedule;
        if [sc.low_days, sc.medium_days, sc.high_days, sc.critical_days].contains(&0) {
            errors.push("schedule intervals must all be > 0 days".to_string());
        }
        if !(sc.low_days >= sc.medium_days
            && sc.medium_days >= sc.high_days
            && sc.high_days >= sc.critical_days)
        {
            errors.push(
                "schedule intervals must not lengthen as severity increases".to_string(),
            );
        }

        // Physical range validation
        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_band(min: f64, max: f64, name: &str, errors: &mut Vec<String>) {
        if !min.is_finite() || !max.is_finite() {
            return;
        }
        if min > max {
            errors.push(format!("{name}: min ({min:.2}) must be <= max ({max:.2})"));
        }
    }

    /// All floating-point fields with their dotted names.
    fn numeric_fields(&self) -> Vec<(&'static str, f64)> {
        let d = &self.detection;
        let t = &self.thickness;
        let s = &self.scoring;
        vec![
            ("detection.mm_per_pixel", d.mm_per_pixel),
            ("detection.depth_scale_mm", d.depth_scale_mm),
            ("detection.max_depth_mm", d.max_depth_mm),
            ("detection.uniform_min_solidity", d.uniform_min_solidity),
            ("detection.uniform_max_aspect_ratio", d.uniform_max_aspect_ratio),
            ("detection.localized_min_aspect_ratio", d.localized_min_aspect_ratio),
            ("detection.localized_max_solidity", d.localized_max_solidity),
            ("detection.pitting_max_area_fraction", d.pitting_max_area_fraction),
            ("thickness.nominal_thickness_mm", t.nominal_thickness_mm),
            ("thickness.loss_to_depth_ratio", t.loss_to_depth_ratio),
            ("thickness.confidence_boost", t.confidence_boost),
            ("thickness.confidence_cap", t.confidence_cap),
            ("sensors.thickness_min_mm", self.sensors.thickness_min_mm),
            ("sensors.thickness_max_mm", self.sensors.thickness_max_mm),
            ("sensors.temperature_min_c", self.sensors.temperature_min_c),
            ("sensors.temperature_max_c", self.sensors.temperature_max_c),
            ("sensors.humidity_min_pct", self.sensors.humidity_min_pct),
            ("sensors.humidity_max_pct", self.sensors.humidity_max_pct),
            ("sensors.ph_min", self.sensors.ph_min),
            ("sensors.ph_max", self.sensors.ph_max),
            ("scoring.area_saturation_mm2", s.area_saturation_mm2),
            ("scoring.depth_saturation_mm", s.depth_saturation_mm),
            ("scoring.weights.area", s.weights.area),
            ("scoring.weights.depth", s.weights.depth),
            ("scoring.weights.count", s.weights.count),
            ("scoring.weights.environment", s.weights.environment),
            ("scoring.levels.medium", s.levels.medium),
            ("scoring.levels.high", s.levels.high),
            ("scoring.levels.critical", s.levels.critical),
            ("scoring.environment.temperature_min_c", s.environment.temperature_min_c),
            ("scoring.environment.temperature_max_c", s.environment.temperature_max_c),
            ("scoring.environment.humidity_min_pct", s.environment.humidity_min_pct),
            ("scoring.environment.humidity_max_pct", s.environment.humidity_max_pct),
            ("scoring.environment.ph_center", s.environment.ph_center),
            ("scoring.environment.ph_tolerance", s.environment.ph_tolerance),
        ]
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, std::io::Error),

    #[error("config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, toml::de::Error),

    #[error("config serialization error: {0}")]
    Serialize(toml::ser::Error),

    #[error("config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Platform Info
// ============================================================================

/// Identification metadata: not used for logic, but appears in logs and reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformInfo {
    /// Inspector name written into every report header
    #[serde(default = "default_inspector")]
    pub inspector: String,

    /// Area label used when a request leaves it blank
    #[serde(default = "default_area")]
    pub default_area: String,
}

fn default_inspector() -> String {
    "Corrosion Sentinel".to_string()
}
fn default_area() -> String {
    "unspecified".to_string()
}

impl Default for PlatformInfo {
    fn default() -> Self {
        Self {
            inspector: default_inspector(),
            default_area: default_area(),
        }
    }
}

// ============================================================================
// Detection
// ============================================================================

/// Rust-color band, morphology and shape-classification calibration.
///
/// Channels follow the 8-bit HSV convention: hue 0-179, saturation and value 0-255.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionConfig {
    #[serde(default = "default_hue_min")]
    pub hue_min: u8,
    #[serde(default = "default_hue_max")]
    pub hue_max: u8,
    #[serde(default = "default_saturation_min")]
    pub saturation_min: u8,
    #[serde(default = "default_channel_max")]
    pub saturation_max: u8,
    #[serde(default = "default_value_min")]
    pub value_min: u8,
    #[serde(default = "default_channel_max")]
    pub value_max: u8,

    /// Median denoise window applied before HSV conversion (pixels, odd; 0 disables)
    #[serde(default)]
    pub median_kernel_size: u32,

    /// Square structuring element side (pixels, odd)
    #[serde(default = "default_kernel_size")]
    pub kernel_size: u32,

    /// Components smaller than this are discarded as noise (pixels)
    #[serde(default = "default_min_component_area")]
    pub min_component_area_px: u32,

    /// Physical size of one pixel edge (mm)
    #[serde(default = "default_mm_per_pixel")]
    pub mm_per_pixel: f64,

    /// Depth assigned to a component whose mean rust signal is 1.0 (mm)
    #[serde(default = "default_depth_scale")]
    pub depth_scale_mm: f64,

    /// Upper clamp for any depth estimate (mm)
    #[serde(default = "default_max_depth")]
    pub max_depth_mm: f64,

    #[serde(default = "default_uniform_solidity")]
    pub uniform_min_solidity: f64,
    #[serde(default = "default_uniform_aspect")]
    pub uniform_max_aspect_ratio: f64,
    #[serde(default = "default_localized_aspect")]
    pub localized_min_aspect_ratio: f64,
    #[serde(default = "default_localized_solidity")]
    pub localized_max_solidity: f64,

    /// Minimum surviving components in one image before small ones count as pits
    #[serde(default = "default_pitting_components")]
    pub pitting_min_components: usize,

    /// A pit covers at most this fraction of the image
    #[serde(default = "default_pitting_fraction")]
    pub pitting_max_area_fraction: f64,

    /// Analyze images on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_hue_min() -> u8 { 5 }
fn default_hue_max() -> u8 { 25 }
fn default_saturation_min() -> u8 { 50 }
fn default_value_min() -> u8 { 50 }
fn default_channel_max() -> u8 { 255 }
fn default_kernel_size() -> u32 { 5 }
fn default_min_component_area() -> u32 { 100 }
fn default_mm_per_pixel() -> f64 { 0.1 }
fn default_depth_scale() -> f64 { 3.0 }
fn default_max_depth() -> f64 { 2.5 }
fn default_uniform_solidity() -> f64 { 0.85 }
fn default_uniform_aspect() -> f64 { 1.5 }
fn default_localized_aspect() -> f64 { 3.0 }
fn default_localized_solidity() -> f64 { 0.6 }
fn default_pitting_components() -> usize { 4 }
fn default_pitting_fraction() -> f64 { 0.01 }
fn default_true() -> bool { true }

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            hue_min: default_hue_min(),
            hue_max: default_hue_max(),
            saturation_min: default_saturation_min(),
            saturation_max: default_channel_max(),
            value_min: default_value_min(),
            value_max: default_channel_max(),
            median_kernel_size: 0,
            kernel_size: default_kernel_size(),
            min_component_area_px: default_min_component_area(),
            mm_per_pixel: default_mm_per_pixel(),
            depth_scale_mm: default_depth_scale(),
            max_depth_mm: default_max_depth(),
            uniform_min_solidity: default_uniform_solidity(),
            uniform_max_aspect_ratio: default_uniform_aspect(),
            localized_min_aspect_ratio: default_localized_aspect(),
            localized_max_solidity: default_localized_solidity(),
            pitting_min_components: default_pitting_components(),
            pitting_max_area_fraction: default_pitting_fraction(),
            parallel: default_true(),
        }
    }
}

// ============================================================================
// Thickness Fusion
// ============================================================================

/// Ultrasonic thickness readings refine image-derived depth estimates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThicknessConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// As-built wall thickness (mm)
    #[serde(default = "default_nominal_thickness")]
    pub nominal_thickness_mm: f64,

    /// Fraction of measured wall loss attributed to visible corrosion depth
    #[serde(default = "default_loss_ratio")]
    pub loss_to_depth_ratio: f64,

    #[serde(default = "default_confidence_boost")]
    pub confidence_boost: f64,

    #[serde(default = "default_confidence_cap")]
    pub confidence_cap: f64,
}

fn default_nominal_thickness() -> f64 { 12.0 }
fn default_loss_ratio() -> f64 { 0.8 }
fn default_confidence_boost() -> f64 { 0.05 }
fn default_confidence_cap() -> f64 { 0.95 }

impl Default for ThicknessConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            nominal_thickness_mm: default_nominal_thickness(),
            loss_to_depth_ratio: default_loss_ratio(),
            confidence_boost: default_confidence_boost(),
            confidence_cap: default_confidence_cap(),
        }
    }
}

// ============================================================================
// Sensor Limits
// ============================================================================

/// Physical measuring ranges per category. Conductivity and pressure are
/// unbounded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorLimits {
    #[serde(default = "default_thickness_min")]
    pub thickness_min_mm: f64,
    #[serde(default = "default_thickness_max")]
    pub thickness_max_mm: f64,
    #[serde(default = "default_sensor_temp_min")]
    pub temperature_min_c: f64,
    #[serde(default = "default_sensor_temp_max")]
    pub temperature_max_c: f64,
    #[serde(default = "default_sensor_humidity_min")]
    pub humidity_min_pct: f64,
    #[serde(default = "default_sensor_humidity_max")]
    pub humidity_max_pct: f64,
    #[serde(default = "default_ph_min")]
    pub ph_min: f64,
    #[serde(default = "default_ph_max")]
    pub ph_max: f64,
}

fn default_thickness_min() -> f64 { 0.0 }
fn default_thickness_max() -> f64 { 50.0 }
fn default_sensor_temp_min() -> f64 { -50.0 }
fn default_sensor_temp_max() -> f64 { 100.0 }
fn default_sensor_humidity_min() -> f64 { 0.0 }
fn default_sensor_humidity_max() -> f64 { 100.0 }
fn default_ph_min() -> f64 { 0.0 }
fn default_ph_max() -> f64 { 14.0 }

impl SensorLimits {
    /// Inclusive `(min, max)` for `category`, or `None` when unbounded.
    pub fn range_for(&self, category: SensorCategory) -> Option<(f64, f64)> {
        match category {
            SensorCategory::Thickness => Some((self.thickness_min_mm, self.thickness_max_mm)),
            SensorCategory::Temperature => Some((self.temperature_min_c, self.temperature_max_c)),
            SensorCategory::Humidity => Some((self.humidity_min_pct, self.humidity_max_pct)),
            SensorCategory::Ph => Some((self.ph_min, self.ph_max)),
            SensorCategory::Conductivity | SensorCategory::Pressure => None,
        }
    }
}

impl Default for SensorLimits {
    fn default() -> Self {
        Self {
            thickness_min_mm: default_thickness_min(),
            thickness_max_mm: default_thickness_max(),
            temperature_min_c: default_sensor_temp_min(),
            temperature_max_c: default_sensor_temp_max(),
            humidity_min_pct: default_sensor_humidity_min(),
            humidity_max_pct: default_sensor_humidity_max(),
            ph_min: default_ph_min(),
            ph_max: default_ph_max(),
        }
    }
}

// ============================================================================
// Scoring
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Total finding area at which the area factor saturates (mm²)
    #[serde(default = "default_area_saturation")]
    pub area_saturation_mm2: f64,

    /// Finding depth at which the depth factor saturates (mm)
    #[serde(default = "default_depth_saturation")]
    pub depth_saturation_mm: f64,

    /// Finding count at which the count factor saturates
    #[serde(default = "default_count_saturation")]
    pub count_saturation: usize,

    #[serde(default)]
    pub weights: FactorWeights,

    #[serde(default)]
    pub levels: LevelThresholds,

    #[serde(default)]
    pub environment: EnvironmentRanges,
}

fn default_area_saturation() -> f64 { 5000.0 }
fn default_depth_saturation() -> f64 { 3.0 }
fn default_count_saturation() -> usize { 10 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            area_saturation_mm2: default_area_saturation(),
            depth_saturation_mm: default_depth_saturation(),
            count_saturation: default_count_saturation(),
            weights: FactorWeights::default(),
            levels: LevelThresholds::default(),
            environment: EnvironmentRanges::default(),
        }
    }
}

/// Factor weights; must sum to ~1.0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactorWeights {
    #[serde(default = "default_weight_area")]
    pub area: f64,
    #[serde(default = "default_weight_depth")]
    pub depth: f64,
    #[serde(default = "default_weight_count")]
    pub count: f64,
    #[serde(default = "default_weight_environment")]
    pub environment: f64,
}

fn default_weight_area() -> f64 { 0.30 }
fn default_weight_depth() -> f64 { 0.40 }
fn default_weight_count() -> f64 { 0.20 }
fn default_weight_environment() -> f64 { 0.10 }

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            area: default_weight_area(),
            depth: default_weight_depth(),
            count: default_weight_count(),
            environment: default_weight_environment(),
        }
    }
}

/// Lower bounds of the MEDIUM, HIGH and CRITICAL bands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelThresholds {
    #[serde(default = "default_level_medium")]
    pub medium: f64,
    #[serde(default = "default_level_high")]
    pub high: f64,
    #[serde(default = "default_level_critical")]
    pub critical: f64,
}

fn default_level_medium() -> f64 { 0.30 }
fn default_level_high() -> f64 { 0.60 }
fn default_level_critical() -> f64 { 0.80 }

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            medium: default_level_medium(),
            high: default_level_high(),
            critical: default_level_critical(),
        }
    }
}

/// Benign environmental conditions; distance from their midpoints raises risk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentRanges {
    #[serde(default = "default_temp_min")]
    pub temperature_min_c: f64,
    #[serde(default = "default_temp_max")]
    pub temperature_max_c: f64,
    #[serde(default = "default_humidity_min")]
    pub humidity_min_pct: f64,
    #[serde(default = "default_humidity_max")]
    pub humidity_max_pct: f64,
    #[serde(default = "default_ph_center")]
    pub ph_center: f64,
    /// pH deviation that saturates the pH sub-term
    #[serde(default = "default_ph_tolerance")]
    pub ph_tolerance: f64,
}

fn default_temp_min() -> f64 { 15.0 }
fn default_temp_max() -> f64 { 35.0 }
fn default_humidity_min() -> f64 { 60.0 }
fn default_humidity_max() -> f64 { 90.0 }
fn default_ph_center() -> f64 { 8.0 }
fn default_ph_tolerance() -> f64 { 2.0 }

impl Default for EnvironmentRanges {
    fn default() -> Self {
        Self {
            temperature_min_c: default_temp_min(),
            temperature_max_c: default_temp_max(),
            humidity_min_pct: default_humidity_min(),
            humidity_max_pct: default_humidity_max(),
            ph_center: default_ph_center(),
            ph_tolerance: default_ph_tolerance(),
        }
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// Days until the next inspection, per corrosion level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleConfig {
    #[serde(default = "default_low_days")]
    pub low_days: u32,
    #[serde(default = "default_medium_days")]
    pub medium_days: u32,
    #[serde(default = "default_high_days")]
    pub high_days: u32,
    #[serde(default = "default_critical_days")]
    pub critical_days: u32,
}

fn default_low_days() -> u32 { 180 }
fn default_medium_days() -> u32 { 90 }
fn default_high_days() -> u32 { 30 }
fn default_critical_days() -> u32 { 7 }

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            low_days: default_low_days(),
            medium_days: default_medium_days(),
            high_days: default_high_days(),
            critical_days: default_critical_days(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = InspectionConfig::default();
        assert!(config.validate().is_ok(), "Default config must pass validation");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config = InspectionConfig::parse_toml("").unwrap();
        assert_eq!(config, InspectionConfig::default());
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[detection]
kernel_size = 3

[scoring.weights]
area = 0.25
depth = 0.45
"#;
        let config = InspectionConfig::parse_toml(toml_str).unwrap();
        assert_eq!(config.detection.kernel_size, 3);
        assert_eq!(config.detection.hue_min, 5);
        assert!((config.scoring.weights.depth - 0.45).abs() < 1e-12);
        assert!((config.scoring.weights.count - 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_sensor_limits_defaults_and_override() {
        let config = InspectionConfig::parse_toml("[sensors]\nph_max = 12.0\n").unwrap();
        assert_eq!(config.sensors.range_for(SensorCategory::Ph), Some((0.0, 12.0)));
        assert_eq!(config.sensors.range_for(SensorCategory::Thickness), Some((0.0, 50.0)));
        assert_eq!(config.sensors.range_for(SensorCategory::Pressure), None);
    }

    #[test]
    fn test_inverted_sensor_limits_rejected() {
        let mut config = InspectionConfig::default();
        config.sensors.humidity_min_pct = 90.0;
        config.sensors.humidity_max_pct = 10.0;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.starts_with("sensors.humidity")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_catches_even_kernel() {
        let mut config = InspectionConfig::default();
        config.detection.kernel_size = 4;
        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("expected validation failure");
        };
        assert!(errors.iter().any(|e| e.contains("kernel_size")));
    }

    #[test]
    fn test_validation_catches_bad_weights() {
        let mut config = InspectionConfig::default();
        config.scoring.weights.area = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_catches_unordered_levels() {
        let mut config = InspectionConfig::default();
        config.scoring.levels.high = 0.25;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_catches_nan() {
        let mut config = InspectionConfig::default();
        config.detection.mm_per_pixel = f64::NAN;
        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("expected validation failure");
        };
        assert!(errors.iter().any(|e| e.contains("finite")));
    }

    #[test]
    fn test_validation_catches_inverted_hue_band() {
        let mut config = InspectionConfig::default();
        config.detection.hue_min = 30;
        config.detection.hue_max = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_toml() {
        let config = InspectionConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = InspectionConfig::parse_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }
}
