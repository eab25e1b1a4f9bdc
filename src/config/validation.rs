//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Unknown keys are found by parsing into `toml::Value` first and walking the
//! key tree against the known field names. Warnings never break a config.

use std::collections::HashSet;

use super::InspectionConfig;

/// Largest hue representable in the 8-bit HSV convention.
const HUE_CHANNEL_MAX: u8 = 179;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path for `InspectionConfig`.
///
/// Kept in step with the struct hierarchy in inspection_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [platform]
        "platform",
        "platform.inspector",
        "platform.default_area",
        // [detection]
        "detection",
        "detection.hue_min",
        "detection.hue_max",
        "detection.saturation_min",
        "detection.saturation_max",
        "detection.value_min",
        "detection.value_max",
        "detection.median_kernel_size",
        "detection.kernel_size",
        "detection.min_component_area_px",
        "detection.mm_per_pixel",
        "detection.depth_scale_mm",
        "detection.max_depth_mm",
        "detection.uniform_min_solidity",
        "detection.uniform_max_aspect_ratio",
        "detection.localized_min_aspect_ratio",
        "detection.localized_max_solidity",
        "detection.pitting_min_components",
        "detection.pitting_max_area_fraction",
        "detection.parallel",
        // [thickness]
        "thickness",
        "thickness.enabled",
        "thickness.nominal_thickness_mm",
        "thickness.loss_to_depth_ratio",
        "thickness.confidence_boost",
        "thickness.confidence_cap",
        // [sensors]
        "sensors",
        "sensors.thickness_min_mm",
        "sensors.thickness_max_mm",
        "sensors.temperature_min_c",
        "sensors.temperature_max_c",
        "sensors.humidity_min_pct",
        "sensors.humidity_max_pct",
        "sensors.ph_min",
        "sensors.ph_max",
        // [scoring]
        "scoring",
        "scoring.area_saturation_mm2",
        "scoring.depth_saturation_mm",
        "scoring.count_saturation",
        // [scoring.weights]
        "scoring.weights",
        "scoring.weights.area",
        "scoring.weights.depth",
        "scoring.weights.count",
        "scoring.weights.environment",
        // [scoring.levels]
        "scoring.levels",
        "scoring.levels.medium",
        "scoring.levels.high",
        "scoring.levels.critical",
        // [scoring.environment]
        "scoring.environment",
        "scoring.environment.temperature_min_c",
        "scoring.environment.temperature_max_c",
        "scoring.environment.humidity_min_pct",
        "scoring.environment.humidity_max_pct",
        "scoring.environment.ph_center",
        "scoring.environment.ph_tolerance",
        // [schedule]
        "schedule",
        "schedule.low_days",
        "schedule.medium_days",
        "schedule.high_days",
        "schedule.critical_days",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively collect all dotted key paths from a `toml::Value` tree.
///
/// A table `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest known key within edit distance 3. Ties resolve alphabetically.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(unknown, k), *k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Return warnings for any unknown keys in a raw TOML document.
///
/// Syntax errors return no warnings; serde reports them afterwards.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed config.
///
/// Returns (errors, warnings). Errors are impossible values that must block
/// construction; warnings are suspicious but usable.
pub fn validate_physical_ranges(config: &InspectionConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let d = &config.detection;

    if d.hue_min > HUE_CHANNEL_MAX || d.hue_max > HUE_CHANNEL_MAX {
        errors.push(format!(
            "detection.hue_min/hue_max = {}/{} exceed the hue channel range (0-{HUE_CHANNEL_MAX})",
            d.hue_min, d.hue_max
        ));
    }

    // Camera calibration: 1 um to 10 mm per pixel covers macro lenses to drone survey
    if d.mm_per_pixel.is_finite() && (d.mm_per_pixel < 0.001 || d.mm_per_pixel > 10.0) {
        warnings.push(ValidationWarning {
            field: "detection.mm_per_pixel".to_string(),
            message: format!(
                "mm_per_pixel = {:.4} is outside typical range (0.001-10 mm)",
                d.mm_per_pixel
            ),
            suggestion: None,
        });
    }

    if d.min_component_area_px == 0 {
        warnings.push(ValidationWarning {
            field: "detection.min_component_area_px".to_string(),
            message: "min_component_area_px = 0 keeps single-pixel noise as findings".to_string(),
            suggestion: None,
        });
    }

    if d.kernel_size > 31 {
        warnings.push(ValidationWarning {
            field: "detection.kernel_size".to_string(),
            message: format!(
                "kernel_size = {} will erase most regions below {} px across",
                d.kernel_size, d.kernel_size
            ),
            suggestion: None,
        });
    }

    let t = &config.thickness;
    if t.nominal_thickness_mm.is_finite() && t.nominal_thickness_mm > 0.0 {
        if d.max_depth_mm > t.nominal_thickness_mm {
            errors.push(format!(
                "detection.max_depth_mm = {:.2} exceeds thickness.nominal_thickness_mm = {:.2}",
                d.max_depth_mm, t.nominal_thickness_mm
            ));
        }
        if t.nominal_thickness_mm > 200.0 {
            warnings.push(ValidationWarning {
                field: "thickness.nominal_thickness_mm".to_string(),
                message: format!(
                    "nominal_thickness_mm = {:.1} is outside typical range (0-200 mm)",
                    t.nominal_thickness_mm
                ),
                suggestion: None,
            });
        }
    }

    if t.loss_to_depth_ratio > 1.0 {
        warnings.push(ValidationWarning {
            field: "thickness.loss_to_depth_ratio".to_string(),
            message: format!(
                "loss_to_depth_ratio = {:.2} attributes more than the measured loss to corrosion",
                t.loss_to_depth_ratio
            ),
            suggestion: None,
        });
    }

    let e = &config.scoring.environment;
    if !(0.0..=14.0).contains(&e.ph_center) {
        errors.push(format!(
            "scoring.environment.ph_center = {:.2} is outside the pH scale (0-14)",
            e.ph_center
        ));
    }
    if e.humidity_min_pct < 0.0 || e.humidity_max_pct > 100.0 {
        errors.push(format!(
            "scoring.environment.humidity = {:.1}-{:.1} is outside 0-100 %",
            e.humidity_min_pct, e.humidity_max_pct
        ));
    }
    if e.temperature_min_c < -60.0 || e.temperature_max_c > 120.0 {
        warnings.push(ValidationWarning {
            field: "scoring.environment.temperature".to_string(),
            message: format!(
                "temperature range {:.1}-{:.1} C is outside typical service conditions (-60-120 C)",
                e.temperature_min_c, e.temperature_max_c
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
