//! Risk Scoring Module
//!
//! Deterministic multi-factor risk score for one inspection session.
//!
//! # Scoring Algorithm
//!
//! Four factors, each normalized to [0, 1] before weighting:
//! - Area (default 30%): total finding area / `area_saturation_mm2`
//! - Depth (default 40%): maximum finding depth / `depth_saturation_mm`
//! - Count (default 20%): number of findings / `count_saturation`
//! - Environment (default 10%): mean of the temperature, humidity and pH
//!   sub-terms, each the distance of the category mean from its benign
//!   midpoint over the half-width of the benign range
//!
//! A sensor category without readings contributes 0 to its sub-term.
//! The weighted sum is clamped to [0, 1] and banded into a `CorrosionLevel`.

pub mod templates;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::defaults::BASELINE_RECOMMENDATION;
use crate::config::{EnvironmentRanges, ScoringConfig};
use crate::types::{
    factor, mean_for, CorrosionFinding, CorrosionLevel, RiskAssessment, SensorCategory, SensorReading,
};

/// Unweighted factor values, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FactorBreakdown {
    pub area: f64,
    pub depth: f64,
    pub count: f64,
    pub environment: f64,
}

pub struct RiskScorer {
    config: ScoringConfig,
}

impl RiskScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Score a session's findings and readings. Total: any input yields a
    /// valid assessment.
    pub fn score(
        &self,
        assessment_id: impl Into<String>,
        findings: &[CorrosionFinding],
        readings: &[SensorReading],
        assessed_at: DateTime<Utc>,
    ) -> RiskAssessment {
        let total_area_mm2: f64 = findings.iter().map(|f| f.area_mm2).sum();
        let max_depth_mm = findings.iter().map(|f| f.depth_mm).fold(0.0, f64::max);

        let breakdown = self.breakdown(total_area_mm2, max_depth_mm, findings.len(), readings);
        let w = &self.config.weights;

        let mut factors = BTreeMap::new();
        factors.insert(factor::AREA.to_string(), breakdown.area * w.area);
        factors.insert(factor::DEPTH.to_string(), breakdown.depth * w.depth);
        factors.insert(factor::COUNT.to_string(), breakdown.count * w.count);
        factors.insert(factor::ENVIRONMENT.to_string(), breakdown.environment * w.environment);

        let risk_score = unit(factors.values().sum());
        let corrosion_level = CorrosionLevel::from_score(risk_score, &self.config.levels);

        let recommendations = if findings.is_empty() && readings.is_empty() {
            vec![BASELINE_RECOMMENDATION.to_string()]
        } else {
            templates::recommendations_for(corrosion_level)
        };

        debug!(
            risk_score,
            level = %corrosion_level,
            findings = findings.len(),
            readings = readings.len(),
            "Risk scored"
        );

        RiskAssessment {
            assessment_id: assessment_id.into(),
            corrosion_level,
            risk_score,
            factors,
            recommendations,
            urgency: corrosion_level.urgency(),
            total_area_mm2,
            max_depth_mm,
            finding_count: findings.len(),
            assessed_at,
        }
    }

    pub fn breakdown(
        &self,
        total_area_mm2: f64,
        max_depth_mm: f64,
        finding_count: usize,
        readings: &[SensorReading],
    ) -> FactorBreakdown {
        let c = &self.config;
        FactorBreakdown {
            area: unit(total_area_mm2 / c.area_saturation_mm2),
            depth: unit(max_depth_mm / c.depth_saturation_mm),
            count: unit(finding_count as f64 / c.count_saturation as f64),
            environment: environment_factor(readings, &c.environment),
        }
    }
}

/// Mean of the three environmental sub-terms, unweighted.
pub fn environment_factor(readings: &[SensorReading], env: &EnvironmentRanges) -> f64 {
    let temperature = mean_for(readings, SensorCategory::Temperature).map_or(0.0, |t| {
        distance_from_range(t, env.temperature_min_c, env.temperature_max_c)
    });
    let humidity = mean_for(readings, SensorCategory::Humidity).map_or(0.0, |h| {
        distance_from_range(h, env.humidity_min_pct, env.humidity_max_pct)
    });
    let ph = mean_for(readings, SensorCategory::Ph)
        .map_or(0.0, |p| unit((p - env.ph_center).abs() / env.ph_tolerance));

    unit((temperature + humidity + ph) / 3.0)
}

/// Distance from the range midpoint over the half-width, clamped to 1.
fn distance_from_range(value: f64, min: f64, max: f64) -> f64 {
    let mid = (min + max) / 2.0;
    let half_width = (max - min) / 2.0;
    unit((value - mid).abs() / half_width)
}

/// Clamp to [0, 1]; NaN maps to 0.
fn unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
