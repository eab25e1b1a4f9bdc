//! Per-level recommendation templates
//!
//! Recommendations depend on the corrosion level alone, never on the raw
//! score, so two sessions in the same band always receive identical guidance.

use crate::types::CorrosionLevel;

const LOW: &[&str] = &[
    "Continue scheduled inspections at the routine interval",
    "Maintain the existing protective coating",
    "Monitor environmental conditions for changes",
];

const MEDIUM: &[&str] = &[
    "Shorten the inspection interval to every 3 months",
    "Treat affected areas with local surface preparation and recoating",
    "Review and update corrosion protection measures",
    "Assess environmental controls (drainage, ventilation, humidity)",
];

const HIGH: &[&str] = &[
    "Schedule repair work on affected areas at the next available window",
    "Increase inspection frequency to monthly",
    "Replace the protective coating system on affected members",
    "Evaluate cathodic protection performance",
    "Prepare a detailed repair plan with structural review",
];

const CRITICAL: &[&str] = &[
    "Stop equipment operation in the affected area at the next shutdown window",
    "Mobilize the emergency repair team",
    "Perform weekly safety checks until repairs are complete",
    "Reassess structural integrity before returning to service",
    "Consider replacement of severely corroded components",
];

pub fn level_template(level: CorrosionLevel) -> &'static [&'static str] {
    match level {
        CorrosionLevel::Low => LOW,
        CorrosionLevel::Medium => MEDIUM,
        CorrosionLevel::High => HIGH,
        CorrosionLevel::Critical => CRITICAL,
    }
}

/// Owned recommendation list for `level`.
pub fn recommendations_for(level: CorrosionLevel) -> Vec<String> {
    level_template(level).iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_level_has_guidance() {
        for level in [
            CorrosionLevel::Low,
            CorrosionLevel::Medium,
            CorrosionLevel::High,
            CorrosionLevel::Critical,
        ] {
            assert!(!recommendations_for(level).is_empty(), "{level} has no template");
        }
    }

    #[test]
    fn test_critical_starts_with_shutdown_action() {
        assert!(recommendations_for(CorrosionLevel::Critical)[0].contains("shutdown"));
    }
}
