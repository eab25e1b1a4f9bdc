//! Structured maintenance work items per corrosion level.

use crate::types::{CorrosionLevel, MaintenanceRecommendation};

struct WorkItem {
    id: &'static str,
    priority: u8,
    action_type: &'static str,
    description: &'static str,
    cost: Option<f64>,
    hours: Option<u32>,
    resources: &'static [&'static str],
}

impl WorkItem {
    fn to_recommendation(&self) -> MaintenanceRecommendation {
        MaintenanceRecommendation {
            recommendation_id: self.id.to_string(),
            priority: self.priority,
            action_type: self.action_type.to_string(),
            description: self.description.to_string(),
            estimated_cost: self.cost,
            estimated_duration_hours: self.hours,
            required_resources: self.resources.iter().map(|r| (*r).to_string()).collect(),
        }
    }
}

const PREVENTIVE: WorkItem = WorkItem {
    id: "maint-001",
    priority: 2,
    action_type: "preventive_maintenance",
    description: "Continue periodic inspection and protective coating upkeep",
    cost: Some(5_000.0),
    hours: Some(8),
    resources: &["inspection equipment", "coating materials"],
};

const CORRECTIVE: WorkItem = WorkItem {
    id: "maint-002",
    priority: 3,
    action_type: "corrective_maintenance",
    description: "Locally repair corroded areas and recoat",
    cost: Some(15_000.0),
    hours: Some(24),
    resources: &["repair tools", "anti-corrosion coating", "certified technicians"],
};

const REINFORCEMENT: WorkItem = WorkItem {
    id: "maint-003",
    priority: 4,
    action_type: "structural_reinforcement",
    description: "Structurally assess and reinforce severely damaged members",
    cost: Some(50_000.0),
    hours: Some(72),
    resources: &["structural engineer", "reinforcement materials", "lifting equipment"],
};

const EMERGENCY: WorkItem = WorkItem {
    id: "maint-004",
    priority: 5,
    action_type: "emergency_repair",
    description: "Stop operation of affected equipment and perform emergency repair or replacement",
    cost: Some(100_000.0),
    hours: Some(120),
    resources: &["emergency repair team", "replacement components", "heavy lifting equipment"],
};

const REINSPECTION: WorkItem = WorkItem {
    id: "maint-000",
    priority: 3,
    action_type: "reinspection",
    description: "Re-run the inspection: the session ended before a risk assessment was produced",
    cost: None,
    hours: Some(8),
    resources: &["inspection team"],
};

/// Work items for an assessed level, in priority order.
pub fn maintenance_for(level: CorrosionLevel) -> Vec<MaintenanceRecommendation> {
    match level {
        CorrosionLevel::Low => vec![PREVENTIVE.to_recommendation()],
        CorrosionLevel::Medium => vec![CORRECTIVE.to_recommendation()],
        CorrosionLevel::High => vec![CORRECTIVE.to_recommendation(), REINFORCEMENT.to_recommendation()],
        CorrosionLevel::Critical => vec![EMERGENCY.to_recommendation()],
    }
}

/// The single work item for a session that never reached scoring.
pub fn maintenance_unassessed() -> Vec<MaintenanceRecommendation> {
    vec![REINSPECTION.to_recommendation()]
}
