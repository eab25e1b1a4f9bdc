//! Extension points for narrative enhancement layers.
//!
//! Both hooks are optional. When absent, or when one returns an error, the
//! deterministic template text is used and every structured report field is
//! unaffected. A failing hook is recorded as a session warning.

use std::sync::Arc;

use crate::report::SummaryFields;
use crate::types::RiskAssessment;

/// Replaces the template summary with a richer narrative.
pub trait SummaryHook: Send + Sync {
    fn summarize(&self, fields: &SummaryFields) -> anyhow::Result<String>;
}

/// How a `RecommendationHook` changes the scorer's recommendation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationEnhancement {
    /// Keep the template recommendations and add these after them
    Append(Vec<String>),
    /// Discard the template recommendations
    Replace(Vec<String>),
}

impl RecommendationEnhancement {
    pub fn apply(self, recommendations: Vec<String>) -> Vec<String> {
        match self {
            RecommendationEnhancement::Append(extra) => {
                let mut merged = recommendations;
                merged.extend(extra);
                merged
            }
            RecommendationEnhancement::Replace(replacement) => replacement,
        }
    }
}

/// Consumed right after scoring, before the assessment is attached.
pub trait RecommendationHook: Send + Sync {
    fn enhance(&self, assessment: &RiskAssessment) -> anyhow::Result<RecommendationEnhancement>;
}

/// The hooks a coordinator hands to its stages.
#[derive(Clone, Default)]
pub struct Hooks {
    pub summary: Option<Arc<dyn SummaryHook>>,
    pub recommendations: Option<Arc<dyn RecommendationHook>>,
}

impl Hooks {
    pub fn none() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("summary", &self.summary.is_some())
            .field("recommendations", &self.recommendations.is_some())
            .finish()
    }
}
