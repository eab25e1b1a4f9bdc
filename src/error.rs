//! Inspection error kinds.
//!
//! Only `Configuration` is ever surfaced directly to a caller. `Input` and
//! `Decode` are demoted to session warnings and the offending item is dropped;
//! `Stage` moves the session to FAILED but a best-effort report is still built.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum InspectionError {
    /// Malformed or unusable sensor/image input.
    #[error("input error ({item}): {reason}")]
    Input { item: String, reason: String },

    /// Image payload cannot be analyzed.
    #[error("decode error ({image_id}): {reason}")]
    Decode { image_id: String, reason: String },

    /// Invalid or missing threshold/weight configuration.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Unexpected internal failure inside a pipeline stage.
    #[error("stage error in {stage}: {reason}")]
    Stage { stage: &'static str, reason: String },
}

impl InspectionError {
    pub fn input(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Input {
            item: item.into(),
            reason: reason.into(),
        }
    }

    pub fn decode(image_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            image_id: image_id.into(),
            reason: reason.into(),
        }
    }

    pub fn stage(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            reason: reason.into(),
        }
    }

    /// Recoverable errors become warnings; processing continues.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Input { .. } | Self::Decode { .. })
    }
}
