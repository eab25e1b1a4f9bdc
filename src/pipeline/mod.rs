//! Inspection Pipeline Module
//!
//! ## Session State Machine
//!
//! ```text
//! COLLECTING -> ANALYZING -> ASSESSING -> REPORTING -> DONE
//!      |            |            |
//!      +------------+------------+--> FAILED (best-effort report)
//! ```
//!
//! COLLECTING jumps straight to ASSESSING when there is nothing to analyze.

mod state;
mod coordinator;
pub mod stages;

pub use state::*;
pub use coordinator::PipelineCoordinator;
pub use stages::{default_stages, Stage, StageFailure};
