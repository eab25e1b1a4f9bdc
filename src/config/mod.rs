//! Inspection Configuration Module
//!
//! Every detection, scoring and scheduling constant is an operator-tunable
//! value loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `CORROSION_CONFIG` environment variable (path to TOML file)
//! 2. `inspection.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! The config is a plain value. Build it once and hand it to the coordinator:
//!
//! ```ignore
//! let config = InspectionConfig::load()?;
//! let coordinator = PipelineCoordinator::new(config)?;
//! ```

mod inspection_config;
pub mod defaults;
pub mod validation;

pub use inspection_config::*;
