//! Corrosion Sentinel CLI
//!
//! Runs one inspection session over sensor exports and image captures and
//! writes the JSON report.
//!
//! # Usage
//!
//! ```bash
//! corrosion-sentinel --platform PLT-07 --area "splash zone leg B2" \
//!     --sensors readings.csv --images captures/ --output report.json
//! ```
//!
//! # Environment Variables
//!
//! - `CORROSION_CONFIG`: Path to inspection.toml (default: ./inspection.toml)
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use corrosion_sentinel::acquisition::{load_image_dir, load_image_file, load_sensor_file};
use corrosion_sentinel::{InspectionConfig, InspectionRequest, PipelineCoordinator};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "corrosion-sentinel")]
#[command(about = "Offshore structural corrosion inspection")]
#[command(version)]
struct CliArgs {
    /// Platform identifier recorded in the report
    #[arg(long)]
    platform: String,

    /// Inspected area (defaults to [platform].default_area)
    #[arg(long, default_value = "")]
    area: String,

    /// Sensor export (.json, .csv or .txt); may be repeated
    #[arg(long, value_name = "FILE")]
    sensors: Vec<PathBuf>,

    /// Image file or directory of captures; may be repeated
    #[arg(long, value_name = "PATH")]
    images: Vec<PathBuf>,

    /// TOML config file (overrides CORROSION_CONFIG and ./inspection.toml)
    #[arg(short, long, env = "CORROSION_CONFIG")]
    config: Option<PathBuf>,

    /// Inspector name (overrides [platform].inspector)
    #[arg(long)]
    inspector: Option<String>,

    /// Abort at the next stage boundary after this many seconds
    #[arg(long, value_name = "SECS")]
    deadline_secs: Option<u64>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_request(args: &CliArgs) -> Result<InspectionRequest> {
    let mut readings = Vec::new();
    for path in &args.sensors {
        let loaded = load_sensor_file(path)
            .with_context(|| format!("loading sensor file {}", path.display()))?;
        readings.extend(loaded);
    }

    let mut images = Vec::new();
    for path in &args.images {
        let loaded = if path.is_dir() {
            load_image_dir(path)
        } else {
            load_image_file(path).map(|image| vec![image])
        };
        images.extend(loaded.with_context(|| format!("loading images from {}", path.display()))?);
    }

    let mut request = InspectionRequest::new(&args.platform, &args.area)
        .with_readings(readings)
        .with_images(images);
    if let Some(inspector) = &args.inspector {
        request = request.with_inspector(inspector);
    }
    Ok(request)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = match &args.config {
        Some(path) => InspectionConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => InspectionConfig::load().context("loading inspection config")?,
    };
    let coordinator = PipelineCoordinator::new(config).context("invalid inspection config")?;
    let request = build_request(&args)?;

    let report = match args.deadline_secs {
        Some(secs) => {
            coordinator
                .run_with_deadline(request, Duration::from_secs(secs))
                .await
        }
        None => {
            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, stopping at next stage boundary");
                    ctrl_c.cancel();
                }
            });
            coordinator.run_async(request, cancel).await
        }
    };

    let json = report.to_json_pretty().context("serializing report")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
            info!(path = %path.display(), final_stage = %report.final_stage, "Report written");
        }
        None => println!("{json}"),
    }

    if report.is_degraded() {
        warn!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Inspection completed with degraded results"
        );
    }
    Ok(())
}
