//! Inspection data acquisition
//!
//! File loaders the CLI uses to turn sensor exports and camera captures into
//! a request. The pipeline core never touches the filesystem itself.

pub mod images;
pub mod sensors;

use thiserror::Error;

pub use images::{load_image_dir, load_image_file};
pub use sensors::{load_sensor_file, parse_sensor_csv, parse_sensor_json, parse_sensor_txt};

#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parse error on line {line}: {reason}")]
    Csv { line: usize, reason: String },
}

impl AcquisitionError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
