//! Sensor exports: JSON (array or single object), CSV with a header row, and
//! headerless text logs.
//!
//! CSV columns are matched by header name. Required: `sensor_id`,
//! `category` (or `sensor_type`), `value`. Optional: `unit`, `timestamp`,
//! `x`, `y`, `z`, `quality`.
//!
//! Text logs have no header and a fixed column order:
//! `sensor_id,category,value,unit,timestamp[,x,y,z[,quality]]`. Blank lines and
//! lines starting with `#` are ignored.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use super::AcquisitionError;
use crate::error::InspectionError;
use crate::types::{Location, SensorCategory, SensorReading};

/// A loosely-typed sensor record as exporters write it.
#[derive(Debug, Deserialize)]
struct RawSensorRecord {
    sensor_id: String,
    #[serde(alias = "sensor_type")]
    category: SensorCategory,
    value: f64,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    location: Option<Location>,
    #[serde(default)]
    quality: Option<f64>,
}

impl RawSensorRecord {
    fn into_reading(self, default_time: DateTime<Utc>) -> SensorReading {
        let mut reading = SensorReading::new(
            self.sensor_id,
            self.category,
            self.value,
            self.timestamp.unwrap_or(default_time),
        );
        if let Some(unit) = self.unit {
            reading.unit = unit;
        }
        if let Some(location) = self.location {
            reading = reading.with_location(location);
        }
        if let Some(quality) = self.quality {
            reading = reading.with_quality(quality);
        }
        reading
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonPayload {
    Many(Vec<RawSensorRecord>),
    One(RawSensorRecord),
}

/// Load readings from a `.json`, `.csv` or `.txt` file.
pub fn load_sensor_file(path: &Path) -> Result<Vec<SensorReading>, AcquisitionError> {
    let contents = std::fs::read_to_string(path).map_err(|e| AcquisitionError::io(path, e))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let readings = match ext.as_str() {
        "json" => parse_sensor_json(&contents, Utc::now())?,
        "csv" => parse_sensor_csv(&contents, Utc::now())?,
        "txt" => parse_sensor_txt(&contents, Utc::now()),
        other => return Err(AcquisitionError::UnsupportedFormat(format!(".{other}"))),
    };
    info!(count = readings.len(), path = %path.display(), "Loaded sensor readings");
    Ok(readings)
}

/// Records without a timestamp are stamped with `default_time`.
pub fn parse_sensor_json(
    contents: &str,
    default_time: DateTime<Utc>,
) -> Result<Vec<SensorReading>, AcquisitionError> {
    let records = match serde_json::from_str::<JsonPayload>(contents)? {
        JsonPayload::Many(records) => records,
        JsonPayload::One(record) => vec![record],
    };
    Ok(records.into_iter().map(|r| r.into_reading(default_time)).collect())
}

/// Column positions resolved from a CSV header row.
struct CsvColumns {
    sensor_id: usize,
    category: usize,
    value: usize,
    unit: Option<usize>,
    timestamp: Option<usize>,
    quality: Option<usize>,
    x: Option<usize>,
    y: Option<usize>,
    z: Option<usize>,
}

/// Fields a text log line must carry, up to and including the timestamp.
const TXT_MIN_FIELDS: usize = 5;

impl CsvColumns {
    /// Fixed layout of a headerless text log.
    const POSITIONAL: Self = Self {
        sensor_id: 0,
        category: 1,
        value: 2,
        unit: Some(3),
        timestamp: Some(4),
        x: Some(5),
        y: Some(6),
        z: Some(7),
        quality: Some(8),
    };

    fn from_header(header: &str) -> Option<Self> {
        let names: HashMap<String, usize> = header
            .split(',')
            .enumerate()
            .map(|(i, name)| (name.trim().to_ascii_lowercase(), i))
            .collect();
        let column = |aliases: &[&str]| aliases.iter().find_map(|n| names.get(*n).copied());

        Some(Self {
            sensor_id: column(&["sensor_id"])?,
            category: column(&["category", "sensor_type"])?,
            value: column(&["value"])?,
            unit: column(&["unit"]),
            timestamp: column(&["timestamp"]),
            quality: column(&["quality"]),
            x: column(&["x"]),
            y: column(&["y"]),
            z: column(&["z"]),
        })
    }
}

/// Parse a CSV export. Malformed rows are skipped with a warning; a missing
/// required column fails the whole file.
pub fn parse_sensor_csv(
    contents: &str,
    default_time: DateTime<Utc>,
) -> Result<Vec<SensorReading>, AcquisitionError> {
    let mut lines = contents
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());
    let Some((_, header)) = lines.next() else {
        return Ok(Vec::new());
    };
    let columns = CsvColumns::from_header(header).ok_or_else(|| AcquisitionError::Csv {
        line: 1,
        reason: "header must name sensor_id, category and value".to_string(),
    })?;

    let mut readings = Vec::new();
    for (index, line) in lines {
        match parse_csv_line(line, &columns, default_time) {
            Ok(reading) => readings.push(reading),
            Err(e) => warn!(line = index + 1, error = %e, "Error parsing sensor CSV line"),
        }
    }
    Ok(readings)
}

/// Parse a headerless text log. Short or malformed lines are skipped with a
/// warning.
pub fn parse_sensor_txt(contents: &str, default_time: DateTime<Utc>) -> Vec<SensorReading> {
    let mut readings = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed = if line.split(',').count() < TXT_MIN_FIELDS {
            Err(format!("expected at least {TXT_MIN_FIELDS} fields"))
        } else {
            parse_csv_line(line, &CsvColumns::POSITIONAL, default_time)
        };
        match parsed {
            Ok(reading) => readings.push(reading),
            Err(e) => warn!(line = index + 1, error = %e, "Error parsing sensor text line"),
        }
    }
    readings
}

fn parse_csv_line(
    line: &str,
    columns: &CsvColumns,
    default_time: DateTime<Utc>,
) -> Result<SensorReading, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let field = |col: usize| fields.get(col).copied().filter(|f| !f.is_empty());
    let optional = |col: Option<usize>| col.and_then(field);

    let sensor_id = field(columns.sensor_id).ok_or("missing sensor_id")?;
    let category: SensorCategory = field(columns.category)
        .ok_or("missing category")?
        .parse()
        .map_err(|e: InspectionError| e.to_string())?;
    let value = parse_f64(field(columns.value).ok_or("missing value")?, "value")?;
    let timestamp = match optional(columns.timestamp) {
        Some(ts) => parse_timestamp(ts)?,
        None => default_time,
    };

    let mut reading = SensorReading::new(sensor_id, category, value, timestamp);
    if let Some(unit) = optional(columns.unit) {
        reading.unit = unit.to_string();
    }
    if let Some(q) = optional(columns.quality) {
        reading = reading.with_quality(parse_f64(q, "quality")?);
    }

    let coord = |col: Option<usize>, name: &str| optional(col).map_or(Ok(0.0), |v| parse_f64(v, name));
    let location = Location::new(
        coord(columns.x, "x")?,
        coord(columns.y, "y")?,
        coord(columns.z, "z")?,
    );
    Ok(reading.with_location(location))
}

/// RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC), or Unix epoch seconds.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(epoch) = s.parse::<i64>() {
        return Utc
            .timestamp_opt(epoch, 0)
            .single()
            .ok_or_else(|| format!("epoch {epoch} out of range"));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
                .map(|naive| naive.and_utc())
        })
        .map_err(|e| format!("cannot parse timestamp '{s}': {e}"))
}

fn parse_f64(s: &str, field: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .map_err(|_| format!("cannot parse {field} as f64: '{s}'"))
}
