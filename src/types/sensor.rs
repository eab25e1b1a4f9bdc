//! Sensor telemetry: SensorReading, SensorCategory, Location

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SensorLimits;
use crate::error::InspectionError;

/// Physical quantity a sensor measures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SensorCategory {
    /// Remaining wall thickness (mm)
    Thickness,
    /// Electrolyte conductivity (μS/cm)
    Conductivity,
    /// Ambient temperature (°C)
    Temperature,
    /// Relative humidity (%RH)
    Humidity,
    /// Seawater / condensate pH
    #[serde(alias = "pH", alias = "PH")]
    Ph,
    /// Line or ambient pressure
    Pressure,
}

impl SensorCategory {
    pub fn default_unit(&self) -> &'static str {
        match self {
            SensorCategory::Thickness => "mm",
            SensorCategory::Conductivity => "μS/cm",
            SensorCategory::Temperature => "°C",
            SensorCategory::Humidity => "%RH",
            SensorCategory::Ph => "pH",
            SensorCategory::Pressure => "bar",
        }
    }
}

impl std::fmt::Display for SensorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorCategory::Thickness => write!(f, "thickness"),
            SensorCategory::Conductivity => write!(f, "conductivity"),
            SensorCategory::Temperature => write!(f, "temperature"),
            SensorCategory::Humidity => write!(f, "humidity"),
            SensorCategory::Ph => write!(f, "pH"),
            SensorCategory::Pressure => write!(f, "pressure"),
        }
    }
}

impl std::str::FromStr for SensorCategory {
    type Err = InspectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thickness" => Ok(SensorCategory::Thickness),
            "conductivity" => Ok(SensorCategory::Conductivity),
            "temperature" | "temp" => Ok(SensorCategory::Temperature),
            "humidity" => Ok(SensorCategory::Humidity),
            "ph" => Ok(SensorCategory::Ph),
            "pressure" => Ok(SensorCategory::Pressure),
            other => Err(InspectionError::input(
                other.to_string(),
                "unknown sensor category",
            )),
        }
    }
}

/// Sensor or camera position on the structure (metres, platform frame).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A single parsed sensor sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorReading {
    pub sensor_id: String,
    pub category: SensorCategory,
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub location: Location,
    /// Data quality score in [0, 1]
    pub quality: f64,
}

impl SensorReading {
    /// Build a reading with the category's default unit and full quality.
    pub fn new(
        sensor_id: impl Into<String>,
        category: SensorCategory,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            category,
            value,
            unit: category.default_unit().to_string(),
            timestamp,
            location: Location::default(),
            quality: 1.0,
        }
    }

    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Reject readings the scorer cannot use, including values outside the
    /// category's physical range in `limits`.
    pub fn validate(&self, limits: &SensorLimits) -> Result<(), InspectionError> {
        if self.sensor_id.trim().is_empty() {
            return Err(InspectionError::input(
                format!("{} reading", self.category),
                "missing sensor id",
            ));
        }
        if !self.value.is_finite() {
            return Err(InspectionError::input(
                self.sensor_id.clone(),
                format!("non-finite value {}", self.value),
            ));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(InspectionError::input(
                self.sensor_id.clone(),
                format!("quality {} outside [0, 1]", self.quality),
            ));
        }
        if let Some((min, max)) = limits.range_for(self.category) {
            if !(min..=max).contains(&self.value) {
                return Err(InspectionError::input(
                    self.sensor_id.clone(),
                    format!("{} value {} outside [{min}, {max}]", self.category, self.value),
                ));
            }
        }
        Ok(())
    }
}

/// Mean value of all readings in `category`, or `None` when there are none.
pub fn mean_for(readings: &[SensorReading], category: SensorCategory) -> Option<f64> {
    let (sum, count) = readings
        .iter()
        .filter(|r| r.category == category)
        .fold((0.0, 0usize), |(sum, n), r| (sum + r.value, n + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(category: SensorCategory, value: f64) -> SensorReading {
        SensorReading::new("s1", category, value, Utc::now())
    }

    #[test]
    fn test_validate_rejects_nan_and_bad_quality() {
        let limits = SensorLimits::default();
        assert!(reading(SensorCategory::Temperature, f64::NAN).validate(&limits).is_err());
        assert!(reading(SensorCategory::Temperature, 20.0)
            .with_quality(1.2)
            .validate(&limits)
            .is_err());
        assert!(reading(SensorCategory::Temperature, 20.0).validate(&limits).is_ok());
    }

    #[test]
    fn test_validate_physical_ranges() {
        let limits = SensorLimits::default();
        assert!(reading(SensorCategory::Thickness, -5.0).validate(&limits).is_err());
        assert!(reading(SensorCategory::Thickness, 50.0).validate(&limits).is_ok());
        assert!(reading(SensorCategory::Ph, 25.0).validate(&limits).is_err());
        assert!(reading(SensorCategory::Humidity, 400.0).validate(&limits).is_err());
        assert!(reading(SensorCategory::Temperature, -50.0).validate(&limits).is_ok());
        assert!(reading(SensorCategory::Temperature, 100.5).validate(&limits).is_err());
        // no physical bound configured
        assert!(reading(SensorCategory::Pressure, 5000.0).validate(&limits).is_ok());

        let err = reading(SensorCategory::Ph, 25.0).validate(&limits).unwrap_err();
        assert_eq!(err.to_string(), "input error (s1): pH value 25 outside [0, 14]");
    }

    #[test]
    fn test_mean_for_category() {
        let readings = vec![
            reading(SensorCategory::Humidity, 70.0),
            reading(SensorCategory::Humidity, 80.0),
            reading(SensorCategory::Ph, 8.1),
        ];
        assert_eq!(mean_for(&readings, SensorCategory::Humidity), Some(75.0));
        assert_eq!(mean_for(&readings, SensorCategory::Temperature), None);
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&SensorCategory::Ph).unwrap();
        assert_eq!(json, "\"ph\"");
        let parsed: SensorCategory = serde_json::from_str("\"pH\"").unwrap();
        assert_eq!(parsed, SensorCategory::Ph);
        assert_eq!("Temperature".parse::<SensorCategory>().unwrap(), SensorCategory::Temperature);
    }
}
