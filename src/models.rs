//! Data models for the sensor dashboard.
//!
//! `RawSensorReading` mirrors the JSON objects returned by the readings
//! endpoint. `SensorReading` is the normalized form held in history, with
//! its timestamp converted to a UTC instant on ingest.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::Metric;

// ---

/// Offset-less ISO-8601 date-time layout accepted in addition to RFC 3339.
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Raw sensor data from the API
#[derive(Debug, Clone, Deserialize)]
pub struct RawSensorReading {
    // ---
    pub sensor_id: String,
    pub timestamp: String,
    pub temperature: f64,
    pub co2_level: f64,
    pub humidity: f64,
    pub noise_level: f64,
    pub light_intensity: f64,
    pub air_quality_index: f64,
}

/// One ingested observation. Never mutated after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    // ---
    pub sensor_id: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub co2_level: f64,
    pub humidity: f64,
    pub noise_level: f64,
    pub light_intensity: f64,
    pub air_quality_index: f64,
}

/// A reading whose timestamp could not be parsed as ISO-8601.
#[derive(Debug, Error, PartialEq)]
#[error("invalid timestamp '{timestamp}' for sensor {sensor_id}")]
pub struct InvalidTimestamp {
    pub sensor_id: String,
    pub timestamp: String,
}

/// Parse an ISO-8601 timestamp into a UTC instant.
///
/// RFC 3339 strings keep their offset and are converted to UTC. Date-times
/// without an offset are taken to already be UTC.
pub fn normalize_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    // ---
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, NAIVE_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

impl RawSensorReading {
    // ---
    pub fn to_normalized(&self) -> Result<SensorReading, InvalidTimestamp> {
        // ---
        let timestamp = normalize_timestamp(&self.timestamp).ok_or_else(|| InvalidTimestamp {
            sensor_id: self.sensor_id.clone(),
            timestamp: self.timestamp.clone(),
        })?;

        Ok(SensorReading {
            sensor_id: self.sensor_id.clone(),
            timestamp,
            temperature: self.temperature,
            co2_level: self.co2_level,
            humidity: self.humidity,
            noise_level: self.noise_level,
            light_intensity: self.light_intensity,
            air_quality_index: self.air_quality_index,
        })
    }
}

impl SensorReading {
    /// Value of a single metric on this reading.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Co2Level => self.co2_level,
            Metric::Humidity => self.humidity,
            Metric::NoiseLevel => self.noise_level,
            Metric::LightIntensity => self.light_intensity,
            Metric::AirQualityIndex => self.air_quality_index,
        }
    }
}
