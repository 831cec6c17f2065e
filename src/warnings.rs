//! Threshold-breach warnings and the capped, age-filtered warning feed.
//!
//! `evaluate` derives warnings from one poll batch. `sweep` drops entries
//! older than the retention window and then keeps only the newest
//! `capacity` survivors. The feed applies both on every mutation.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::SensorReading;

// ---

/// Temperature (°C) above which a warning is raised.
pub const TEMPERATURE_THRESHOLD: f64 = 35.0;

/// CO2 level (ppm) above which a warning is raised.
pub const CO2_THRESHOLD: f64 = 1000.0;

/// Default number of warnings retained.
pub const DEFAULT_WARNING_CAPACITY: usize = 50;

/// Default warning retention window in seconds.
pub const DEFAULT_RETENTION_SECS: i64 = 3600;

/// Which threshold a warning breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Temperature,
    Co2,
}

impl WarningKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WarningKind::Temperature => "temperature",
            WarningKind::Co2 => "co2",
        }
    }
}

/// A threshold breach. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub id: String,
    pub sensor_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub value: f64,
}

impl Warning {
    fn new(kind: WarningKind, reading: &SensorReading, value: f64, now: DateTime<Utc>) -> Self {
        // ---
        let message = match kind {
            WarningKind::Temperature => format!("High temperature alert: {value:.1}°C"),
            WarningKind::Co2 => format!("High CO2 alert: {value:.0} ppm"),
        };

        Self {
            id: format!(
                "{}-{}-{}",
                kind.as_str(),
                reading.sensor_id,
                now.timestamp_millis()
            ),
            sensor_id: reading.sensor_id.clone(),
            message,
            timestamp: now,
            kind,
            value,
        }
    }

    /// Age relative to `now`; negative if the warning is from the future.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }
}

/// Derive warnings for a poll batch. Every warning from one cycle carries
/// the same `now`.
pub fn evaluate(batch: &[SensorReading], now: DateTime<Utc>) -> Vec<Warning> {
    // ---
    let mut warnings = Vec::new();
    for reading in batch {
        if reading.temperature > TEMPERATURE_THRESHOLD {
            warnings.push(Warning::new(
                WarningKind::Temperature,
                reading,
                reading.temperature,
                now,
            ));
        }
        if reading.co2_level > CO2_THRESHOLD {
            warnings.push(Warning::new(
                WarningKind::Co2,
                reading,
                reading.co2_level,
                now,
            ));
        }
    }
    warnings
}

/// Eviction rules for the warning feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetentionPolicy {
    pub capacity: usize,
    pub retention: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_WARNING_CAPACITY,
            retention: Duration::seconds(DEFAULT_RETENTION_SECS),
        }
    }
}

impl RetentionPolicy {
    /// Age filter, then size cap. Order of survivors is preserved.
    pub fn sweep(&self, feed: Vec<Warning>, now: DateTime<Utc>) -> Vec<Warning> {
        // ---
        let mut kept: Vec<Warning> = feed
            .into_iter()
            .filter(|w| w.age(now) < self.retention)
            .collect();

        if kept.len() > self.capacity {
            let excess = kept.len() - self.capacity;
            kept.drain(..excess);
        }
        kept
    }
}

/// Insertion-ordered warnings, swept on every mutation.
#[derive(Debug, Clone, Default)]
pub struct WarningFeed {
    policy: RetentionPolicy,
    entries: Vec<Warning>,
}

impl WarningFeed {
    // ---
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            entries: Vec::new(),
        }
    }

    /// Append a cycle's warnings, then sweep.
    pub fn merge(&mut self, warnings: Vec<Warning>, now: DateTime<Utc>) {
        let mut entries = std::mem::take(&mut self.entries);
        entries.extend(warnings);
        self.entries = self.policy.sweep(entries, now);
    }

    /// Sweep without new input. Returns the number of evicted entries.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let entries = std::mem::take(&mut self.entries);
        self.entries = self.policy.sweep(entries, now);
        before - self.entries.len()
    }

    /// Entries oldest first.
    pub fn entries(&self) -> &[Warning] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap()
    }

    fn reading(sensor_id: &str, temperature: f64, co2_level: f64) -> SensorReading {
        // ---
        SensorReading {
            sensor_id: sensor_id.to_string(),
            timestamp: now(),
            temperature,
            co2_level,
            humidity: 45.0,
            noise_level: 40.0,
            light_intensity: 350.0,
            air_quality_index: 25.0,
        }
    }

    #[test]
    fn test_temperature_breach() {
        // ---
        let warnings = evaluate(&[reading("sensor1", 35.1, 500.0)], now());

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Temperature);
        assert_eq!(warnings[0].message, "High temperature alert: 35.1°C");
        assert_eq!(warnings[0].value, 35.1);
        assert_eq!(warnings[0].sensor_id, "sensor1");
    }

    #[test]
    fn test_thresholds_are_strict() {
        // ---
        assert!(evaluate(&[reading("sensor1", 35.0, 1000.0)], now()).is_empty());
    }

    #[test]
    fn test_co2_breach() {
        // ---
        let warnings = evaluate(&[reading("sensor1", 20.0, 1001.0)], now());

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Co2);
        assert_eq!(warnings[0].message, "High CO2 alert: 1001 ppm");
    }

    #[test]
    fn test_both_breaches_from_one_reading() {
        // ---
        let warnings = evaluate(&[reading("sensor4", 38.26, 1250.4)], now());
        let ms = now().timestamp_millis();

        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].message, "High temperature alert: 38.3°C");
        assert_eq!(warnings[1].message, "High CO2 alert: 1250 ppm");
        assert_eq!(warnings[0].id, format!("temperature-sensor4-{ms}"));
        assert_eq!(warnings[1].id, format!("co2-sensor4-{ms}"));
        assert!(warnings.iter().all(|w| w.timestamp == now()));
    }

    #[test]
    fn test_sweep_drops_expired() {
        // ---
        let policy = RetentionPolicy::default();
        let old = evaluate(&[reading("sensor1", 36.0, 500.0)], now());
        let fresh = evaluate(
            &[reading("sensor2", 36.0, 500.0)],
            now() + Duration::minutes(30),
        );

        let feed = [old, fresh].concat();

        // Exactly one hour old is expired; strict less-than
        let kept = policy.sweep(feed.clone(), now() + Duration::hours(1));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].sensor_id, "sensor2");

        let kept = policy.sweep(feed, now() + Duration::hours(1) - Duration::milliseconds(1));
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_flood_keeps_most_recent_fifty() {
        // ---
        let batch: Vec<_> = (1..=60)
            .map(|i| reading(&format!("sensor{i}"), 36.0, 500.0))
            .collect();

        let mut feed = WarningFeed::default();
        feed.merge(evaluate(&batch, now()), now());

        assert_eq!(feed.len(), DEFAULT_WARNING_CAPACITY);
        assert_eq!(feed.entries()[0].sensor_id, "sensor11");
        assert_eq!(feed.entries()[49].sensor_id, "sensor60");
    }

    #[test]
    fn test_flood_evicts_older_valid_warnings() {
        // ---
        let mut feed = WarningFeed::default();
        feed.merge(evaluate(&[reading("sensor0", 36.0, 500.0)], now()), now());

        let later = now() + Duration::minutes(1);
        let batch: Vec<_> = (1..=50)
            .map(|i| reading(&format!("sensor{i}"), 36.0, 500.0))
            .collect();
        feed.merge(evaluate(&batch, later), later);

        assert_eq!(feed.len(), 50);
        assert!(feed.entries().iter().all(|w| w.sensor_id != "sensor0"));
    }

    #[test]
    fn test_feed_sweep_reports_evictions() {
        // ---
        let mut feed = WarningFeed::new(RetentionPolicy {
            capacity: 10,
            retention: Duration::minutes(5),
        });
        feed.merge(evaluate(&[reading("sensor1", 36.0, 1200.0)], now()), now());
        assert_eq!(feed.len(), 2);

        assert_eq!(feed.sweep(now() + Duration::minutes(4)), 0);
        assert_eq!(feed.sweep(now() + Duration::minutes(5)), 2);
        assert!(feed.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        // ---
        let warnings = evaluate(&[reading("sensor1", 20.0, 1500.0)], now());
        let json = serde_json::to_value(&warnings[0]).unwrap();

        assert_eq!(json["type"], "co2");
        assert_eq!(json["sensorId"], "sensor1");
        assert_eq!(json["value"], 1500.0);
        assert_eq!(json["timestamp"], "2025-03-26T18:45:00Z");
    }
}
