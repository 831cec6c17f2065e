//! Per-sensor bounded reading history.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::SensorReading;

// ---

/// Default number of readings kept per sensor.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Mapping from sensor id to its capped, arrival-ordered readings.
///
/// Within one sensor's sequence no two adjacent entries share a timestamp.
/// Only the most recent entry is checked, so a repeat that is not adjacent
/// is stored again.
#[derive(Debug, Clone)]
pub struct SensorHistory {
    capacity: usize,
    sensors: HashMap<String, Vec<SensorReading>>,
}

impl Default for SensorHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SensorHistory {
    // ---
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            sensors: HashMap::new(),
        }
    }

    /// Append a poll batch. Returns how many readings were stored.
    pub fn append(&mut self, batch: &[SensorReading]) -> usize {
        // ---
        let mut stored = 0;
        for reading in batch {
            let seq = self.sensors.entry(reading.sensor_id.clone()).or_default();

            // Echo of the previous poll
            if seq.last().is_some_and(|last| last.timestamp == reading.timestamp) {
                continue;
            }

            seq.push(reading.clone());
            if seq.len() > self.capacity {
                let excess = seq.len() - self.capacity;
                seq.drain(..excess);
            }
            stored += 1;
        }
        stored
    }

    /// Full capped sequence for a sensor, oldest first.
    pub fn readings(&self, sensor_id: &str) -> &[SensorReading] {
        self.sensors
            .get(sensor_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Most recent reading for a sensor, if any has arrived yet.
    pub fn latest(&self, sensor_id: &str) -> Option<&SensorReading> {
        self.readings(sensor_id).last()
    }

    /// Known sensor ids in display order.
    pub fn sensor_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sensors.keys().map(String::as_str).collect();
        sort_sensor_ids(&mut ids);
        ids
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Trailing digits of a sensor id, e.g. `sensor10` -> 10.
pub fn numeric_suffix(sensor_id: &str) -> Option<u64> {
    // ---
    let digits = sensor_id.len()
        - sensor_id
            .bytes()
            .rev()
            .take_while(u8::is_ascii_digit)
            .count();
    sensor_id[digits..].parse().ok()
}

/// Sort ids ascending by numeric suffix. Ids without one go last; ties
/// fall back to the id itself.
pub fn sort_sensor_ids<S: AsRef<str>>(ids: &mut [S]) {
    // ---
    ids.sort_by(|a, b| {
        let (a, b) = (a.as_ref(), b.as_ref());
        let order = match (numeric_suffix(a), numeric_suffix(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        order.then_with(|| a.cmp(b))
    });
}
