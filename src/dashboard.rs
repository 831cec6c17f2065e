//! Dashboard state and its read model.
//!
//! `DashboardState` owns the reading history, the warning feed and the
//! loading/error flags. It changes only through [`DashboardState::on_poll`]
//! and [`DashboardState::on_sweep`], both of which take the current instant
//! from the caller. [`DashboardState::view`] builds the serializable model
//! the presentation layer draws from.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classify::{classify, Metric, Severity};
use crate::history::SensorHistory;
use crate::models::SensorReading;
use crate::poller::FetchError;
use crate::warnings::{
    self, RetentionPolicy, Warning, WarningFeed, CO2_THRESHOLD, TEMPERATURE_THRESHOLD,
};

// ---

/// What one successful poll changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollSummary {
    pub received: usize,
    pub stored: usize,
    pub new_warnings: usize,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    history: SensorHistory,
    warnings: WarningFeed,
    loading: bool,
    error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(SensorHistory::default(), RetentionPolicy::default())
    }
}

impl DashboardState {
    // ---
    pub fn new(history: SensorHistory, policy: RetentionPolicy) -> Self {
        Self {
            history,
            warnings: WarningFeed::new(policy),
            loading: true,
            error: None,
            last_updated: None,
        }
    }

    /// Apply the outcome of one poll cycle.
    ///
    /// A failure sets the error message; the next success clears it. Either
    /// way the loading flag is cleared and never set again.
    pub fn on_poll(
        &mut self,
        outcome: Result<Vec<SensorReading>, FetchError>,
        now: DateTime<Utc>,
    ) -> Result<PollSummary, FetchError> {
        // ---
        self.loading = false;

        let batch = match outcome {
            Ok(batch) => batch,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        let stored = self.history.append(&batch);
        let new_warnings = warnings::evaluate(&batch, now);
        let summary = PollSummary {
            received: batch.len(),
            stored,
            new_warnings: new_warnings.len(),
        };

        self.warnings.merge(new_warnings, now);
        self.error = None;
        self.last_updated = Some(now);
        Ok(summary)
    }

    /// Timer-driven sweep of the warning feed. Returns evicted count.
    pub fn on_sweep(&mut self, now: DateTime<Utc>) -> usize {
        self.warnings.sweep(now)
    }

    pub fn history(&self) -> &SensorHistory {
        &self.history
    }

    pub fn warnings(&self) -> &[Warning] {
        self.warnings.entries()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Read model for rendering. While an error is set, sensor and warning
    /// data are withheld.
    pub fn view(&self) -> DashboardView {
        // ---
        let (sensors, warnings) = if self.error.is_some() {
            (Vec::new(), Vec::new())
        } else {
            let sensors = self
                .history
                .sensor_ids()
                .into_iter()
                .filter_map(|id| SensorPanel::build(id, self.history.readings(id)))
                .collect();
            (sensors, self.warnings.entries().to_vec())
        };

        DashboardView {
            loading: self.loading,
            error: self.error.clone(),
            last_updated: self.last_updated,
            warning_count: warnings.len(),
            sensors,
            warnings,
        }
    }
}

/// Everything the page needs for one redraw.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub sensors: Vec<SensorPanel>,
    /// Most recent last.
    pub warnings: Vec<Warning>,
    pub warning_count: usize,
}

/// Cards and charts for one sensor.
#[derive(Debug, Clone, Serialize)]
pub struct SensorPanel {
    pub sensor_id: String,
    pub latest: SensorReading,
    pub cards: Vec<MetricCard>,
    pub charts: Vec<ChartSeries>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricCard {
    pub metric: Metric,
    pub label: &'static str,
    pub unit: &'static str,
    pub value: f64,
    pub severity: Severity,
    pub color: &'static str,
}

/// A time series with its constant threshold reference line.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub metric: Metric,
    pub threshold: f64,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl SensorPanel {
    /// `None` for a sensor with no readings yet.
    fn build(sensor_id: &str, readings: &[SensorReading]) -> Option<Self> {
        // ---
        let latest = readings.last()?;

        let cards = Metric::ALL
            .iter()
            .map(|&metric| MetricCard::new(metric, latest.value(metric)))
            .collect();

        let charts = vec![
            ChartSeries::new(Metric::Temperature, TEMPERATURE_THRESHOLD, readings),
            ChartSeries::new(Metric::Co2Level, CO2_THRESHOLD, readings),
        ];

        Some(Self {
            sensor_id: sensor_id.to_string(),
            latest: latest.clone(),
            cards,
            charts,
        })
    }
}

impl MetricCard {
    fn new(metric: Metric, value: f64) -> Self {
        let severity = classify(value, metric);
        Self {
            metric,
            label: metric.label(),
            unit: metric.unit(),
            value,
            severity,
            color: severity.color(),
        }
    }
}

impl ChartSeries {
    fn new(metric: Metric, threshold: f64, readings: &[SensorReading]) -> Self {
        let points = readings
            .iter()
            .map(|r| ChartPoint {
                timestamp: r.timestamp,
                value: r.value(metric),
            })
            .collect();
        Self {
            metric,
            threshold,
            points,
        }
    }
}
