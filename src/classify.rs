//! Severity classification for metric cards.
//!
//! Maps a metric value to a display severity. The bands are fixed; they are
//! used only for styling and never for warnings (see `warnings`).

use serde::Serialize;

// ---

/// The six metrics carried by every reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    Co2Level,
    Humidity,
    NoiseLevel,
    LightIntensity,
    AirQualityIndex,
}

/// Display severity of a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// red
    Critical,
    /// amber
    Elevated,
    /// blue
    Low,
    /// green
    Normal,
}

impl Metric {
    /// Card order on the dashboard.
    pub const ALL: [Metric; 6] = [
        Metric::Temperature,
        Metric::Co2Level,
        Metric::Humidity,
        Metric::NoiseLevel,
        Metric::LightIntensity,
        Metric::AirQualityIndex,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Co2Level => "CO2 Level",
            Metric::Humidity => "Humidity",
            Metric::NoiseLevel => "Noise Level",
            Metric::LightIntensity => "Light Intensity",
            Metric::AirQualityIndex => "Air Quality Index",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Co2Level => "ppm",
            Metric::Humidity => "%",
            Metric::NoiseLevel => "dB",
            Metric::LightIntensity => "lux",
            Metric::AirQualityIndex => "AQI",
        }
    }
}

impl Severity {
    pub fn color(self) -> &'static str {
        match self {
            Severity::Critical => "red",
            Severity::Elevated => "amber",
            Severity::Low => "blue",
            Severity::Normal => "green",
        }
    }
}

/// Classify `value` for `metric`. Upper bounds are exclusive.
pub fn classify(value: f64, metric: Metric) -> Severity {
    // ---
    match metric {
        // Not monotonic: cold readings get their own band.
        Metric::Temperature => {
            if value > 35.0 {
                Severity::Critical
            } else if value > 25.0 {
                Severity::Elevated
            } else if value < 18.0 {
                Severity::Low
            } else {
                Severity::Normal
            }
        }
        Metric::Co2Level => upper_bands(value, 800.0, 1000.0),
        Metric::Humidity => {
            if value > 70.0 || value < 30.0 {
                Severity::Elevated
            } else {
                Severity::Normal
            }
        }
        Metric::NoiseLevel => upper_bands(value, 70.0, 85.0),
        Metric::LightIntensity => {
            if value > 1000.0 {
                Severity::Elevated
            } else if value < 100.0 {
                Severity::Low
            } else {
                Severity::Normal
            }
        }
        Metric::AirQualityIndex => upper_bands(value, 100.0, 150.0),
    }
}

fn upper_bands(value: f64, elevated: f64, critical: f64) -> Severity {
    if value > critical {
        Severity::Critical
    } else if value > elevated {
        Severity::Elevated
    } else {
        Severity::Normal
    }
}
