//! Configuration loader for the `sensor-dashboard` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Nothing else in the crate reads `env::var` for
//! settings.
//!
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::scheduler::Schedule;
use crate::warnings::{RetentionPolicy, DEFAULT_RETENTION_SECS, DEFAULT_WARNING_CAPACITY};

/// Readings endpoint polled when `SENSOR_API_URL` is unset.
pub const DEFAULT_SENSOR_API_URL: &str = "https://sc21r2hcw2.azurewebsites.net/api/sensors";

/// Longest accepted poll, sweep or request interval (one day).
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Longest accepted warning retention window (30 days).
pub const MAX_RETENTION_SECS: u64 = 30 * 86_400;

/// Parse an optional integer setting in `1..=$max` with a default value.
macro_rules! parse_env_u64 {
    ($lookup:expr, $var_name:expr, $default:expr, $max:expr) => {{
        let value = $lookup($var_name)
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default);
        if value == 0 {
            bail!("{} must be greater than zero", $var_name);
        }
        if value > $max {
            bail!("{} must be at most {}", $var_name, $max);
        }
        value
    }};
}

/// Read an optional string setting with a default value.
macro_rules! env_or {
    ($lookup:expr, $var_name:expr, $default:expr) => {
        $lookup($var_name).unwrap_or_else(|| $default.to_string())
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Sensor readings endpoint.
    pub api_url: String,

    /// Seconds between polls.
    pub poll_interval_secs: u64,

    /// Seconds between warning sweeps.
    pub sweep_interval_secs: u64,

    /// Readings kept per sensor.
    pub history_capacity: usize,

    /// Warnings kept in the feed.
    pub warning_capacity: usize,

    /// Maximum warning age in seconds.
    pub warning_retention_secs: u64,

    /// Timeout for a single poll request.
    pub http_timeout_secs: u64,

    /// Address the read-model HTTP server binds to.
    pub listen_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_SENSOR_API_URL.to_string(),
            poll_interval_secs: 5,
            sweep_interval_secs: 60,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            warning_capacity: DEFAULT_WARNING_CAPACITY,
            warning_retention_secs: DEFAULT_RETENTION_SECS as u64,
            http_timeout_secs: 10,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `SENSOR_API_URL` – readings endpoint (default: the public sensors API)
/// - `POLL_INTERVAL_SECS` – poll cadence (default: 5)
/// - `SWEEP_INTERVAL_SECS` – warning sweep cadence (default: 60)
/// - `HISTORY_CAPACITY` – readings per sensor (default: 100)
/// - `WARNING_CAPACITY` – warnings retained (default: 50)
/// - `WARNING_RETENTION_SECS` – warning max age (default: 3600)
/// - `HTTP_TIMEOUT_SECS` – poll request timeout (default: 10)
/// - `LISTEN_ADDR` – server bind address (default: 0.0.0.0:8080)
///
/// Returns an error if any variable is present but invalid, zero, or above
/// its upper bound.
pub fn load_from_env() -> Result<Config> {
    load_from(|name| env::var(name).ok())
}

/// Build a [`Config`] from an arbitrary variable lookup.
pub fn load_from<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // ---
    let defaults = Config::default();

    let api_url = env_or!(lookup, "SENSOR_API_URL", defaults.api_url);
    let poll_interval_secs = parse_env_u64!(
        lookup,
        "POLL_INTERVAL_SECS",
        defaults.poll_interval_secs,
        MAX_INTERVAL_SECS
    );
    let sweep_interval_secs = parse_env_u64!(
        lookup,
        "SWEEP_INTERVAL_SECS",
        defaults.sweep_interval_secs,
        MAX_INTERVAL_SECS
    );
    let history_capacity = parse_env_u64!(
        lookup,
        "HISTORY_CAPACITY",
        defaults.history_capacity as u64,
        u32::MAX as u64
    );
    let warning_capacity = parse_env_u64!(
        lookup,
        "WARNING_CAPACITY",
        defaults.warning_capacity as u64,
        u32::MAX as u64
    );
    let warning_retention_secs = parse_env_u64!(
        lookup,
        "WARNING_RETENTION_SECS",
        defaults.warning_retention_secs,
        MAX_RETENTION_SECS
    );
    let http_timeout_secs = parse_env_u64!(
        lookup,
        "HTTP_TIMEOUT_SECS",
        defaults.http_timeout_secs,
        MAX_INTERVAL_SECS
    );

    let listen_addr = env_or!(lookup, "LISTEN_ADDR", defaults.listen_addr)
        .parse::<SocketAddr>()
        .map_err(|e| anyhow!("Invalid LISTEN_ADDR: {}", e))?;

    if api_url.trim().is_empty() {
        bail!("SENSOR_API_URL must not be empty");
    }

    Ok(Config {
        api_url,
        poll_interval_secs,
        sweep_interval_secs,
        history_capacity: history_capacity as usize,
        warning_capacity: warning_capacity as usize,
        warning_retention_secs,
        http_timeout_secs,
        listen_addr,
    })
}

impl Config {
    pub fn schedule(&self) -> Schedule {
        Schedule {
            poll_every: Duration::from_secs(self.poll_interval_secs),
            sweep_every: Duration::from_secs(self.sweep_interval_secs),
        }
    }

    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            capacity: self.warning_capacity,
            retention: chrono::Duration::seconds(
                self.warning_retention_secs.min(MAX_RETENTION_SECS) as i64,
            ),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  SENSOR_API_URL         : {}", self.api_url);
        tracing::info!("  POLL_INTERVAL_SECS     : {}", self.poll_interval_secs);
        tracing::info!("  SWEEP_INTERVAL_SECS    : {}", self.sweep_interval_secs);
        tracing::info!("  HISTORY_CAPACITY       : {}", self.history_capacity);
        tracing::info!("  WARNING_CAPACITY       : {}", self.warning_capacity);
        tracing::info!("  WARNING_RETENTION_SECS : {}", self.warning_retention_secs);
        tracing::info!("  HTTP_TIMEOUT_SECS      : {}", self.http_timeout_secs);
        tracing::info!("  LISTEN_ADDR            : {}", self.listen_addr);
    }
}
