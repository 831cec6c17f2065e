//! Live environmental sensor dashboard.
//!
//! Polls a readings endpoint on a fixed cadence, keeps a capped per-sensor
//! history and a capped, age-filtered warning feed, and serves both as read
//! models for the dashboard page.
//!
//! Module layout follows the Explicit Module Boundary Pattern (EMBP): each
//! sibling module owns one concern and this file is the only gateway that
//! re-exports their public types.

pub mod classify;
pub mod config;
pub mod dashboard;
pub mod history;
pub mod models;
pub mod poller;
pub mod scheduler;
pub mod warnings;

mod routes;

pub use classify::{classify, Metric, Severity};
pub use config::Config;
pub use dashboard::{DashboardState, DashboardView, PollSummary};
pub use history::{sort_sensor_ids, SensorHistory};
pub use models::{RawSensorReading, SensorReading};
pub use poller::{FetchError, Fetcher, HttpFetcher};
pub use routes::router;
pub use scheduler::{Clock, DashboardHandle, ManualClock, Schedule, SharedState, SystemClock};
pub use warnings::{RetentionPolicy, Warning, WarningFeed, WarningKind};
