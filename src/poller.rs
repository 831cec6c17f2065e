//! Poll source for sensor readings.
//!
//! A [`Fetcher`] produces one normalized batch per call. [`HttpFetcher`] is
//! the production implementation: a single `GET` against the configured
//! readings endpoint. Tests substitute their own fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use thiserror::Error;
use tracing::debug;

use crate::models::{InvalidTimestamp, RawSensorReading, SensorReading};

// ---

/// Why a poll cycle produced no batch. `Display` is the message shown on
/// the dashboard error screen.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be sent or the connection failed.
    #[error("Failed to reach sensor API: {0}")]
    Transport(String),

    /// Endpoint answered with a non-2xx status.
    #[error("Sensor API returned HTTP {0}")]
    Status(u16),

    /// Body was not a JSON array of readings.
    #[error("Failed to decode sensor data: {0}")]
    Decode(String),

    /// A reading carried a timestamp that is not ISO-8601.
    #[error("Failed to decode sensor data: {0}")]
    Timestamp(#[from] InvalidTimestamp),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

/// Source of one poll batch.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self) -> Result<Vec<SensorReading>, FetchError>;
}

/// Fetches readings from the remote HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    url: String,
}

impl HttpFetcher {
    // ---
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self) -> Result<Vec<SensorReading>, FetchError> {
        // ---
        debug!("Fetching readings from: {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        decode_batch(&body)
    }
}

/// Decode a response body and normalize every reading. One bad reading
/// fails the whole batch.
pub fn decode_batch(body: &[u8]) -> Result<Vec<SensorReading>, FetchError> {
    // ---
    let raw: Vec<RawSensorReading> = serde_json::from_slice(body)?;
    debug!("Decoded {} raw readings", raw.len());

    let batch = raw
        .iter()
        .map(RawSensorReading::to_normalized)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(batch)
}
