//! Meteoserver weather client
//!
//! Fetches live conditions and the hourly forecast for one location and
//! reshapes the provider payloads into [`CurrentConditions`],
//! [`HourlyRecord`] and [`DailyRecord`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::aggregate::aggregate_daily;
use crate::config::KnmiConfig;
use crate::error::KnmiError;
use crate::models::{
    CurrentConditions, DailyRecord, ForecastResponse, ForecastRow, HourlyRecord, LiveResponse,
};
use crate::transport::{JsonRequest, JsonTransport, ReqwestTransport, TransportError};

/// Maximum number of records returned by [`WeatherClient::hourly`]
pub const HOURLY_LIMIT: usize = 24;

/// Marker the provider embeds in an HTTP 200 body when the key is rejected
const API_KEY_INVALID: &str = "api_key_invalid";

/// Weather client trait for fetching weather data
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Current conditions at the configured location
    ///
    /// If the provider returns several rows, the last one wins.
    async fn current(&self) -> Result<CurrentConditions, KnmiError>;

    /// The next (at most) 24 hours of forecast
    async fn hourly(&self) -> Result<Vec<HourlyRecord>, KnmiError>;

    /// The full forecast aggregated per calendar day
    async fn daily(&self) -> Result<Vec<DailyRecord>, KnmiError>;

    /// The forecast payload exactly as the provider returned it
    async fn raw_forecast(&self) -> Result<Value, KnmiError>;
}

/// KNMI client backed by the Meteoserver API
pub struct KnmiClient {
    transport: Arc<dyn JsonTransport>,
    config: KnmiConfig,
}

impl std::fmt::Debug for KnmiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnmiClient")
            .field("transport", &"dyn JsonTransport")
            .field("config", &self.config)
            .finish()
    }
}

impl KnmiClient {
    /// Create a client that opens a one-shot HTTP session per call
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: KnmiConfig) -> Result<Self, KnmiError> {
        Self::with_transport(config, Arc::new(ReqwestTransport::per_request()))
    }

    /// Create a client that reuses a caller-owned HTTP session
    ///
    /// The session is never closed by the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_session(config: KnmiConfig, session: Client) -> Result<Self, KnmiError> {
        Self::with_transport(config, Arc::new(ReqwestTransport::shared(session)))
    }

    /// Create a client on top of any [`JsonTransport`]
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_transport(
        config: KnmiConfig,
        transport: Arc<dyn JsonTransport>,
    ) -> Result<Self, KnmiError> {
        config.validate().map_err(KnmiError::Configuration)?;
        Ok(Self { transport, config })
    }

    /// The client's configuration
    #[must_use]
    pub const fn config(&self) -> &KnmiConfig {
        &self.config
    }

    /// Build the GET request for an endpoint
    fn build_request(&self, endpoint: &str) -> JsonRequest {
        JsonRequest::new(endpoint, Duration::from_secs(self.config.timeout_secs))
            .param("key", self.config.api_key().unwrap_or_default())
            .param("locatie", self.config.location_param())
    }

    /// Perform one GET and convert transport failures into client errors
    async fn fetch(&self, endpoint: &str) -> Result<Value, KnmiError> {
        debug!(
            endpoint = %endpoint,
            lat = %self.config.latitude,
            lon = %self.config.longitude,
            "Fetching weather data"
        );

        self.transport
            .get_json(self.build_request(endpoint))
            .await
            .map_err(|e| Self::map_transport_error(endpoint, e))
    }

    /// Fetch and reject payloads carrying the embedded key marker
    async fn fetch_authorized(&self, endpoint: &str) -> Result<Value, KnmiError> {
        let payload = self.fetch(endpoint).await?;
        if has_error_marker(&payload) {
            warn!(endpoint = %endpoint, "Provider rejected the API key");
            return Err(KnmiError::InvalidApiKey);
        }
        Ok(payload)
    }

    fn map_transport_error(endpoint: &str, err: TransportError) -> KnmiError {
        match err {
            TransportError::Timeout => {
                KnmiError::RequestError(format!("Request to {endpoint} timed out"))
            },
            TransportError::Status(401 | 403) => KnmiError::InvalidApiKey,
            other => KnmiError::RequestError(format!(
                "Error requesting data from {endpoint}: {other}"
            )),
        }
    }

    fn parse_current(payload: Value) -> Result<CurrentConditions, KnmiError> {
        let response: LiveResponse = serde_json::from_value(payload).map_err(|e| {
            KnmiError::ResultError(format!("Unexpected live weather payload: {e}"))
        })?;

        let rows = response.liveweer.len();
        if rows > 1 {
            debug!(rows, "Provider returned several live rows, keeping the last one");
        }

        response
            .liveweer
            .into_iter()
            .last()
            .map(CurrentConditions::from)
            .ok_or_else(|| KnmiError::ResultError("No live weather rows in response".to_string()))
    }

    fn parse_forecast(payload: Value, limit: usize) -> Result<Vec<HourlyRecord>, KnmiError> {
        let response: ForecastResponse = serde_json::from_value(payload).map_err(|e| {
            KnmiError::ResultError(format!("Unexpected forecast payload: {e}"))
        })?;

        response
            .data
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, row)| {
                let row: ForecastRow = serde_json::from_value(row).map_err(|e| {
                    KnmiError::ResultError(format!("Invalid forecast row {index}: {e}"))
                })?;
                let local_time = row.tijd_nl.clone();
                row.into_record().map_err(|e| {
                    KnmiError::ResultError(format!(
                        "Invalid local time {local_time:?} in forecast row {index}: {e}"
                    ))
                })
            })
            .collect()
    }
}

/// Whether the payload carries the provider's embedded key-rejection marker
fn has_error_marker(payload: &Value) -> bool {
    match payload {
        Value::String(s) => s.contains(API_KEY_INVALID),
        Value::Array(items) => items.iter().any(has_error_marker),
        Value::Object(map) => map
            .iter()
            .any(|(key, value)| key == API_KEY_INVALID || has_error_marker(value)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

#[async_trait]
impl WeatherClient for KnmiClient {
    #[instrument(skip(self))]
    async fn current(&self) -> Result<CurrentConditions, KnmiError> {
        let payload = self.fetch_authorized(&self.config.live_url).await?;
        Self::parse_current(payload)
    }

    #[instrument(skip(self))]
    async fn hourly(&self) -> Result<Vec<HourlyRecord>, KnmiError> {
        let payload = self.fetch_authorized(&self.config.forecast_url).await?;
        Self::parse_forecast(payload, HOURLY_LIMIT)
    }

    #[instrument(skip(self))]
    async fn daily(&self) -> Result<Vec<DailyRecord>, KnmiError> {
        let payload = self.fetch_authorized(&self.config.forecast_url).await?;
        let hours = Self::parse_forecast(payload, usize::MAX)?;
        let days = aggregate_daily(&hours, self.config.trailing_day);
        debug!(hours = hours.len(), days = days.len(), "Aggregated daily forecast");
        Ok(days)
    }

    #[instrument(skip(self))]
    async fn raw_forecast(&self) -> Result<Value, KnmiError> {
        self.fetch(&self.config.forecast_url).await
    }
}
