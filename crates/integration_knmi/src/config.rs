//! KNMI client configuration

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::aggregate::TrailingDay;

/// Configuration for the KNMI / Meteoserver client
#[derive(Clone, Serialize, Deserialize)]
pub struct KnmiConfig {
    /// Meteoserver API key (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Latitude of the forecast location (-90.0 to 90.0)
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Longitude of the forecast location (-180.0 to 180.0)
    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// Live weather endpoint
    #[serde(default = "default_live_url")]
    pub live_url: String,

    /// Hourly forecast endpoint
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// Total request timeout in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// What to do with the last calendar day of the daily aggregation
    #[serde(default)]
    pub trailing_day: TrailingDay,
}

fn default_live_url() -> String {
    "https://data.meteoserver.nl/api/liveweer_synop.php".to_string()
}

fn default_forecast_url() -> String {
    "https://data.meteoserver.nl/api/uurverwachting_gfs.php".to_string()
}

// Utrecht
const fn default_latitude() -> f64 {
    52.091_087_9
}

const fn default_longitude() -> f64 {
    5.112_423_1
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for KnmiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            latitude: default_latitude(),
            longitude: default_longitude(),
            live_url: default_live_url(),
            forecast_url: default_forecast_url(),
            timeout_secs: default_timeout_secs(),
            trailing_day: TrailingDay::default(),
        }
    }
}

impl std::fmt::Debug for KnmiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnmiConfig")
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("live_url", &self.live_url)
            .field("forecast_url", &self.forecast_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("trailing_day", &self.trailing_day)
            .finish()
    }
}

impl KnmiConfig {
    /// Create a configuration for the given key and location, defaults elsewhere
    #[must_use]
    pub fn new(api_key: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            api_key: Some(SecretString::from(api_key.into())),
            latitude,
            longitude,
            ..Default::default()
        }
    }

    /// Returns the API key if one is configured and non-empty
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .filter(|key| !key.is_empty())
    }

    /// Location formatted the way the provider expects it (`lat,lon`)
    #[must_use]
    pub fn location_param(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key().is_none() {
            return Err("api_key must be set".to_string());
        }

        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(
                "latitude must be -90 to 90, longitude must be -180 to 180".to_string(),
            );
        }

        if self.live_url.is_empty() || self.forecast_url.is_empty() {
            return Err("live_url and forecast_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}
