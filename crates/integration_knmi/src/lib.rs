//! KNMI weather integration
//!
//! Client for the Meteoserver API (<https://meteoserver.nl>), which serves
//! KNMI-based live observations and hourly forecasts for the Netherlands.
//! Provider payloads are reshaped into stable records for home-automation
//! consumers:
//!
//! - [`CurrentConditions`] from the live endpoint
//! - [`HourlyRecord`]s (at most 24) from the forecast endpoint
//! - [`DailyRecord`]s aggregated from the full hourly forecast
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_knmi::{KnmiClient, KnmiConfig, WeatherClient};
//!
//! let client = KnmiClient::new(KnmiConfig::new("my-api-key", 52.09, 5.11))?;
//! let days = client.daily().await?;
//! ```

mod aggregate;
mod client;
mod config;
mod error;
mod models;
mod transport;

pub use aggregate::{TrailingDay, aggregate_daily};
pub use client::{HOURLY_LIMIT, KnmiClient, WeatherClient};
pub use config::KnmiConfig;
pub use error::KnmiError;
pub use models::{
    CurrentConditions, DailyRecord, HourlyRecord, PROVIDER_TIME_FORMAT, parse_local_time,
};
pub use transport::{JsonRequest, JsonTransport, ReqwestTransport, TransportError};
