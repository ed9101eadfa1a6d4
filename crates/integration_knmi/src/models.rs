//! Weather data models
//!
//! Output records handed to consumers, plus the raw Meteoserver payload rows
//! they are mapped from. The provider uses Dutch field names and usually
//! encodes numbers as JSON strings.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Local-time format used by the provider (`tijd_nl`)
pub const PROVIDER_TIME_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Current weather conditions at the configured location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Place name
    pub location: String,
    /// Observation station, when the provider reports one
    pub station: Option<String>,
    /// Temperature in Celsius
    pub temperature: Option<f64>,
    /// Feels-like temperature in Celsius
    pub feels_like: Option<f64>,
    /// Dew point in Celsius
    pub dewpoint: Option<f64>,
    /// Short condition text
    pub condition: String,
    /// Provider icon name
    pub icon: String,
    /// Free-text expectation for the coming hours
    pub description: Option<String>,
    /// Relative humidity percentage
    pub humidity: Option<f64>,
    /// Wind direction (compass text)
    pub wind_direction: String,
    /// Wind speed in m/s
    pub wind_speed_ms: Option<f64>,
    /// Wind speed in Beaufort
    pub wind_speed_bft: Option<f64>,
    /// Wind speed in km/h
    pub wind_speed_kmh: Option<f64>,
    /// Wind speed in knots
    pub wind_speed_knots: Option<f64>,
    /// Air pressure in hPa
    pub pressure_hpa: Option<f64>,
    /// Visibility in km
    pub visibility: Option<f64>,
    /// Today's maximum temperature
    pub day_temp_max: Option<f64>,
    /// Today's minimum temperature
    pub day_temp_min: Option<f64>,
    /// Today's icon name
    pub day_icon: String,
    /// Today's precipitation probability percentage
    pub day_precip_probability: Option<f64>,
    /// Today's wind speed in Beaufort
    pub day_wind_speed_bft: Option<f64>,
    /// Today's wind direction (compass text)
    pub day_wind_direction: Option<String>,
}

/// One hour of forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    /// Raw provider timestamp
    pub time: String,
    /// Local time, serialized as ISO-8601
    pub datetime: NaiveDateTime,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Provider icon name
    pub icon: String,
    /// Provider icon code
    pub icon_code: String,
    /// Condition text
    pub condition: String,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Precipitation in mm
    pub precipitation: f64,
    /// Wind bearing in degrees
    pub wind_bearing: f64,
    /// Wind direction (compass text)
    pub wind_direction: String,
}

impl HourlyRecord {
    /// Local calendar date of this hour
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.datetime.date()
    }
}

/// One calendar day aggregated from hourly records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Local calendar date
    pub date: NaiveDate,
    /// Maximum temperature
    pub temp_max: i32,
    /// Minimum temperature
    pub temp_min: i32,
    /// Accumulated precipitation in mm, rounded to 2 decimals
    pub precipitation: f64,
    /// Condition text around local noon
    pub condition: String,
    /// Icon name around local noon
    pub icon: String,
    /// Average wind speed in m/s
    pub wind_speed: i64,
    /// Average wind bearing in degrees
    pub wind_bearing: i64,
}

/// Raw live weather response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LiveResponse {
    pub liveweer: Vec<LiveRow>,
}

/// Raw live weather row
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LiveRow {
    #[serde(default, deserialize_with = "text")]
    pub plaats: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub station: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub stationnaam: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    pub temp: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub gtemp: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub dauwp: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    pub samenv: String,
    #[serde(default, deserialize_with = "text")]
    pub image: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub verw: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    pub lv: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    pub windr: String,
    #[serde(default, deserialize_with = "optional_number")]
    pub windms: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub winds: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub windkmh: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub windk: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub luchtd: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub zicht: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub d0tmax: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub d0tmin: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    pub d0weer: String,
    #[serde(default, deserialize_with = "optional_number")]
    pub d0neerslag: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub d0windk: Option<f64>,
    #[serde(default, deserialize_with = "optional_text")]
    pub d0windr: Option<String>,
}

impl From<LiveRow> for CurrentConditions {
    fn from(row: LiveRow) -> Self {
        Self {
            location: row.plaats,
            station: row.station.or(row.stationnaam),
            temperature: row.temp,
            feels_like: row.gtemp,
            dewpoint: row.dauwp,
            condition: row.samenv,
            icon: row.image,
            description: row.verw,
            humidity: row.lv,
            wind_direction: row.windr,
            wind_speed_ms: row.windms,
            wind_speed_bft: row.winds,
            wind_speed_kmh: row.windkmh,
            wind_speed_knots: row.windk,
            pressure_hpa: row.luchtd,
            visibility: row.zicht,
            day_temp_max: row.d0tmax,
            day_temp_min: row.d0tmin,
            day_icon: row.d0weer,
            day_precip_probability: row.d0neerslag,
            day_wind_speed_bft: row.d0windk,
            day_wind_direction: row.d0windr,
        }
    }
}

/// Raw forecast response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ForecastResponse {
    pub data: Vec<serde_json::Value>,
}

/// Raw hourly forecast row
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ForecastRow {
    #[serde(deserialize_with = "text")]
    pub tijd: String,
    #[serde(deserialize_with = "text")]
    pub tijd_nl: String,
    #[serde(deserialize_with = "number")]
    pub temp: f64,
    #[serde(default, deserialize_with = "text")]
    pub icoon: String,
    #[serde(default, deserialize_with = "text")]
    pub ico: String,
    #[serde(default, deserialize_with = "text")]
    pub samenv: String,
    #[serde(default, deserialize_with = "optional_number")]
    pub windms: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub windkmh: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub neersl: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub windr: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    pub windrltr: String,
}

impl ForecastRow {
    /// Map to an [`HourlyRecord`], parsing the provider's local time
    pub(crate) fn into_record(self) -> Result<HourlyRecord, chrono::ParseError> {
        let datetime = parse_local_time(&self.tijd_nl)?;
        let wind_speed = self
            .windms
            .or_else(|| self.windkmh.map(|kmh| kmh / 3.6))
            .unwrap_or_default();

        Ok(HourlyRecord {
            time: self.tijd,
            datetime,
            temperature: self.temp,
            icon: self.icoon,
            icon_code: self.ico,
            condition: self.samenv,
            wind_speed,
            precipitation: self.neersl.unwrap_or_default(),
            wind_bearing: self.windr.unwrap_or_default(),
            wind_direction: self.windrltr,
        })
    }
}

/// Parse the provider's `DD-MM-YYYY HH:MM` local time
///
/// # Errors
///
/// Returns an error if the string does not match the provider format.
pub fn parse_local_time(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s.trim(), PROVIDER_TIME_FORMAT)
}

/// A JSON scalar as the provider sends it
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
            Self::Bool(b) => b.to_string(),
        }
    }

    fn into_number(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Text(s) => s.trim().replace(',', ".").parse().ok(),
            Self::Bool(_) => None,
        }
    }
}

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .unwrap_or_default())
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .filter(|s| !s.trim().is_empty() && s.trim() != "-"))
}

fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(Scalar::into_number))
}

fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Scalar::deserialize(deserializer)?;
    let shown = match &value {
        Scalar::Number(n) => n.to_string(),
        Scalar::Text(s) => s.clone(),
        Scalar::Bool(b) => b.to_string(),
    };
    value
        .into_number()
        .ok_or_else(|| serde::de::Error::custom(format!("not a number: {shown:?}")))
}
