//! Daily aggregation of hourly forecast records
//!
//! A single forward pass over time-ordered [`HourlyRecord`]s. Consecutive
//! records sharing a local calendar date are folded into one
//! [`DailyRecord`]; a record is emitted whenever the date changes.

use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{DailyRecord, HourlyRecord};

const TEMP_MAX_INIT: i32 = -100;
const TEMP_MIN_INIT: i32 = 100;
const NOON: u32 = 12;

/// Policy for the last calendar day in the input
///
/// Only date changes emit a day, so without an explicit flush the final day
/// never gets emitted. [`TrailingDay::Drop`] keeps that historical
/// behavior for consumers that rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingDay {
    /// Emit the last day after the final record
    #[default]
    Flush,
    /// Silently drop the last day
    Drop,
}

/// Running totals for the day being folded
#[derive(Debug, Clone)]
struct DayAccumulator {
    date: NaiveDate,
    temp_max: i32,
    temp_min: i32,
    precipitation: f64,
    condition: String,
    icon: String,
    wind_speed_sum: f64,
    wind_bearing_sum: f64,
    count: u32,
}

impl DayAccumulator {
    /// Start a day, seeding condition/icon from its first record
    fn start(record: &HourlyRecord) -> Self {
        Self {
            date: record.date(),
            temp_max: TEMP_MAX_INIT,
            temp_min: TEMP_MIN_INIT,
            precipitation: 0.0,
            condition: record.condition.clone(),
            icon: record.icon.clone(),
            wind_speed_sum: 0.0,
            wind_bearing_sum: 0.0,
            count: 0,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn add(&mut self, record: &HourlyRecord) {
        let temperature = record.temperature as i32;
        self.temp_max = self.temp_max.max(temperature);
        self.temp_min = self.temp_min.min(temperature);

        if record.datetime.hour() == NOON {
            self.condition.clone_from(&record.condition);
            self.icon.clone_from(&record.icon);
        }

        self.precipitation += record.precipitation.abs();
        self.wind_speed_sum += record.wind_speed;
        self.wind_bearing_sum += record.wind_bearing;
        self.count += 1;
    }

    #[allow(clippy::cast_possible_truncation)]
    fn finish(self) -> DailyRecord {
        let count = f64::from(self.count.max(1));
        DailyRecord {
            date: self.date,
            temp_max: self.temp_max,
            temp_min: self.temp_min,
            precipitation: round_to_hundredths(self.precipitation),
            condition: self.condition,
            icon: self.icon,
            wind_speed: (self.wind_speed_sum / count) as i64,
            wind_bearing: (self.wind_bearing_sum / count) as i64,
        }
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fold hourly records into per-day summaries
///
/// Input must already be sorted by time. The noon record (local hour 12)
/// supplies the day's condition and icon; days without one keep the values
/// of their first record.
#[must_use]
pub fn aggregate_daily(records: &[HourlyRecord], trailing: TrailingDay) -> Vec<DailyRecord> {
    let (mut days, current) = records.iter().fold(
        (Vec::new(), None::<DayAccumulator>),
        |(mut days, current), record| {
            let mut day = match current {
                Some(day) if day.date == record.date() => day,
                Some(finished) => {
                    days.push(finished.finish());
                    DayAccumulator::start(record)
                },
                None => DayAccumulator::start(record),
            };
            day.add(record);
            (days, Some(day))
        },
    );

    if let Some(last) = current {
        match trailing {
            TrailingDay::Flush => days.push(last.finish()),
            TrailingDay::Drop => debug!(date = %last.date, "Dropping trailing day"),
        }
    }

    days
}
