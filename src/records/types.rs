//! Typed model for downloaded ride records.
//!
//! The portal delivers loosely-typed JSON; parsing goes through an explicit
//! step that either yields a fully-typed value or a [`RecordError`], so no
//! field access can fail later during export.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A scalar telemetry value as the portal encodes it.
///
/// Keeps the integer/decimal distinction of the source payload so that a
/// value round-trips and renders exactly as it arrived (`10` stays "10",
/// `1.0` stays "1.0"). An absent reading is `None` on the surrounding
/// `Option`, never a zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    /// Integer-encoded value (cadence, power, heart rate)
    Int(i64),
    /// Decimal-encoded value (speed, altitude, coordinates)
    Float(f64),
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Int(v) => write!(f, "{v}"),
            // {:?} keeps a trailing ".0" on whole floats, matching the
            // source encoding
            Reading::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// One coordinate sample: `(latitude, longitude)`, either half may be null.
pub type Coordinate = (Option<Reading>, Option<Reading>);

/// Errors raised while loading or parsing a ride record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Required field missing or not coercible to its declared type
    #[error("malformed ride record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Record file could not be read or written
    #[error("record file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Share of riding time spent in one assistance level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssistanceLevelPercentage {
    pub level: i64,
    pub value: f64,
}

/// Lightweight listing entry for one ride, as returned by the headers
/// endpoint. Only consumed to decide which ride ids fall inside a
/// requested time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideHeader {
    #[serde(with = "flex_string")]
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_time: DateTime<Utc>,
    #[serde(with = "duration_seconds")]
    pub driving_time: Duration,
    #[serde(rename = "type")]
    pub ride_type: String,
    pub status: i64,
    pub total_distance: f64,
    pub title: String,
    pub calories: f64,
    pub avg_speed: f64,
    pub max_speed: f64,
    pub header_rides_ids: Vec<String>,
}

/// Grouping entity from the listing endpoint; owns zero or more ride
/// headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(with = "flex_string")]
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_time: DateTime<Utc>,
    #[serde(with = "duration_seconds")]
    pub driving_time: Duration,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub status: i64,
    pub total_distance: f64,
    pub header_rides_ids: Vec<String>,
    pub ride_headers: Vec<RideHeader>,
}

impl Activity {
    /// Ids of the rides whose start time falls inside `[since, to]`.
    pub fn ride_ids_between(&self, since: DateTime<Utc>, to: DateTime<Utc>) -> Vec<String> {
        self.ride_headers
            .iter()
            .filter(|header| since <= header.start_time && header.start_time <= to)
            .map(|header| header.id.clone())
            .collect()
    }
}

/// Full detail record for one ride.
///
/// Per-sample arrays are lists of segments (outer level), each segment a
/// list of per-index samples. Only segment 0 is consumed during export.
/// Individual samples may be null ("no reading"), the arrays themselves
/// are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    #[serde(with = "flex_string")]
    pub id: String,
    /// Ride start, epoch milliseconds on the wire
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    /// Ride end, epoch milliseconds on the wire
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_time: DateTime<Utc>,
    /// Active riding time, whole seconds on the wire
    #[serde(with = "duration_seconds")]
    pub driving_time: Duration,
    #[serde(rename = "type")]
    pub ride_type: String,
    pub status: i64,
    /// Total distance in meters
    pub total_distance: f64,
    pub title: String,
    #[serde(with = "flex_string")]
    pub operation_time: String,
    pub header_type: String,
    pub calories: f64,
    pub avg_speed: f64,
    pub avg_heart_rate: f64,
    pub avg_cadence: f64,
    pub avg_altitude: f64,
    pub max_speed: f64,
    pub max_heart_rate: i64,
    pub max_cadence: i64,
    pub max_altitude: f64,
    /// Cadence per sample, RPM
    pub cadence: Vec<Vec<Option<Reading>>>,
    /// Heart rate per sample, BPM
    pub heart_rate: Vec<Vec<Option<Reading>>>,
    /// Speed per sample
    pub speed: Vec<Vec<Option<Reading>>>,
    /// `(latitude, longitude)` per sample
    pub coordinates: Vec<Vec<Coordinate>>,
    /// Altitude per sample as resolved by the portal
    pub portal_altitudes: Vec<Vec<Option<Reading>>>,
    pub training_effect: i64,
    pub training_load_peak: i64,
    pub speed_weight: i64,
    pub cadence_weight: i64,
    pub driver_power_weight: i64,
    pub significant: i64,
    pub elevation_gain: f64,
    pub elevation_loss: f64,
    pub total_driver_power: i64,
    pub total_driver_consumption_percentage: f64,
    pub total_battery_consumption_percentage: f64,
    #[serde(with = "flex_string")]
    pub bui_decoded_serial_number: String,
    #[serde(with = "flex_string")]
    pub bui_decoded_part_number: String,
    #[serde(with = "flex_string")]
    pub drive_unit_decoded_serial_number: String,
    #[serde(with = "flex_string")]
    pub drive_unit_decoded_part_number: String,
    pub average_driver_power: f64,
    /// Rider power output per sample, watts
    pub power_output: Vec<Vec<Option<Reading>>>,
    pub significant_assistance_level_percentages: Vec<AssistanceLevelPercentage>,
    #[serde(with = "flex_string")]
    pub drive_unit_serial: String,
}

impl Ride {
    /// Parse a ride from a raw portal payload.
    pub fn from_value(value: serde_json::Value) -> Result<Self, RecordError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Identifier fields the portal encodes as either a JSON string or a JSON
/// number. Accepted in both shapes, stored and re-encoded as a string.
mod flex_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        })
    }
}

/// Spans are carried on the wire as whole seconds.
mod duration_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::seconds(i64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
pub(crate) fn fixture_ride() -> Ride {
    use chrono::TimeZone;

    Ride {
        id: "900123".to_string(),
        start_time: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        end_time: Utc.with_ymd_and_hms(2023, 1, 1, 0, 1, 0).unwrap(),
        driving_time: Duration::seconds(60),
        ride_type: "BIKE_RIDE".to_string(),
        status: 1,
        total_distance: 412.0,
        title: "Morning loop".to_string(),
        operation_time: "3600".to_string(),
        header_type: "RIDE".to_string(),
        calories: 18.0,
        avg_speed: 24.7,
        avg_heart_rate: 121.0,
        avg_cadence: 74.0,
        avg_altitude: 15.0,
        max_speed: 31.2,
        max_heart_rate: 141,
        max_cadence: 92,
        max_altitude: 20.0,
        cadence: vec![vec![None, None]],
        heart_rate: vec![vec![None, None]],
        speed: vec![vec![None, None]],
        coordinates: vec![vec![
            (Some(Reading::Float(1.0)), Some(Reading::Float(2.0))),
            (Some(Reading::Float(1.1)), Some(Reading::Float(2.1))),
        ]],
        portal_altitudes: vec![vec![Some(Reading::Int(10)), Some(Reading::Int(20))]],
        training_effect: 0,
        training_load_peak: 0,
        speed_weight: 100,
        cadence_weight: 100,
        driver_power_weight: 100,
        significant: 1,
        elevation_gain: 12.0,
        elevation_loss: 9.0,
        total_driver_power: 54,
        total_driver_consumption_percentage: 40.0,
        total_battery_consumption_percentage: 3.0,
        bui_decoded_serial_number: "4711".to_string(),
        bui_decoded_part_number: "BUI330".to_string(),
        drive_unit_decoded_serial_number: "0815".to_string(),
        drive_unit_decoded_part_number: "DU450".to_string(),
        average_driver_power: 87.5,
        power_output: vec![vec![None, None]],
        significant_assistance_level_percentages: vec![AssistanceLevelPercentage {
            level: 2,
            value: 0.8,
        }],
        drive_unit_serial: "DU-0815".to_string(),
    }
}
