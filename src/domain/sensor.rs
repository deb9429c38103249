// Sensor reading domain models
use crate::domain::error::ChartError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A plottable sensor field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Column {
    #[default]
    Temperature,
    Humidity,
    Pressure,
    AccelerationX,
    AccelerationY,
    AccelerationZ,
    Voltage,
    TxPower,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Temperature,
        Column::Humidity,
        Column::Pressure,
        Column::AccelerationX,
        Column::AccelerationY,
        Column::AccelerationZ,
        Column::Voltage,
        Column::TxPower,
    ];

    /// Name used on the wire and in query strings
    pub fn key(self) -> &'static str {
        match self {
            Column::Temperature => "temperature",
            Column::Humidity => "humidity",
            Column::Pressure => "pressure",
            Column::AccelerationX => "accelerationX",
            Column::AccelerationY => "accelerationY",
            Column::AccelerationZ => "accelerationZ",
            Column::Voltage => "voltage",
            Column::TxPower => "txPower",
        }
    }

    /// Display unit drawn next to the value axis
    pub fn unit(self) -> &'static str {
        match self {
            Column::Temperature => "°C",
            Column::Humidity => "%",
            Column::Pressure => "hPa",
            Column::AccelerationX | Column::AccelerationY | Column::AccelerationZ => "g",
            Column::Voltage => "V",
            Column::TxPower => "dBm",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Column {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| ChartError::InvalidColumn(s.to_string()))
    }
}

/// One reading as delivered by the sensor endpoint.
///
/// Every value is optional: older tags do not report acceleration, and the
/// endpoint emits `null` for fields a sample lacks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    #[serde(deserialize_with = "deserialize_time")]
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub acceleration_x: Option<f64>,
    #[serde(default)]
    pub acceleration_y: Option<f64>,
    #[serde(default)]
    pub acceleration_z: Option<f64>,
    #[serde(default)]
    pub voltage: Option<f64>,
    #[serde(default)]
    pub tx_power: Option<f64>,
}

impl Sample {
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Temperature => self.temperature,
            Column::Humidity => self.humidity,
            Column::Pressure => self.pressure,
            Column::AccelerationX => self.acceleration_x,
            Column::AccelerationY => self.acceleration_y,
            Column::AccelerationZ => self.acceleration_z,
            Column::Voltage => self.voltage,
            Column::TxPower => self.tx_power,
        }
    }
}

#[cfg(test)]
impl Sample {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time,
            temperature: None,
            humidity: None,
            pressure: None,
            acceleration_x: None,
            acceleration_y: None,
            acceleration_z: None,
            voltage: None,
            tx_power: None,
        }
    }

    pub fn with(mut self, column: Column, value: f64) -> Self {
        *self.slot(column) = Some(value);
        self
    }

    fn slot(&mut self, column: Column) -> &mut Option<f64> {
        match column {
            Column::Temperature => &mut self.temperature,
            Column::Humidity => &mut self.humidity,
            Column::Pressure => &mut self.pressure,
            Column::AccelerationX => &mut self.acceleration_x,
            Column::AccelerationY => &mut self.acceleration_y,
            Column::AccelerationZ => &mut self.acceleration_z,
            Column::Voltage => &mut self.voltage,
            Column::TxPower => &mut self.tx_power,
        }
    }
}

/// Samples ordered by non-decreasing time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    pub fn new(mut samples: Vec<Sample>) -> Self {
        // Stable, so samples sharing a timestamp keep their delivery order
        samples.sort_by_key(|s| s.time);
        Self { samples }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Finite values of `column`; missing and NaN readings are skipped.
    pub fn values(&self, column: Column) -> impl Iterator<Item = f64> + '_ {
        self.samples
            .iter()
            .filter_map(move |s| s.value(column))
            .filter(|v| v.is_finite())
    }
}

impl From<Vec<Sample>> for Series {
    fn from(samples: Vec<Sample>) -> Self {
        Self::new(samples)
    }
}

/// Payload returned by the sensor endpoint for one device
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceReadings {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub sensor_data: Vec<Sample>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireTime {
    Millis(i64),
    Text(String),
}

fn deserialize_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match WireTime::deserialize(deserializer)? {
        WireTime::Millis(ms) => DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| de::Error::custom(format!("timestamp {} out of range", ms))),
        WireTime::Text(text) => parse_time(&text)
            .ok_or_else(|| de::Error::custom(format!("unrecognized time `{}`", text))),
    }
}

/// Accepts RFC 3339, or a naive ISO timestamp which is taken as UTC.
fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}
