// Data source trait for sensor readings
use crate::domain::sensor::{Column, DeviceReadings};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait SensorDataSource: Send + Sync {
    /// Fetch the readings of `series` recorded between `start` and `end`,
    /// restricted to `columns`
    async fn fetch_series(
        &self,
        series: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        columns: &[Column],
    ) -> anyhow::Result<DeviceReadings>;
}
