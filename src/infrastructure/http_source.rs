// HTTP sensor endpoint implementation
use crate::application::data_source::SensorDataSource;
use crate::domain::sensor::{Column, DeviceReadings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSensorSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSensorSource {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn series_url(&self, series: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(series))
    }

    fn query_params(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        columns: &[Column],
    ) -> Vec<(&'static str, String)> {
        let columns = columns
            .iter()
            .map(|c| c.key())
            .collect::<Vec<_>>()
            .join(",");

        vec![
            ("start", start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("end", end.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("columns", columns),
        ]
    }
}

#[async_trait]
impl SensorDataSource for HttpSensorSource {
    async fn fetch_series(
        &self,
        series: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        columns: &[Column],
    ) -> Result<DeviceReadings> {
        let url = self.series_url(series);
        tracing::debug!("Fetching {} from {} to {}", url, start, end);

        let response = self
            .client
            .get(&url)
            .query(&Self::query_params(start, end, columns))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to sensor endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Sensor endpoint returned {}: {}", status, body.trim());
        }

        let readings = response
            .json::<DeviceReadings>()
            .await
            .context("Failed to parse sensor endpoint response")?;

        tracing::debug!(
            "Got {} samples for {} ({})",
            readings.sensor_data.len(),
            series,
            readings.address
        );
        Ok(readings)
    }
}
