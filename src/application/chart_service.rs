// Chart service - one redraw: resolve window, fetch, scale, project
use crate::application::data_source::SensorDataSource;
use crate::domain::chart::{RenderContext, RenderFrame};
use crate::domain::error::ChartError;
use crate::domain::interval::Interval;
use crate::domain::scale::ValueRange;
use crate::domain::sensor::{Column, Series};
use crate::domain::transform::PlotRect;
use crate::domain::window::{LabelStyle, TimeWindow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// What a chart shows; changed by the user, read at every redraw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChartSettings {
    pub interval: Interval,
    pub column: Column,
}

#[derive(Clone)]
pub struct ChartService {
    source: Arc<dyn SensorDataSource>,
    rect: PlotRect,
    labels: LabelStyle,
    fetch_timeout: Duration,
}

impl ChartService {
    pub fn new(
        source: Arc<dyn SensorDataSource>,
        rect: PlotRect,
        labels: LabelStyle,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            rect,
            labels,
            fetch_timeout,
        }
    }

    /// Build the frame for `series` as of `now`.
    ///
    /// `Ok(None)` means the source had no samples in the window: nothing to
    /// draw, but not a failure either.
    pub async fn render(
        &self,
        series: &str,
        settings: ChartSettings,
        now: DateTime<Utc>,
    ) -> Result<Option<RenderFrame>, ChartError> {
        let window = TimeWindow::resolve_in(settings.interval, now, self.labels.offset());

        let columns = [settings.column];
        let fetch = self
            .source
            .fetch_series(series, window.min_t(), window.max_t(), &columns);
        let readings = tokio::time::timeout(self.fetch_timeout, fetch)
            .await
            .map_err(|_| {
                ChartError::FetchFailure(format!(
                    "no response within {}s",
                    self.fetch_timeout.as_secs_f64()
                ))
            })?
            .map_err(|e| ChartError::FetchFailure(format!("{:#}", e)))?;

        let samples = Series::new(readings.sensor_data);
        if samples.is_empty() {
            tracing::debug!("{}: no samples for the last {}", series, settings.interval);
            return Ok(None);
        }

        let range = ValueRange::scale(&samples, settings.column)?;
        tracing::debug!(
            "{}: {} samples, {} in [{}, {}] step {}",
            series,
            samples.len(),
            settings.column,
            range.min_v(),
            range.max_v(),
            range.step()
        );

        let context = RenderContext::new(window, range, self.rect);
        Ok(Some(context.frame(
            &readings.address,
            &samples,
            settings.column,
            &self.labels,
        )))
    }
}
