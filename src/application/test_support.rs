// In-memory sensor source for service and instance tests
use crate::application::data_source::SensorDataSource;
use crate::application::renderer::Renderer;
use crate::domain::chart::RenderFrame;
use crate::domain::sensor::{Column, DeviceReadings, Sample};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct FetchCall {
    pub series: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub columns: Vec<Column>,
}

/// Readings for `column`, one per hour, the last one at `now`
pub fn readings(now: DateTime<Utc>, column: Column, values: &[f64]) -> DeviceReadings {
    let count = values.len() as i64;
    let sensor_data = values
        .iter()
        .enumerate()
        .map(|(i, v)| Sample::new(now - TimeDelta::hours(count - 1 - i as i64)).with(column, *v))
        .collect();
    DeviceReadings {
        address: "C4:7C:8D:6A:12:34".to_string(),
        sensor_data,
    }
}

/// Answers queued responses first, then `fallback` forever.
///
/// When gated, every fetch consumes one semaphore permit before answering,
/// so a test can hold a redraw in flight.
pub struct FakeSource {
    fallback: DeviceReadings,
    queued: Mutex<VecDeque<anyhow::Result<DeviceReadings>>>,
    calls: Mutex<Vec<FetchCall>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeSource {
    pub fn new(fallback: DeviceReadings) -> Self {
        Self {
            fallback,
            queued: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn push_err(&self, message: &str) {
        self.queued
            .lock()
            .unwrap()
            .push_back(Err(anyhow::anyhow!(message.to_string())));
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SensorDataSource for FakeSource {
    async fn fetch_series(
        &self,
        series: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        columns: &[Column],
    ) -> anyhow::Result<DeviceReadings> {
        self.calls.lock().unwrap().push(FetchCall {
            series: series.to_string(),
            start,
            end,
            columns: columns.to_vec(),
        });

        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }

        let next = self.queued.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

/// Renderer that keeps every frame it was asked to draw
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    frames: Arc<Mutex<Vec<RenderFrame>>>,
}

impl RecordingRenderer {
    pub fn frames(&self) -> Vec<RenderFrame> {
        self.frames.lock().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, frame: &RenderFrame) {
        self.frames.lock().unwrap().push(frame.clone());
    }
}
