// Chart instance - polling redraw loop owned by a cancelable handle
use crate::application::chart_service::{ChartService, ChartSettings};
use crate::application::renderer::Renderer;
use crate::domain::interval::Interval;
use crate::domain::sensor::Column;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Observable state of one chart instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartStatus {
    pub phase: Phase,
    pub settings: ChartSettings,
    /// Message of the last failed redraw, cleared by the next successful one
    pub error: Option<String>,
    /// Completed redraw cycles, successful or not
    pub redraws: u64,
    pub drawn_at: Option<DateTime<Utc>>,
}

impl ChartStatus {
    fn new(settings: ChartSettings) -> Self {
        Self {
            phase: Phase::Idle,
            settings,
            error: None,
            redraws: 0,
            drawn_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Refresh,
    /// Settings changed together; `None` keeps the current value
    Update {
        interval: Option<Interval>,
        column: Option<Column>,
    },
}

/// Worker side of a chart: runs on its own task and owns the renderer.
///
/// Redraws never overlap. Triggers that arrive while a redraw is in flight
/// queue up and are folded into a single follow-up redraw, with the latest
/// setting of each kind winning.
pub struct ChartInstance {
    name: String,
    service: ChartService,
    renderer: Box<dyn Renderer>,
    settings: ChartSettings,
    status: watch::Sender<ChartStatus>,
}

impl ChartInstance {
    /// Start polling `name`. The first redraw runs immediately.
    pub fn attach(
        name: impl Into<String>,
        service: ChartService,
        renderer: Box<dyn Renderer>,
        settings: ChartSettings,
        poll_every: Duration,
    ) -> ChartHandle {
        let name = name.into();
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ChartStatus::new(settings));

        let instance = Self {
            name: name.clone(),
            service,
            renderer,
            settings,
            status: status_tx,
        };

        tracing::info!(
            "Attaching chart {} ({} / {}, polling every {:?})",
            name,
            settings.interval,
            settings.column,
            poll_every
        );
        let task = tokio::spawn(instance.run(trigger_rx, poll_every));

        ChartHandle {
            name,
            triggers: trigger_tx,
            status: status_rx,
            task,
        }
    }

    async fn run(mut self, mut triggers: mpsc::UnboundedReceiver<Trigger>, poll_every: Duration) {
        let mut timer = tokio::time::interval(poll_every);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                trigger = triggers.recv() => match trigger {
                    Some(trigger) => self.apply(trigger),
                    None => break,
                },
                _ = timer.tick() => {}
            }

            while let Ok(trigger) = triggers.try_recv() {
                self.apply(trigger);
            }

            self.redraw().await;
            // The next periodic redraw is a full period after this one
            timer.reset();
        }

        tracing::debug!("Chart {} stopped: handle dropped", self.name);
    }

    fn apply(&mut self, trigger: Trigger) {
        match trigger {
            Trigger::Refresh => {}
            Trigger::Update { interval, column } => {
                if let Some(interval) = interval {
                    self.settings.interval = interval;
                }
                if let Some(column) = column {
                    self.settings.column = column;
                }
            }
        }
        let settings = self.settings;
        self.publish(|s| s.settings = settings);
    }

    async fn redraw(&mut self) {
        self.publish(|s| s.phase = Phase::Loading);
        let now = Utc::now();

        match self.service.render(&self.name, self.settings, now).await {
            Ok(Some(frame)) => {
                self.publish(|s| s.phase = Phase::Ready);
                self.renderer.draw(&frame);
                self.publish(|s| {
                    s.phase = Phase::Idle;
                    s.error = None;
                    s.redraws += 1;
                    s.drawn_at = Some(now);
                });
            }
            Ok(None) => {
                self.publish(|s| {
                    s.phase = Phase::Idle;
                    s.error = None;
                    s.redraws += 1;
                });
            }
            Err(e) => {
                tracing::warn!("Redraw of chart {} failed: {}", self.name, e);
                self.publish(|s| {
                    s.phase = Phase::Error;
                    s.error = Some(e.to_string());
                    s.redraws += 1;
                });
            }
        }
    }

    fn publish(&self, update: impl FnOnce(&mut ChartStatus)) {
        self.status.send_modify(update);
    }
}

/// Caller side of a chart instance.
///
/// Dropping the handle cancels the polling task, so no redraw can fire
/// against a surface that is gone.
pub struct ChartHandle {
    name: String,
    triggers: mpsc::UnboundedSender<Trigger>,
    status: watch::Receiver<ChartStatus>,
    task: JoinHandle<()>,
}

impl ChartHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn refresh(&self) {
        self.send(Trigger::Refresh);
    }

    /// Apply a new interval and/or column in one step, then redraw
    pub fn update(&self, interval: Option<Interval>, column: Option<Column>) {
        self.send(Trigger::Update { interval, column });
    }

    pub fn status(&self) -> ChartStatus {
        self.status.borrow().clone()
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<ChartStatus> {
        self.status.clone()
    }

    pub fn detach(self) {
        tracing::info!("Detaching chart {}", self.name);
    }

    fn send(&self, trigger: Trigger) {
        if self.triggers.send(trigger).is_err() {
            tracing::warn!("Chart {} is no longer running, dropped {:?}", self.name, trigger);
        }
    }
}

impl Drop for ChartHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
