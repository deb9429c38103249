// Render context and the frame handed to a renderer
use crate::domain::interval::Interval;
use crate::domain::scale::{tick_label, ValueRange};
use crate::domain::sensor::{Column, Series};
use crate::domain::transform::{PlotRect, Transform};
use crate::domain::window::{LabelStyle, TimeWindow};
use serde::Serialize;

/// Everything one redraw derives from its inputs, built fresh each time.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub window: TimeWindow,
    pub range: ValueRange,
    pub transform: Transform,
}

impl RenderContext {
    pub fn new(window: TimeWindow, range: ValueRange, rect: PlotRect) -> Self {
        Self {
            window,
            range,
            transform: Transform::new(rect, &window, &range),
        }
    }

    pub fn frame(
        &self,
        address: &str,
        series: &Series,
        column: Column,
        labels: &LabelStyle,
    ) -> RenderFrame {
        let interval = self.window.interval();

        let ticks_x = self
            .window
            .ticks()
            .into_iter()
            .map(|t| AxisTick {
                position: self.transform.to_x(t),
                label: labels.format(interval, t),
            })
            .collect();

        let ticks_y = self
            .range
            .ticks()
            .into_iter()
            .map(|v| AxisTick {
                position: self.transform.to_y(v),
                label: tick_label(v),
            })
            .collect();

        let points = series
            .samples()
            .iter()
            .filter_map(|s| {
                let v = s.value(column).filter(|v| v.is_finite())?;
                Some(PlotPoint {
                    x: self.transform.to_x(s.time),
                    y: self.transform.to_y(v),
                })
            })
            .collect();

        RenderFrame {
            address: address.to_string(),
            interval,
            column,
            unit: column.unit(),
            rect: self.transform.rect(),
            ticks_x,
            ticks_y,
            points,
            zero_crossing_y: self
                .range
                .crosses_zero()
                .then(|| self.transform.to_y(0.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

/// Pixel-space description of one chart; drawing it is the renderer's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub address: String,
    pub interval: Interval,
    pub column: Column,
    pub unit: &'static str,
    pub rect: PlotRect,
    pub ticks_x: Vec<AxisTick>,
    pub ticks_y: Vec<AxisTick>,
    pub points: Vec<PlotPoint>,
    pub zero_crossing_y: Option<f64>,
}
