// Coordinate transform - data space to plotting-surface pixels
use crate::domain::scale::ValueRange;
use crate::domain::window::TimeWindow;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 300.0;
pub const DEFAULT_MARGIN_X: f64 = 40.0;
pub const DEFAULT_MARGIN_Y: f64 = 30.0;

/// Plotting rectangle in surface pixels; y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl PlotRect {
    /// Inset a `width` x `height` canvas by the given margins on every side
    pub fn from_canvas(width: f64, height: f64, margin_x: f64, margin_y: f64) -> Self {
        Self {
            min_x: margin_x,
            min_y: margin_y,
            max_x: width - margin_x,
            max_y: height - margin_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn is_drawable(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }
}

impl Default for PlotRect {
    fn default() -> Self {
        Self::from_canvas(
            DEFAULT_CANVAS_WIDTH,
            DEFAULT_CANVAS_HEIGHT,
            DEFAULT_MARGIN_X,
            DEFAULT_MARGIN_Y,
        )
    }
}

/// Affine maps from `(time, value)` to `(x, y)` inside a `PlotRect`.
///
/// Only constructed from a resolved `TimeWindow` and a scaled `ValueRange`,
/// which guarantee both denominators are positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    rect: PlotRect,
    min_t_ms: i64,
    range_t_ms: f64,
    min_v: f64,
    range_v: f64,
}

impl Transform {
    pub fn new(rect: PlotRect, window: &TimeWindow, range: &ValueRange) -> Self {
        Self {
            rect,
            min_t_ms: window.min_t().timestamp_millis(),
            range_t_ms: window.range_ms() as f64,
            min_v: range.min_v(),
            range_v: range.range(),
        }
    }

    pub fn rect(&self) -> PlotRect {
        self.rect
    }

    pub fn to_x(&self, t: DateTime<Utc>) -> f64 {
        let f = (t.timestamp_millis() - self.min_t_ms) as f64 / self.range_t_ms;
        lerp(self.rect.min_x, self.rect.max_x, f)
    }

    pub fn to_y(&self, v: f64) -> f64 {
        let f = (v - self.min_v) / self.range_v;
        lerp(self.rect.max_y, self.rect.min_y, f)
    }
}

/// Exact at both ends: `f == 0` gives `a`, `f == 1` gives `b`.
fn lerp(a: f64, b: f64, f: f64) -> f64 {
    a * (1.0 - f) + b * f
}
