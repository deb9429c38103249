// Axis scaler - value range and value-axis ticks for one column
use crate::domain::error::ChartError;
use crate::domain::sensor::{Column, Series};

/// Smallest spread the value axis is allowed to show.
const MIN_VALUE_RANGE: f64 = 1.0;
const MIN_RANGE_STEP: f64 = 0.2;
const TARGET_DIVISIONS: f64 = 5.0;
/// Slack for `range / step` landing a hair under a whole number.
const TICK_EPSILON: f64 = 1e-9;

/// Integer-bounded value range with a gridline step.
///
/// Invariants: `max_v > min_v` and `step > 0`, so both the tick generator
/// and the transform denominator are always well defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    min_v: f64,
    max_v: f64,
    step: f64,
}

impl ValueRange {
    /// Derive the range from every finite `column` value in `series`.
    ///
    /// Callers short-circuit on an empty series before getting here; a
    /// non-empty series with no usable values is `NoData`.
    pub fn scale(series: &Series, column: Column) -> Result<Self, ChartError> {
        let (raw_min, raw_max) = series
            .values(column)
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .ok_or(ChartError::NoData(column))?;

        Ok(Self::from_extremes(raw_min, raw_max))
    }

    /// Widen raw extremes to whole numbers and pick a step.
    pub fn from_extremes(raw_min: f64, raw_max: f64) -> Self {
        let min_v = raw_min.floor();
        let max_v = raw_max.ceil();
        let range = max_v - min_v;

        if range >= TARGET_DIVISIONS {
            Self {
                min_v,
                max_v,
                step: (range / TARGET_DIVISIONS).round(),
            }
        } else if range > MIN_VALUE_RANGE {
            Self {
                min_v,
                max_v,
                step: (range / TARGET_DIVISIONS * 10.0).round() / 10.0,
            }
        } else {
            Self {
                min_v,
                max_v: min_v + MIN_VALUE_RANGE,
                step: MIN_RANGE_STEP,
            }
        }
    }

    pub fn min_v(&self) -> f64 {
        self.min_v
    }

    pub fn max_v(&self) -> f64 {
        self.max_v
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn range(&self) -> f64 {
        self.max_v - self.min_v
    }

    pub fn crosses_zero(&self) -> bool {
        self.min_v < 0.0 && 0.0 < self.max_v
    }

    /// Number of gridlines from `min_v` up to `max_v` inclusive.
    pub fn tick_count(&self) -> usize {
        (self.range() / self.step + TICK_EPSILON).floor() as usize + 1
    }

    /// Gridline values, rounded to one decimal.
    ///
    /// Each tick is computed from its index rather than by accumulating the
    /// step, so float drift cannot add or drop a line.
    pub fn ticks(&self) -> Vec<f64> {
        (0..self.tick_count())
            .map(|i| round_tenth(self.min_v + i as f64 * self.step))
            .collect()
    }
}

fn round_tenth(v: f64) -> f64 {
    let rounded = (v * 10.0).round() / 10.0;
    // Avoid printing "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Label for a value-axis tick: "20", "20.4", "-0.6"
pub fn tick_label(v: f64) -> String {
    format!("{}", round_tenth(v))
}
