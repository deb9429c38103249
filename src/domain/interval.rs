// Interval domain model - lookback, tick cadence and label policy per view
use crate::domain::error::ChartError;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const HOUR_MS: i64 = 3_600_000;
pub const DAY_MS: i64 = 24 * HOUR_MS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

/// Spacing between two time-axis gridlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStep {
    /// A fixed number of milliseconds, counted from the epoch.
    Fixed(i64),
    /// Whole calendar months, starting at the first of the month.
    Months(u32),
}

impl Interval {
    pub const ALL: [Interval; 4] = [Interval::Day, Interval::Week, Interval::Month, Interval::Year];

    pub fn key(self) -> &'static str {
        match self {
            Interval::Day => "day",
            Interval::Week => "week",
            Interval::Month => "month",
            Interval::Year => "year",
        }
    }

    pub fn lookback(self) -> TimeDelta {
        match self {
            Interval::Day => TimeDelta::hours(24),
            Interval::Week => TimeDelta::days(7),
            Interval::Month => TimeDelta::days(30),
            Interval::Year => TimeDelta::days(365),
        }
    }

    pub fn step(self) -> TimeStep {
        match self {
            Interval::Day => TimeStep::Fixed(2 * HOUR_MS),
            Interval::Week => TimeStep::Fixed(DAY_MS),
            Interval::Month => TimeStep::Fixed(2 * DAY_MS),
            Interval::Year => TimeStep::Months(1),
        }
    }

    /// Boundary the window start is floored to.
    ///
    /// The day view floors to the hour rather than to its 2h step; ticks are
    /// still placed on 2h boundaries.
    pub fn alignment(self) -> TimeStep {
        match self {
            Interval::Day => TimeStep::Fixed(HOUR_MS),
            other => other.step(),
        }
    }

    /// strftime pattern for tick labels
    pub fn label_pattern(self) -> &'static str {
        match self {
            Interval::Day => "%H:%M",
            Interval::Week | Interval::Month => "%m/%d",
            Interval::Year => "%b",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Interval {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.key() == s)
            .ok_or_else(|| ChartError::InvalidInterval(s.to_string()))
    }
}
