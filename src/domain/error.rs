// Chart error taxonomy
use crate::domain::sensor::Column;
use thiserror::Error;

/// Everything that can abort a redraw.
///
/// An empty series is deliberately absent: it is the "nothing to draw" path,
/// reported as `Ok(None)` by the chart service.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChartError {
    #[error("invalid interval `{0}` (expected day, week, month or year)")]
    InvalidInterval(String),

    #[error("invalid column `{0}`")]
    InvalidColumn(String),

    #[error("invalid label settings: {0}")]
    InvalidLabels(String),

    #[error("no {0} values in the returned series")]
    NoData(Column),

    #[error("fetch failed: {0}")]
    FetchFailure(String),
}
