// HTTP request handlers
use crate::application::chart_instance::ChartStatus;
use crate::domain::chart::RenderFrame;
use crate::domain::error::ChartError;
use crate::domain::interval::Interval;
use crate::domain::sensor::Column;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct SettingsQuery {
    pub interval: Option<String>,
    pub column: Option<String>,
}

#[derive(Serialize)]
pub struct ChartSummary {
    pub name: String,
    #[serde(flatten)]
    pub status: ChartStatus,
}

#[derive(Serialize)]
pub struct ChartView {
    pub name: String,
    pub status: ChartStatus,
    pub frame: Option<RenderFrame>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all charts with their current state
pub async fn list_charts(State(state): State<Arc<AppState>>) -> Json<Vec<ChartSummary>> {
    let charts = state
        .charts
        .values()
        .map(|chart| ChartSummary {
            name: chart.handle.name().to_string(),
            status: chart.handle.status(),
        })
        .collect();
    Json(charts)
}

/// Current status and last drawn frame of one chart
pub async fn get_chart(Path(name): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    let Some(chart) = state.chart(&name) else {
        return not_found(&name);
    };

    Json(ChartView {
        name,
        status: chart.handle.status(),
        frame: chart.frames.latest().map(|frame| (*frame).clone()),
    })
    .into_response()
}

/// Ask for an immediate redraw
pub async fn refresh_chart(Path(name): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    let Some(chart) = state.chart(&name) else {
        return not_found(&name);
    };

    chart.handle.refresh();
    StatusCode::ACCEPTED.into_response()
}

/// Change interval and/or column; both are validated before anything is applied
pub async fn update_chart(
    Path(name): Path<String>,
    Query(query): Query<SettingsQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(chart) = state.chart(&name) else {
        return not_found(&name);
    };

    let parsed = parse_settings(&query);
    let (interval, column) = match parsed {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Rejected settings for chart {}: {}", name, e);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    if interval.is_some() || column.is_some() {
        chart.handle.update(interval, column);
    }
    StatusCode::ACCEPTED.into_response()
}

fn parse_settings(query: &SettingsQuery) -> Result<(Option<Interval>, Option<Column>), ChartError> {
    let interval = query.interval.as_deref().map(str::parse).transpose()?;
    let column = query.column.as_deref().map(str::parse).transpose()?;
    Ok((interval, column))
}

fn not_found(name: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("unknown chart `{}`", name))
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
