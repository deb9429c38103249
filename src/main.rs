// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{routing::{get, post}, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::chart_instance::ChartInstance;
use crate::application::chart_service::ChartService;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::frame_store::FrameStore;
use crate::infrastructure::http_source::HttpSensorSource;
use crate::presentation::app_state::{AppState, DashboardChart};
use crate::presentation::handlers::{
    get_chart, health_check, list_charts, refresh_chart, update_chart,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    if config.charts.is_empty() {
        tracing::warn!("No charts configured; add [[charts]] entries to config/dashboard.toml");
    }

    // Create data source (infrastructure layer)
    let source = Arc::new(HttpSensorSource::new(
        config.source.base_url(),
        config.source.timeout(),
    )?);

    // Create chart service (application layer)
    let service = ChartService::new(
        source,
        config.plot.rect()?,
        config.display.label_style()?,
        config.source.timeout(),
    );

    // Attach one polling instance per configured chart
    let mut state = AppState::default();
    for chart in &config.charts {
        let (store, frames) = FrameStore::new();
        let handle = ChartInstance::attach(
            chart.name.clone(),
            service.clone(),
            Box::new(store),
            chart.settings(),
            config.display.poll_interval(),
        );
        state
            .charts
            .insert(chart.name.clone(), DashboardChart { handle, frames });
    }
    let state = Arc::new(state);

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/charts", get(list_charts))
        .route("/charts/:name", get(get_chart).put(update_chart))
        .route("/charts/:name/refresh", post(refresh_chart))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start server
    let addr: SocketAddr = config.server.listen.parse()?;
    tracing::info!("Starting sensor-graph on {} with {} charts", addr, config.charts.len());

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop every polling timer before exiting; a handle still shared by a
    // lingering connection is detached when that connection drops it
    if let Ok(state) = Arc::try_unwrap(state) {
        for chart in state.charts.into_values() {
            chart.handle.detach();
        }
    }
    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
