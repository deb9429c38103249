// Presentation layer - HTTP surface over the chart instances
pub mod app_state;
pub mod handlers;
