use crate::application::chart_instance::DEFAULT_POLL_INTERVAL;
use crate::application::chart_service::{ChartSettings, DEFAULT_FETCH_TIMEOUT};
use crate::domain::interval::Interval;
use crate::domain::sensor::Column;
use crate::domain::transform::{
    PlotRect, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_MARGIN_X, DEFAULT_MARGIN_Y,
};
use crate::domain::window::LabelStyle;
use anyhow::ensure;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub plot: PlotSettings,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlotSettings {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_margin_x")]
    pub margin_x: f64,
    #[serde(default = "default_margin_y")]
    pub margin_y: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub name: String,
    #[serde(default)]
    pub interval: Interval,
    #[serde(default)]
    pub column: Column,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_secs()
}

fn default_locale() -> String {
    "POSIX".to_string()
}

fn default_poll_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_width() -> f64 {
    DEFAULT_CANVAS_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_CANVAS_HEIGHT
}

fn default_margin_x() -> f64 {
    DEFAULT_MARGIN_X
}

fn default_margin_y() -> f64 {
    DEFAULT_MARGIN_Y
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            utc_offset_minutes: 0,
            poll_secs: default_poll_secs(),
        }
    }
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            margin_x: default_margin_x(),
            margin_y: default_margin_y(),
        }
    }
}

impl SourceSettings {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DisplaySettings {
    pub fn label_style(&self) -> anyhow::Result<LabelStyle> {
        Ok(LabelStyle::new(&self.locale, self.utc_offset_minutes)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }
}

impl PlotSettings {
    pub fn rect(&self) -> anyhow::Result<PlotRect> {
        let rect = PlotRect::from_canvas(self.width, self.height, self.margin_x, self.margin_y);
        ensure!(
            rect.is_drawable(),
            "plot margins {}x{} leave no room on a {}x{} canvas",
            self.margin_x,
            self.margin_y,
            self.width,
            self.height
        );
        Ok(rect)
    }
}

impl ChartConfig {
    pub fn settings(&self) -> ChartSettings {
        ChartSettings {
            interval: self.interval,
            column: self.column,
        }
    }
}

impl DashboardConfig {
    /// Check everything that would otherwise only fail at the first redraw
    pub fn validate(&self) -> anyhow::Result<()> {
        self.plot.rect()?;
        self.display.label_style()?;
        ensure!(self.display.poll_secs > 0, "display.poll_secs must be positive");
        ensure!(self.source.timeout_secs > 0, "source.timeout_secs must be positive");

        let mut names: Vec<&str> = self.charts.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
            anyhow::bail!("chart `{}` is configured twice", dup[0]);
        }
        Ok(())
    }
}

/// Load `config/dashboard.*` (optional), overlaid with `DASHBOARD__*` env vars
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    let dashboard: DashboardConfig = settings.try_deserialize()?;
    dashboard.validate()?;
    Ok(dashboard)
}

#[cfg(test)]
fn parse_dashboard_config(toml: &str) -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    let dashboard: DashboardConfig = settings.try_deserialize()?;
    dashboard.validate()?;
    Ok(dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_dashboard_config("").unwrap();

        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.source.base_url(), "http://127.0.0.1:5000");
        assert_eq!(config.source.timeout(), Duration::from_secs(10));
        assert_eq!(config.display.poll_interval(), Duration::from_secs(8));
        assert_eq!(config.plot.rect().unwrap(), PlotRect::default());
        assert!(config.charts.is_empty());
    }

    #[test]
    fn test_parse_charts() {
        let config = parse_dashboard_config(
            r#"
            [source]
            host = "192.168.2.231"

            [display]
            utc_offset_minutes = 120

            [[charts]]
            name = "kitchen"

            [[charts]]
            name = "garage"
            interval = "month"
            column = "accelerationZ"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.base_url(), "http://192.168.2.231:5000");
        assert_eq!(config.charts.len(), 2);
        assert_eq!(config.charts[0].settings(), ChartSettings::default());
        assert_eq!(
            config.charts[1].settings(),
            ChartSettings {
                interval: Interval::Month,
                column: Column::AccelerationZ,
            }
        );
    }

    #[test]
    fn test_reject_unknown_interval() {
        let err = parse_dashboard_config(
            r#"
            [[charts]]
            name = "kitchen"
            interval = "fortnight"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("fortnight"), "{}", err);
    }

    #[test]
    fn test_reject_unusable_settings() {
        assert!(parse_dashboard_config("[plot]\nwidth = 60.0").is_err());
        assert!(parse_dashboard_config("[display]\nlocale = \"xx_NOPE\"").is_err());
        assert!(parse_dashboard_config("[display]\npoll_secs = 0").is_err());
        assert!(
            parse_dashboard_config("[[charts]]\nname = \"a\"\n[[charts]]\nname = \"a\"").is_err()
        );
    }
}
