// Application state for HTTP handlers
use crate::application::chart_instance::ChartHandle;
use crate::infrastructure::frame_store::FrameReader;
use std::collections::BTreeMap;

pub struct DashboardChart {
    pub handle: ChartHandle,
    pub frames: FrameReader,
}

#[derive(Default)]
pub struct AppState {
    pub charts: BTreeMap<String, DashboardChart>,
}

impl AppState {
    pub fn chart(&self, name: &str) -> Option<&DashboardChart> {
        self.charts.get(name)
    }
}
