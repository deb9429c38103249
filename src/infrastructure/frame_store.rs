// Renderer that publishes the latest frame for HTTP clients to draw
use crate::application::renderer::Renderer;
use crate::domain::chart::RenderFrame;
use std::sync::Arc;
use tokio::sync::watch;

/// Holds the last drawn frame. A failed redraw never reaches the renderer,
/// so the previous frame stays visible.
pub struct FrameStore {
    latest: watch::Sender<Option<Arc<RenderFrame>>>,
}

#[derive(Clone)]
pub struct FrameReader {
    latest: watch::Receiver<Option<Arc<RenderFrame>>>,
}

impl FrameStore {
    pub fn new() -> (Self, FrameReader) {
        let (latest, reader) = watch::channel(None);
        (Self { latest }, FrameReader { latest: reader })
    }
}

impl Renderer for FrameStore {
    fn draw(&mut self, frame: &RenderFrame) {
        self.latest.send_replace(Some(Arc::new(frame.clone())));
    }
}

impl FrameReader {
    pub fn latest(&self) -> Option<Arc<RenderFrame>> {
        self.latest.borrow().clone()
    }
}
