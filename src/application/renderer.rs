// Renderer contract - consumes finished frames, never raw data
use crate::domain::chart::RenderFrame;

pub trait Renderer: Send {
    fn draw(&mut self, frame: &RenderFrame);
}
