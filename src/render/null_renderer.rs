use crate::error::MapnikResult;
use crate::render::{DrawCommand, RenderFrame, Renderer};

/// No-op renderer used by tests and headless pipeline checks.
///
/// It still validates frame content so tests can catch invalid geometry before
/// rasterization.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_fill_count: usize,
    pub last_stroke_count: usize,
    pub last_marker_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> MapnikResult<()> {
        frame.validate()?;
        self.last_fill_count = 0;
        self.last_stroke_count = 0;
        self.last_marker_count = 0;
        for command in &frame.commands {
            match command {
                DrawCommand::Fill(_) => self.last_fill_count += 1,
                DrawCommand::Stroke(_) => self.last_stroke_count += 1,
                DrawCommand::Marker(_) => self.last_marker_count += 1,
            }
        }
        Ok(())
    }
}
