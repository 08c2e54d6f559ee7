mod frame;
mod null_renderer;
mod pipeline;
mod primitives;
mod raster;

pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use pipeline::{RenderRequest, build_frame, render_to_image};
pub use primitives::{
    Color, DrawCommand, FillPrimitive, FillRule, MarkerPrimitive, PixelPoint, StrokePrimitive,
};
pub use raster::{RasterRenderer, RasterStats};

use crate::error::MapnikResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `RenderFrame`, so drawing code stays
/// isolated from map, style and datasource logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> MapnikResult<()>;
}
