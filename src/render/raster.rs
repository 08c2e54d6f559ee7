use tiny_skia::{
    IntSize, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PremultipliedColorU8, Rect,
    Stroke, Transform,
};

use crate::core::Viewport;
use crate::error::{MapnikError, MapnikResult};
use crate::imaging::{ImageRgba8, zeroed_buffer};
use crate::render::{
    Color, DrawCommand, FillPrimitive, FillRule, MarkerPrimitive, PixelPoint, RenderFrame,
    Renderer, StrokePrimitive,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RasterStats {
    pub fills_drawn: usize,
    pub strokes_drawn: usize,
    pub markers_drawn: usize,
}

/// Anti-aliased renderer drawing into a premultiplied `tiny_skia` pixmap.
#[derive(Debug)]
pub struct RasterRenderer {
    pixmap: Pixmap,
    last_stats: RasterStats,
}

impl RasterRenderer {
    /// Allocates a transparent surface; oversized viewports fail instead of
    /// aborting.
    pub fn new(viewport: Viewport) -> MapnikResult<Self> {
        let invalid = || MapnikError::InvalidSize {
            width: viewport.width,
            height: viewport.height,
        };
        let size = IntSize::from_wh(viewport.width, viewport.height).ok_or_else(invalid)?;
        let pixmap = Pixmap::from_vec(zeroed_buffer(viewport)?, size).ok_or_else(invalid)?;
        Ok(Self {
            pixmap,
            last_stats: RasterStats::default(),
        })
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.pixmap.width(), self.pixmap.height())
    }

    /// Premultiplied pixels as drawn so far.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    #[must_use]
    pub fn last_stats(&self) -> RasterStats {
        self.last_stats
    }

    /// Hands the pixels over as a straight-alpha image, reusing the buffer.
    pub fn into_image(self) -> MapnikResult<ImageRgba8> {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut data = self.pixmap.take();
        for px in data.chunks_exact_mut(4) {
            if let Some(color) = PremultipliedColorU8::from_rgba(px[0], px[1], px[2], px[3]) {
                let color = color.demultiply();
                px.copy_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
            }
        }
        ImageRgba8::from_parts(width, height, data)
    }

    fn draw_fill(&mut self, fill: &FillPrimitive) {
        let Some(path) = rings_path(&fill.rings) else {
            return;
        };
        let rule = match fill.rule {
            FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
            FillRule::NonZero => tiny_skia::FillRule::Winding,
        };
        self.pixmap
            .fill_path(&path, &paint(fill.color), rule, Transform::identity(), None);
    }

    fn draw_stroke(&mut self, stroke: &StrokePrimitive) {
        let Some(path) = polyline_path(&stroke.points, stroke.closed) else {
            return;
        };
        self.stroke_path(&path, stroke.width, stroke.color);
    }

    fn draw_marker(&mut self, marker: MarkerPrimitive) {
        let oval = Rect::from_xywh(
            (marker.center.x - marker.width / 2.0) as f32,
            (marker.center.y - marker.height / 2.0) as f32,
            marker.width as f32,
            marker.height as f32,
        )
        .and_then(PathBuilder::from_oval);
        let Some(path) = oval else {
            return;
        };

        self.pixmap.fill_path(
            &path,
            &paint(marker.fill),
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            None,
        );
        if marker.stroke_width > 0.0 {
            self.stroke_path(&path, marker.stroke_width, marker.stroke);
        }
    }

    fn stroke_path(&mut self, path: &Path, width: f64, color: Color) {
        let stroke = Stroke {
            width: width as f32,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint(color), &stroke, Transform::identity(), None);
    }
}

impl Renderer for RasterRenderer {
    fn render(&mut self, frame: &RenderFrame) -> MapnikResult<()> {
        frame.validate()?;
        let viewport = self.viewport();
        if frame.viewport != viewport {
            return Err(MapnikError::InvalidArgument(format!(
                "frame viewport {}x{} does not match surface {}x{}",
                frame.viewport.width, frame.viewport.height, viewport.width, viewport.height
            )));
        }

        if let Some(background) = frame.background {
            self.pixmap.fill(skia_color(background));
        }

        let mut stats = RasterStats::default();
        for command in &frame.commands {
            match command {
                DrawCommand::Fill(fill) => {
                    self.draw_fill(fill);
                    stats.fills_drawn += 1;
                }
                DrawCommand::Stroke(stroke) => {
                    self.draw_stroke(stroke);
                    stats.strokes_drawn += 1;
                }
                DrawCommand::Marker(marker) => {
                    self.draw_marker(*marker);
                    stats.markers_drawn += 1;
                }
            }
        }
        self.last_stats = stats;
        Ok(())
    }
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let [red, green, blue, alpha] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(red, green, blue, alpha)
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    paint
}

/// Closed subpaths for every ring with at least three points.
fn rings_path(rings: &[Vec<PixelPoint>]) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for ring in rings.iter().filter(|ring| ring.len() >= 3) {
        push_points(&mut builder, ring);
        builder.close();
    }
    builder.finish()
}

fn polyline_path(points: &[PixelPoint], closed: bool) -> Option<Path> {
    if points.len() < 2 {
        return None;
    }
    let mut builder = PathBuilder::new();
    push_points(&mut builder, points);
    if closed && points.len() > 2 {
        builder.close();
    }
    builder.finish()
}

fn push_points(builder: &mut PathBuilder, points: &[PixelPoint]) {
    let mut points = points.iter();
    if let Some(first) = points.next() {
        builder.move_to(first.x as f32, first.y as f32);
    }
    for point in points {
        builder.line_to(point.x as f32, point.y as f32);
    }
}
