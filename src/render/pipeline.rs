use tracing::{debug, trace, warn};

use crate::core::{
    BoundingBox, Coord, Feature, Geometry, ProjTransform, Projection, ViewTransform,
    scale_denominator,
};
use crate::datasource::Query;
use crate::error::{MapnikError, MapnikResult};
use crate::imaging::ImageRgba8;
use crate::map::{Layer, Map};
use crate::render::{
    DrawCommand, FillPrimitive, MarkerPrimitive, PixelPoint, RasterRenderer, RenderFrame,
    Renderer, StrokePrimitive,
};
use crate::style::{LineSymbolizer, MarkersSymbolizer, PolygonSymbolizer, Symbolizer};

/// Per-render options.
///
/// `scale` zooms the current extent about its center (values above 1 zoom
/// in); `scale_factor` multiplies stroke widths and marker sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub scale: Option<f64>,
    pub scale_factor: f64,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            scale: None,
            scale_factor: 1.0,
        }
    }
}

impl RenderRequest {
    /// Maps the C-style arguments: a non-positive `scale` means "use the
    /// map's own extent".
    #[must_use]
    pub fn from_abi(scale: f64, scale_factor: f64) -> Self {
        Self {
            scale: (scale > 0.0).then_some(scale),
            scale_factor,
        }
    }

    pub fn validate(self) -> MapnikResult<()> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(MapnikError::InvalidArgument(format!(
                "invalid scale factor: {}",
                self.scale_factor
            )));
        }
        if let Some(scale) = self.scale {
            if !scale.is_finite() {
                return Err(MapnikError::InvalidArgument(format!("invalid scale: {scale}")));
            }
        }
        Ok(())
    }
}

/// Builds the ordered draw commands for the map's current state.
///
/// A map without a current extent (or without layers) yields a frame holding
/// only the background.
pub fn build_frame(map: &Map, request: RenderRequest) -> MapnikResult<RenderFrame> {
    request.validate()?;
    let viewport = map.viewport();
    if !viewport.is_valid() {
        return Err(MapnikError::InvalidSize {
            width: viewport.width,
            height: viewport.height,
        });
    }

    let mut frame = RenderFrame::new(viewport).with_background(map.background());
    let Some(mut extent) = map.current_extent() else {
        debug!("map has no extent, rendering background only");
        return Ok(frame);
    };
    if map.layers().is_empty() {
        return Ok(frame);
    }
    if let Some(scale) = request.scale {
        extent = extent.scaled_about_center(1.0 / scale);
    }

    let view = ViewTransform::new(viewport, extent)?;
    let map_proj = Projection::new(map.srs())?;
    let denominator = scale_denominator(view.scale(), map_proj.is_geographic());
    let buffer = f64::from(map.buffer_size()) * view.scale();
    let query_extent = extent.padded(buffer, buffer);

    let context = LayerContext {
        map,
        view: &view,
        map_proj: &map_proj,
        query_extent,
        scale_denominator: denominator,
        scale_factor: request.scale_factor,
    };
    for layer in map.layers() {
        context.render_layer(layer, &mut frame)?;
    }

    debug!(
        commands = frame.commands.len(),
        scale_denominator = denominator,
        "built map frame"
    );
    Ok(frame)
}

/// Renders the map into a freshly allocated image sized to the map.
pub fn render_to_image(map: &Map, request: RenderRequest) -> MapnikResult<ImageRgba8> {
    let frame = build_frame(map, request)?;
    let mut renderer = RasterRenderer::new(frame.viewport)?;
    renderer.render(&frame)?;
    renderer.into_image()
}

struct LayerContext<'a> {
    map: &'a Map,
    view: &'a ViewTransform,
    map_proj: &'a Projection,
    query_extent: BoundingBox,
    scale_denominator: f64,
    scale_factor: f64,
}

impl LayerContext<'_> {
    fn render_layer(&self, layer: &Layer, frame: &mut RenderFrame) -> MapnikResult<()> {
        if !layer.visible(self.scale_denominator) {
            trace!(layer = layer.name(), "layer hidden at this scale");
            return Ok(());
        }
        let Some(datasource) = layer.datasource() else {
            return Ok(());
        };

        let layer_proj = Projection::new(layer.srs())?;
        let to_layer = ProjTransform::new(self.map_proj.clone(), layer_proj.clone());
        let to_map = ProjTransform::new(layer_proj, self.map_proj.clone());

        let query = Query::new(
            to_layer.forward_box(self.query_extent)?,
            self.scale_denominator,
        );
        let mut features = datasource.features(&query)?;
        if !to_map.is_identity() {
            reproject(&mut features, &to_map)?;
        }
        trace!(layer = layer.name(), features = features.len(), "queried layer");

        for style_name in layer.styles() {
            let Some(style) = self.map.style(style_name) else {
                warn!(layer = layer.name(), style = %style_name, "unable to find style");
                continue;
            };
            for feature in &features {
                for rule in style
                    .rules
                    .iter()
                    .filter(|rule| rule.active(self.scale_denominator))
                    .filter(|rule| rule.filter.matches(feature))
                {
                    for symbolizer in &rule.symbolizers {
                        self.symbolize(&feature.geometry, symbolizer, frame);
                    }
                }
            }
        }
        Ok(())
    }

    fn symbolize(&self, geometry: &Geometry, symbolizer: &Symbolizer, frame: &mut RenderFrame) {
        match symbolizer {
            Symbolizer::Polygon(sym) => self.polygon(geometry, sym, frame),
            Symbolizer::Line(sym) => self.line(geometry, sym, frame),
            Symbolizer::Markers(sym) => self.markers(geometry, sym, frame),
            Symbolizer::Text(_) => trace!("text symbolizer skipped"),
        }
    }

    fn polygon(&self, geometry: &Geometry, sym: &PolygonSymbolizer, frame: &mut RenderFrame) {
        let color = sym.fill.with_opacity(sym.fill_opacity);
        let mut push = |rings: &[Vec<Coord>]| {
            let rings = rings.iter().map(|ring| self.to_pixels(ring)).collect();
            frame.push(DrawCommand::Fill(FillPrimitive::new(rings, color)));
        };
        match geometry {
            Geometry::Polygon(rings) => push(rings),
            Geometry::MultiPolygon(polygons) => polygons.iter().for_each(|rings| push(rings)),
            _ => {}
        }
    }

    fn line(&self, geometry: &Geometry, sym: &LineSymbolizer, frame: &mut RenderFrame) {
        let width = sym.stroke_width * self.scale_factor;
        if width <= 0.0 {
            return;
        }
        let color = sym.stroke.with_opacity(sym.stroke_opacity);
        let mut push = |coords: &[Coord], closed: bool| {
            frame.push(DrawCommand::Stroke(StrokePrimitive {
                points: self.to_pixels(coords),
                closed,
                width,
                color,
            }));
        };
        match geometry {
            Geometry::LineString(coords) => push(coords, false),
            Geometry::MultiLineString(lines) => lines.iter().for_each(|line| push(line, false)),
            Geometry::Polygon(rings) => rings.iter().for_each(|ring| push(ring, true)),
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().flatten().for_each(|ring| push(ring, true));
            }
            Geometry::Point(_) | Geometry::MultiPoint(_) => {}
        }
    }

    fn markers(&self, geometry: &Geometry, sym: &MarkersSymbolizer, frame: &mut RenderFrame) {
        let (width, height) = (sym.width * self.scale_factor, sym.height * self.scale_factor);
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let mut push = |coord: Coord| {
            frame.push(DrawCommand::Marker(MarkerPrimitive {
                center: self.to_pixel(coord),
                width,
                height,
                fill: sym.fill.with_opacity(sym.fill_opacity),
                stroke: sym.stroke.with_opacity(sym.stroke_opacity),
                stroke_width: sym.stroke_width.max(0.0) * self.scale_factor,
            }));
        };
        match geometry {
            Geometry::Point(coord) => push(*coord),
            Geometry::MultiPoint(coords) => coords.iter().copied().for_each(&mut push),
            other => {
                if let Some(envelope) = other.envelope() {
                    push(envelope.center());
                }
            }
        }
    }

    fn to_pixel(&self, coord: Coord) -> PixelPoint {
        let (x, y) = self.view.forward(coord);
        PixelPoint::new(x, y)
    }

    fn to_pixels(&self, coords: &[Coord]) -> Vec<PixelPoint> {
        coords.iter().map(|coord| self.to_pixel(*coord)).collect()
    }
}

#[cfg(not(feature = "parallel-projection"))]
fn reproject(features: &mut [Feature], transform: &ProjTransform) -> MapnikResult<()> {
    features
        .iter_mut()
        .try_for_each(|feature| feature.geometry.transform(|coord| transform.forward(coord)))
}

#[cfg(feature = "parallel-projection")]
fn reproject(features: &mut [Feature], transform: &ProjTransform) -> MapnikResult<()> {
    use rayon::prelude::*;

    features
        .par_iter_mut()
        .try_for_each(|feature| feature.geometry.transform(|coord| transform.forward(coord)))
}

#[cfg(test)]
mod tests {
    use super::RenderRequest;

    #[test]
    fn non_positive_abi_scale_means_map_extent() {
        assert_eq!(RenderRequest::from_abi(0.0, 1.0).scale, None);
        assert_eq!(RenderRequest::from_abi(-2.0, 1.0).scale, None);
        assert_eq!(RenderRequest::from_abi(2.0, 1.0).scale, Some(2.0));
    }

    #[test]
    fn scale_factor_must_be_positive() {
        assert!(RenderRequest::from_abi(0.0, 0.0).validate().is_err());
        assert!(RenderRequest::from_abi(0.0, f64::NAN).validate().is_err());
        assert!(RenderRequest::from_abi(0.0, 2.0).validate().is_ok());
    }
}
