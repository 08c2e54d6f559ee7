//! Map model: size, spatial reference, layers, styles and the current extent.

mod layer;
mod load_map;

pub use layer::Layer;
pub use load_map::{load_map, load_map_string};

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::{
    BoundingBox, LONGLAT_PROJ, ProjTransform, Projection, Viewport, fix_aspect_ratio,
};
use crate::datasource::{self, apply_concurrency_hint};
use crate::error::{MapnikError, MapnikResult};
use crate::render::Color;
use crate::style::Style;

#[derive(Debug, Clone)]
pub struct Map {
    width: u32,
    height: u32,
    srs: String,
    buffer_size: i32,
    background: Option<Color>,
    layers: Vec<Layer>,
    styles: IndexMap<String, Style>,
    current_extent: Option<BoundingBox>,
    maximum_extent: Option<BoundingBox>,
    base_path: Option<PathBuf>,
}

impl Map {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            srs: LONGLAT_PROJ.to_owned(),
            buffer_size: 0,
            background: None,
            layers: Vec::new(),
            styles: IndexMap::new(),
            current_extent: None,
            maximum_extent: None,
            base_path: None,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Changes the output size and re-fits the current extent to the new
    /// aspect ratio. Zero dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            warn!(width, height, "ignoring resize to an empty viewport");
            return;
        }
        self.width = width;
        self.height = height;
        if let Some(extent) = self.current_extent {
            self.current_extent = Some(fix_aspect_ratio(extent, self.viewport()));
        }
    }

    #[must_use]
    pub fn srs(&self) -> &str {
        &self.srs
    }

    /// Stored as given; it is only parsed when a projection is needed.
    pub fn set_srs(&mut self, srs: impl Into<String>) {
        self.srs = srs.into();
    }

    #[must_use]
    pub fn buffer_size(&self) -> i32 {
        self.buffer_size
    }

    pub fn set_buffer_size(&mut self, buffer_size: i32) {
        self.buffer_size = buffer_size;
    }

    #[must_use]
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn set_background(&mut self, background: Option<Color>) {
        self.background = background;
    }

    #[must_use]
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    pub fn set_base_path(&mut self, base_path: Option<PathBuf>) {
        self.base_path = base_path;
    }

    #[must_use]
    pub fn maximum_extent(&self) -> Option<BoundingBox> {
        self.maximum_extent
    }

    pub fn set_maximum_extent(&mut self, extent: Option<BoundingBox>) {
        self.maximum_extent = extent;
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    #[must_use]
    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.get(name)
    }

    pub fn styles(&self) -> impl Iterator<Item = (&str, &Style)> {
        self.styles.iter().map(|(name, style)| (name.as_str(), style))
    }

    /// Adds or replaces a style; returns the previous style with that name.
    pub fn insert_style(&mut self, name: impl Into<String>, style: Style) -> Option<Style> {
        self.styles.insert(name.into(), style)
    }

    #[must_use]
    pub fn current_extent(&self) -> Option<BoundingBox> {
        self.current_extent
    }

    /// Sets the visible extent, growing it to match the viewport aspect ratio.
    ///
    /// Corners are normalized first. Boxes that are non-finite or have no area
    /// leave the map unchanged.
    pub fn zoom_to_box(&mut self, bbox: BoundingBox) {
        let normalized = BoundingBox::from_corners(bbox.minx, bbox.miny, bbox.maxx, bbox.maxy);
        if !normalized.is_valid() {
            warn!(?bbox, "ignoring zoom to an empty or non-finite box");
            return;
        }
        let viewport = self.viewport();
        self.current_extent = Some(if viewport.is_valid() {
            fix_aspect_ratio(normalized, viewport)
        } else {
            normalized
        });
    }

    /// Zooms to the maximum extent when one is set, otherwise to the union of
    /// all active layer extents in the map's SRS. A map without layers is left
    /// unchanged.
    pub fn zoom_all(&mut self) -> MapnikResult<()> {
        if let Some(extent) = self.maximum_extent {
            self.zoom_to_box(extent);
            return Ok(());
        }
        if self.layers.is_empty() {
            return Ok(());
        }

        let map_proj = Projection::new(&self.srs)?;
        let mut combined: Option<BoundingBox> = None;
        for layer in self.layers.iter().filter(|layer| layer.is_active()) {
            let Some(envelope) = layer.datasource().and_then(|ds| ds.envelope()) else {
                continue;
            };
            let transform = ProjTransform::new(Projection::new(layer.srs())?, map_proj.clone());
            let extent = match transform.forward_box(envelope) {
                Ok(extent) => extent,
                Err(err) => {
                    warn!(layer = layer.name(), %err, "skipping layer extent");
                    continue;
                }
            };
            combined = Some(match combined {
                Some(acc) => acc.union(extent),
                None => extent,
            });
        }

        let extent = combined.ok_or_else(|| {
            MapnikError::Extent(
                "could not zoom to combined layer extents using zoom_all because no layer \
                 extent could be projected into the map srs (set map 'maximum-extent' \
                 to override layer extents)"
                    .to_owned(),
            )
        })?;
        if !extent.is_valid() {
            // Degenerate extent (one point or an axis-aligned line).
            let pad = if map_proj.is_geographic() { 0.01 } else { 1_000.0 };
            self.zoom_to_box(extent.padded(pad, pad));
        } else {
            self.zoom_to_box(extent);
        }
        debug!(extent = ?self.current_extent, "zoomed to all layers");
        Ok(())
    }

    /// Applies a concurrency hint to every layer's datasource pool.
    ///
    /// Layers whose parameters lack `max_size` get `hint + POOL_HEADROOM`;
    /// every datasource is then recreated from its parameters. Layers without
    /// a datasource are skipped. All datasources are rebuilt before any is
    /// swapped in, so a failure leaves every layer untouched.
    pub fn set_max_connections(&mut self, hint: i32) -> MapnikResult<()> {
        let mut recreated = Vec::with_capacity(self.layers.len());
        for (index, layer) in self.layers.iter().enumerate() {
            let Some(current) = layer.datasource() else {
                debug!(layer = layer.name(), "layer has no datasource, skipping pool sizing");
                continue;
            };
            let mut params = current.params().clone();
            apply_concurrency_hint(&mut params, hint);
            let datasource = datasource::create(&params)?;
            debug!(
                layer = layer.name(),
                max_size = datasource.pool().max_size,
                "recreated datasource"
            );
            recreated.push((index, datasource));
        }

        for (index, datasource) in recreated {
            self.layers[index].set_datasource(datasource);
        }
        Ok(())
    }
}
