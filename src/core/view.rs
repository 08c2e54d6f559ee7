use crate::core::{BoundingBox, Coord, Viewport};
use crate::core::projection::EARTH_RADIUS;
use crate::error::{MapnikError, MapnikResult};

/// Standardized rendering pixel size (0.28mm) used for scale denominators.
pub const STANDARDIZED_PIXEL_SIZE: f64 = 0.00028;

/// Meters per degree at the equator of the spherical earth.
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS * 2.0 * std::f64::consts::PI / 360.0;

/// Linear mapping between a map extent and pixel space.
///
/// Pixel rows grow downwards, so `maxy` lands on row 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    viewport: Viewport,
    extent: BoundingBox,
    sx: f64,
    sy: f64,
}

impl ViewTransform {
    pub fn new(viewport: Viewport, extent: BoundingBox) -> MapnikResult<Self> {
        if !viewport.is_valid() {
            return Err(MapnikError::InvalidSize {
                width: viewport.width,
                height: viewport.height,
            });
        }
        if !extent.is_valid() {
            return Err(MapnikError::InvalidArgument(format!(
                "view extent must be finite with positive area: {extent:?}"
            )));
        }

        Ok(Self {
            viewport,
            extent,
            sx: f64::from(viewport.width) / extent.width(),
            sy: f64::from(viewport.height) / extent.height(),
        })
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn extent(&self) -> BoundingBox {
        self.extent
    }

    /// Map units covered by one horizontal pixel.
    #[must_use]
    pub fn scale(&self) -> f64 {
        1.0 / self.sx
    }

    #[must_use]
    pub fn forward(&self, coord: Coord) -> (f64, f64) {
        (
            (coord.x - self.extent.minx) * self.sx,
            (self.extent.maxy - coord.y) * self.sy,
        )
    }

    #[must_use]
    pub fn backward(&self, px: f64, py: f64) -> Coord {
        Coord::new(
            self.extent.minx + px / self.sx,
            self.extent.maxy - py / self.sy,
        )
    }
}

/// OGC scale denominator for a map scale in map units per pixel.
#[must_use]
pub fn scale_denominator(map_units_per_pixel: f64, geographic: bool) -> f64 {
    let denominator = map_units_per_pixel / STANDARDIZED_PIXEL_SIZE;
    if geographic {
        denominator * METERS_PER_DEGREE
    } else {
        denominator
    }
}

/// Grows `extent` along one axis so its aspect ratio matches the viewport.
#[must_use]
pub fn fix_aspect_ratio(extent: BoundingBox, viewport: Viewport) -> BoundingBox {
    if !viewport.is_valid() || !extent.is_valid() {
        return extent;
    }

    let viewport_ratio = f64::from(viewport.width) / f64::from(viewport.height);
    let extent_ratio = extent.width() / extent.height();
    let center = extent.center();

    if extent_ratio > viewport_ratio {
        let half_h = extent.width() / viewport_ratio * 0.5;
        BoundingBox::new(extent.minx, center.y - half_h, extent.maxx, center.y + half_h)
    } else {
        let half_w = extent.height() * viewport_ratio * 0.5;
        BoundingBox::new(center.x - half_w, extent.miny, center.x + half_w, extent.maxy)
    }
}
