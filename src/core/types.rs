use serde::{Deserialize, Serialize};

use crate::error::{MapnikError, MapnikResult};

/// Output surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Byte length of an RGBA8 buffer covering this viewport.
    ///
    /// Fails with [`MapnikError::InvalidSize`] when the length does not fit
    /// in `usize`.
    pub fn rgba_len(self) -> MapnikResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or(MapnikError::InvalidSize {
                width: self.width,
                height: self.height,
            })
    }
}

/// Plain `(x, y)` pair in map or geographic units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned box in map units.
///
/// `from_corners` normalizes the ordering, so `min <= max` holds for every box
/// built through it. `new` keeps the caller's ordering untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    #[must_use]
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }

    #[must_use]
    pub fn from_coord(coord: Coord) -> Self {
        Self::new(coord.x, coord.y, coord.x, coord.y)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    #[must_use]
    pub fn center(&self) -> Coord {
        Coord::new(
            (self.minx + self.maxx) * 0.5,
            (self.miny + self.maxy) * 0.5,
        )
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.minx.is_finite()
            && self.miny.is_finite()
            && self.maxx.is_finite()
            && self.maxy.is_finite()
    }

    /// A box that can drive a view: finite, ordered and with positive area.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.width() > 0.0 && self.height() > 0.0
    }

    pub fn expand_to_include(&mut self, coord: Coord) {
        self.minx = self.minx.min(coord.x);
        self.miny = self.miny.min(coord.y);
        self.maxx = self.maxx.max(coord.x);
        self.maxy = self.maxy.max(coord.y);
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self::new(
            self.minx.min(other.minx),
            self.miny.min(other.miny),
            self.maxx.max(other.maxx),
            self.maxy.max(other.maxy),
        )
    }

    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !(other.minx > self.maxx
            || other.maxx < self.minx
            || other.miny > self.maxy
            || other.maxy < self.miny)
    }

    /// Grows (or shrinks, for negative values) every side by `dx`/`dy`.
    #[must_use]
    pub fn padded(self, dx: f64, dy: f64) -> Self {
        Self::new(self.minx - dx, self.miny - dy, self.maxx + dx, self.maxy + dy)
    }

    /// Scales the box about its center; `factor < 1` zooms in.
    #[must_use]
    pub fn scaled_about_center(self, factor: f64) -> Self {
        let center = self.center();
        let half_w = self.width() * 0.5 * factor;
        let half_h = self.height() * 0.5 * factor;
        Self::new(
            center.x - half_w,
            center.y - half_h,
            center.x + half_w,
            center.y + half_h,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;
    use crate::error::MapnikError;

    #[test]
    fn rgba_len_counts_four_bytes_per_pixel() {
        assert_eq!(Viewport::new(3, 2).rgba_len().expect("len"), 24);
        assert_eq!(Viewport::new(0, 5).rgba_len().expect("len"), 0);
    }

    #[test]
    fn rgba_len_overflow_is_an_invalid_size() {
        assert!(matches!(
            Viewport::new(1 << 31, 1 << 31).rgba_len(),
            Err(MapnikError::InvalidSize { .. })
        ));
        assert!(Viewport::new(u32::MAX, u32::MAX).rgba_len().is_err());
    }
}
