//! Owned RGBA8 pixel buffers and their encoders.

mod encode;

pub use encode::{ImageFormat, encode, save_to_file};

use crate::core::Viewport;
use crate::error::{MapnikError, MapnikResult};
use crate::render::Color;

/// Row-major RGBA8 image with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRgba8 {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageRgba8 {
    /// Allocates a fully transparent image.
    ///
    /// Oversized requests fail with an error instead of aborting.
    pub fn new(width: u32, height: u32) -> MapnikResult<Self> {
        Ok(Self {
            width,
            height,
            data: zeroed_buffer(Viewport::new(width, height))?,
        })
    }

    /// Copies `width * height * 4` bytes from `raw`; extra trailing bytes are ignored.
    pub fn from_raw(width: u32, height: u32, raw: &[u8]) -> MapnikResult<Self> {
        let viewport = Viewport::new(width, height);
        let len = viewport.rgba_len()?;
        if raw.len() < len {
            return Err(MapnikError::InvalidArgument(format!(
                "raw buffer holds {} bytes, {width}x{height} RGBA8 needs {len}",
                raw.len()
            )));
        }
        let mut data = reserve(viewport, len)?;
        data.extend_from_slice(&raw[..len]);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wraps an already sized straight-alpha buffer.
    pub(crate) fn from_parts(width: u32, height: u32, data: Vec<u8>) -> MapnikResult<Self> {
        let len = Viewport::new(width, height).rgba_len()?;
        if data.len() != len {
            return Err(MapnikError::InvalidArgument(format!(
                "pixel buffer holds {} bytes, {width}x{height} RGBA8 needs {len}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
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

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let offset = self.offset(x, y)?;
        let mut px = [0; 4];
        px.copy_from_slice(&self.data[offset..offset + 4]);
        Some(px)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(offset) = self.offset(x, y) {
            self.data[offset..offset + 4].copy_from_slice(&rgba);
        }
    }

    /// Overwrites every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba8();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }
}

/// Zero-filled RGBA8 buffer for `viewport`, allocated fallibly.
pub(crate) fn zeroed_buffer(viewport: Viewport) -> MapnikResult<Vec<u8>> {
    let len = viewport.rgba_len()?;
    let mut data = reserve(viewport, len)?;
    data.resize(len, 0);
    Ok(data)
}

fn reserve(viewport: Viewport, len: usize) -> MapnikResult<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| MapnikError::Allocation {
            width: viewport.width,
            height: viewport.height,
            bytes: len,
        })?;
    Ok(data)
}
