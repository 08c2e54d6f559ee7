use std::ffi::{CString, c_char, c_int, c_uint};
use std::path::Path;
use std::ptr;

use tracing::debug;

use crate::core::Projection;
use crate::error::MapnikResult;
use crate::ffi::error_cell::ErrorCell;
use crate::ffi::types::c_str;
use crate::ffi::{
    MAPNIK_FAILURE, MAPNIK_OK, mapnik_bbox_t, mapnik_image_t, mapnik_projection_t,
};
use crate::imaging::save_to_file;
use crate::map::{Map, load_map, load_map_string};
use crate::render::{RenderRequest, render_to_image};

/// Opaque map handle: the map, its error cell and the C strings lent out by
/// accessor functions.
#[derive(Debug)]
pub struct mapnik_map_t {
    map: Map,
    err: ErrorCell,
    srs: Option<CString>,
    scratch: Option<CString>,
}

impl mapnik_map_t {
    #[must_use]
    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.err.message()
    }

    fn status(&mut self, operation: impl FnOnce(&mut Map) -> MapnikResult<()>) -> c_int {
        let map = &mut self.map;
        match self.err.capture(|| operation(map)) {
            Some(()) => MAPNIK_OK,
            None => MAPNIK_FAILURE,
        }
    }

    fn lend(slot: &mut Option<CString>, value: &str) -> *const c_char {
        let stale = slot
            .as_ref()
            .is_none_or(|cached| cached.as_bytes() != value.as_bytes());
        if stale {
            *slot = CString::new(value).ok();
        }
        slot.as_ref().map_or(ptr::null(), |cached| cached.as_ptr())
    }
}

/// Creates a map of `width` x `height` pixels.
///
/// # Safety
/// The returned pointer must be released with [`mapnik_map_free`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map(width: c_uint, height: c_uint) -> *mut mapnik_map_t {
    Box::into_raw(Box::new(mapnik_map_t {
        map: Map::new(width, height),
        err: ErrorCell::default(),
        srs: None,
        scratch: None,
    }))
}

/// Releases a map handle; null is a no-op.
///
/// # Safety
/// `m` must be null or a live pointer from [`mapnik_map`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_free(m: *mut mapnik_map_t) {
    if m.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(m));
    }
}

/// Returns the last error recorded on the map, or null.
///
/// The string stays valid until the next fallible call on `m` or its free.
///
/// # Safety
/// `m` must be null or a live map pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_last_error(m: *mut mapnik_map_t) -> *const c_char {
    match unsafe { m.as_ref() } {
        Some(handle) => handle.err.as_ptr(),
        None => ptr::null(),
    }
}

/// Sets the map's spatial reference. Returns -1 for a null map or string.
///
/// # Safety
/// `m` must be null or a live map pointer; `srs` must be null or a
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_set_srs(m: *mut mapnik_map_t, srs: *const c_char) -> c_int {
    let Some(handle) = (unsafe { m.as_mut() }) else {
        return MAPNIK_FAILURE;
    };
    if srs.is_null() {
        return MAPNIK_FAILURE;
    }
    let srs = unsafe { std::ffi::CStr::from_ptr(srs) }.to_string_lossy();
    handle.map.set_srs(srs);
    MAPNIK_OK
}

/// Borrows the map's spatial reference string.
///
/// Valid until the SRS changes (`set_srs`, `load`) or the map is freed.
///
/// # Safety
/// `m` must be null or a live map pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_get_srs(m: *mut mapnik_map_t) -> *const c_char {
    let Some(handle) = (unsafe { m.as_mut() }) else {
        return ptr::null();
    };
    mapnik_map_t::lend(&mut handle.srs, handle.map.srs())
}

/// Loads an XML stylesheet file into the map.
///
/// # Safety
/// `m` must be null or a live map pointer; `stylesheet` must be null or a
/// NUL-terminated path.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_load(m: *mut mapnik_map_t, stylesheet: *const c_char) -> c_int {
    let Some(handle) = (unsafe { m.as_mut() }) else {
        return MAPNIK_FAILURE;
    };
    handle.status(|map| load_map(map, unsafe { c_str(stylesheet, "stylesheet path") }?))
}

/// Loads an XML stylesheet held in memory into the map.
///
/// # Safety
/// `m` must be null or a live map pointer; `stylesheet` must be null or a
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_load_string(
    m: *mut mapnik_map_t,
    stylesheet: *const c_char,
) -> c_int {
    let Some(handle) = (unsafe { m.as_mut() }) else {
        return MAPNIK_FAILURE;
    };
    handle.status(|map| {
        let text = unsafe { c_str(stylesheet, "stylesheet") }?;
        let base = map.base_path().map(Path::to_path_buf);
        load_map_string(map, text, base.as_deref())
    })
}

/// Zooms to the combined extent of all layers.
///
/// # Safety
/// `m` must be null or a live map pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_zoom_all(m: *mut mapnik_map_t) -> c_int {
    let Some(handle) = (unsafe { m.as_mut() }) else {
        return MAPNIK_FAILURE;
    };
    handle.status(Map::zoom_all)
}

/// Zooms to `b`. A null map or box is a no-op and records nothing.
///
/// # Safety
/// `m` and `b` must each be null or a live pointer of their type.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_zoom_to_box(m: *mut mapnik_map_t, b: *mut mapnik_bbox_t) {
    let (Some(handle), Some(bbox)) = (unsafe { m.as_mut() }, unsafe { b.as_ref() }) else {
        return;
    };
    handle.map.zoom_to_box(bbox.bbox);
}

/// Writes the current extent into `out`. Returns -1 when either pointer is
/// null or the map has no extent yet.
///
/// # Safety
/// `m` must be null or a live map pointer; `out` must be null or a live box.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_current_extent(
    m: *mut mapnik_map_t,
    out: *mut mapnik_bbox_t,
) -> c_int {
    let (Some(handle), Some(out)) = (unsafe { m.as_ref() }, unsafe { out.as_mut() }) else {
        return MAPNIK_FAILURE;
    };
    match handle.map.current_extent() {
        Some(extent) => {
            out.bbox = extent;
            MAPNIK_OK
        }
        None => MAPNIK_FAILURE,
    }
}

/// # Safety
/// `m` must be null or a live map pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_resize(m: *mut mapnik_map_t, width: c_uint, height: c_uint) {
    if let Some(handle) = unsafe { m.as_mut() } {
        handle.map.resize(width, height);
    }
}

/// # Safety
/// `m` must be null or a live map pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_width(m: *mut mapnik_map_t) -> c_uint {
    unsafe { m.as_ref() }.map_or(0, |handle| handle.map.width())
}

/// # Safety
/// `m` must be null or a live map pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_height(m: *mut mapnik_map_t) -> c_uint {
    unsafe { m.as_ref() }.map_or(0, |handle| handle.map.height())
}

/// Sets the render buffer, in pixels, added around the query extent.
///
/// # Safety
/// `m` must be null or a live map pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_set_buffer_size(m: *mut mapnik_map_t, buffer_size: c_int) {
    if let Some(handle) = unsafe { m.as_mut() } {
        handle.map.set_buffer_size(buffer_size);
    }
}

/// # Safety
/// `m` must be null or a live map pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_get_buffer_size(m: *mut mapnik_map_t) -> c_int {
    unsafe { m.as_ref() }.map_or(0, |handle| handle.map.buffer_size())
}

/// Sizes every layer's datasource pool for `num_threads` concurrent renders.
///
/// Layers without an explicit `max_size` parameter get `num_threads + 2`.
///
/// # Safety
/// `m` must be null or a live map pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_set_max_connections(
    m: *mut mapnik_map_t,
    num_threads: c_int,
) -> c_int {
    let Some(handle) = (unsafe { m.as_mut() }) else {
        return MAPNIK_FAILURE;
    };
    handle.status(|map| map.set_max_connections(num_threads))
}

/// Number of layers, or -1 for a null map.
///
/// # Safety
/// `m` must be null or a live map pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_layer_count(m: *mut mapnik_map_t) -> c_int {
    unsafe { m.as_ref() }.map_or(MAPNIK_FAILURE, |handle| {
        c_int::try_from(handle.map.layers().len()).unwrap_or(c_int::MAX)
    })
}

/// Borrows one datasource parameter of layer `layer`.
///
/// Returns null when the layer, its datasource or the key is missing. The
/// string stays valid until the next call to this function on `m`.
///
/// # Safety
/// `m` must be null or a live map pointer; `key` must be null or a
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_layer_parameter(
    m: *mut mapnik_map_t,
    layer: c_int,
    key: *const c_char,
) -> *const c_char {
    let Some(handle) = (unsafe { m.as_mut() }) else {
        return ptr::null();
    };
    let Ok(key) = (unsafe { c_str(key, "key") }) else {
        return ptr::null();
    };
    let value = usize::try_from(layer)
        .ok()
        .and_then(|index| handle.map.layer(index))
        .and_then(|layer| layer.datasource())
        .and_then(|datasource| datasource.params().get(key));
    match value {
        Some(value) => mapnik_map_t::lend(&mut handle.scratch, value),
        None => ptr::null(),
    }
}

/// Renders the map and writes it to `filepath`; the format follows the
/// file extension.
///
/// # Safety
/// `m` must be null or a live map pointer; `filepath` must be null or a
/// NUL-terminated path.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_render_to_file(
    m: *mut mapnik_map_t,
    filepath: *const c_char,
) -> c_int {
    let Some(handle) = (unsafe { m.as_mut() }) else {
        return MAPNIK_FAILURE;
    };
    handle.status(|map| {
        let path = unsafe { c_str(filepath, "file path") }?;
        let image = render_to_image(map, RenderRequest::default())?;
        save_to_file(&image, Path::new(path))?;
        debug!(path, "rendered map to file");
        Ok(())
    })
}

/// Renders the map into a new image handle.
///
/// A positive `scale` zooms the current extent; `scale_factor` scales
/// symbolizer sizes. Returns null on failure.
///
/// # Safety
/// `m` must be null or a live map pointer. The image must be released with
/// `mapnik_image_free`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_render_to_image(
    m: *mut mapnik_map_t,
    scale: f64,
    scale_factor: f64,
) -> *mut mapnik_image_t {
    let Some(handle) = (unsafe { m.as_mut() }) else {
        return ptr::null_mut();
    };
    let map = &handle.map;
    match handle
        .err
        .capture(|| render_to_image(map, RenderRequest::from_abi(scale, scale_factor)))
    {
        Some(image) => mapnik_image_t::into_raw(image),
        None => ptr::null_mut(),
    }
}

/// Snapshots the map's spatial reference as a projection handle.
///
/// A null map yields an empty handle whose `forward` is the identity. An
/// SRS that cannot be parsed returns null and records the error on the map.
///
/// # Safety
/// `m` must be null or a live map pointer. The handle must be released with
/// `mapnik_projection_free`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_map_projection(m: *mut mapnik_map_t) -> *mut mapnik_projection_t {
    let Some(handle) = (unsafe { m.as_mut() }) else {
        return Box::into_raw(Box::new(mapnik_projection_t { projection: None }));
    };
    let srs = handle.map.srs();
    match handle.err.capture(|| Projection::new(srs)) {
        Some(projection) => Box::into_raw(Box::new(mapnik_projection_t {
            projection: Some(projection),
        })),
        None => ptr::null_mut(),
    }
}
