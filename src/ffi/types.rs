use std::ffi::{CStr, c_char, c_int};

use crate::error::{MapnikError, MapnikResult};

/// Status returned by fallible entry points on success.
pub const MAPNIK_OK: c_int = 0;
/// Status returned by fallible entry points on failure.
pub const MAPNIK_FAILURE: c_int = -1;

/// Severity levels accepted by `mapnik_logging_set_severity`.
pub const MAPNIK_NONE: c_int = 0;
pub const MAPNIK_DEBUG: c_int = 1;
pub const MAPNIK_WARN: c_int = 2;
pub const MAPNIK_ERROR: c_int = 3;

/// Coordinate pair passed by value.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct mapnik_coord_t {
    pub x: f64,
    pub y: f64,
}

/// Encoded image bytes owned by the caller until `mapnik_image_blob_free`.
#[repr(C)]
#[derive(Debug)]
pub struct mapnik_image_blob_t {
    pub ptr: *mut c_char,
    pub len: usize,
}

/// Borrows a NUL-terminated UTF-8 argument.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn c_str<'a>(ptr: *const c_char, what: &str) -> MapnikResult<&'a str> {
    if ptr.is_null() {
        return Err(MapnikError::InvalidArgument(format!("{what} is null")));
    }
    let raw = unsafe { CStr::from_ptr(ptr) };
    raw.to_str()
        .map_err(|_| MapnikError::InvalidArgument(format!("{what} is not valid UTF-8")))
}
