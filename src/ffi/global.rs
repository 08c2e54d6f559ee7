//! Process-wide entry points: registries, logging and version.

use std::cell::RefCell;
use std::ffi::{CString, c_char, c_int};
use std::ptr;

use crate::datasource::register_datasources;
use crate::error::MapnikResult;
use crate::ffi::error_cell::ErrorCell;
use crate::ffi::types::c_str;
use crate::ffi::{MAPNIK_FAILURE, MAPNIK_OK};
use crate::fonts::{register_font, register_fonts};
use crate::logger::{Severity, set_severity};

static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

thread_local! {
    static REGISTER_ERROR: RefCell<ErrorCell> = RefCell::new(ErrorCell::default());
}

/// Runs a registration, mirroring a failure into both `err` (owned copy) and
/// the calling thread's registration error cell.
unsafe fn registration(err: *mut *mut c_char, operation: impl FnOnce() -> MapnikResult<()>) -> c_int {
    let message = REGISTER_ERROR.with(|cell| {
        let mut cell = cell.borrow_mut();
        cell.capture(operation);
        cell.message().map(str::to_owned)
    });

    let Some(message) = message else {
        return MAPNIK_OK;
    };
    if let Some(out) = unsafe { err.as_mut() } {
        *out = CString::new(message).map_or(ptr::null_mut(), CString::into_raw);
    }
    MAPNIK_FAILURE
}

/// Registers the font faces in one file.
///
/// On failure `*err` (when `err` is non-null) receives a message the caller
/// must release with [`mapnik_free_string`].
///
/// # Safety
/// `path` must be null or a NUL-terminated string; `err` must be null or
/// writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_register_font(path: *const c_char, err: *mut *mut c_char) -> c_int {
    unsafe {
        registration(err, || {
            register_font(c_str(path, "font path")?)?;
            Ok(())
        })
    }
}

/// Registers every font file in `dir`, descending into subdirectories when
/// `recurse` is non-zero.
///
/// # Safety
/// Same contract as [`mapnik_register_font`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_register_fonts(
    dir: *const c_char,
    recurse: c_int,
    err: *mut *mut c_char,
) -> c_int {
    unsafe {
        registration(err, || {
            register_fonts(c_str(dir, "font directory")?, recurse != 0)?;
            Ok(())
        })
    }
}

/// Registers datasource plugin descriptors from a directory or a single file.
///
/// # Safety
/// Same contract as [`mapnik_register_font`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_register_datasource(
    path: *const c_char,
    err: *mut *mut c_char,
) -> c_int {
    unsafe {
        registration(err, || {
            register_datasources(c_str(path, "datasource path")?)?;
            Ok(())
        })
    }
}

/// Last registration failure on the calling thread, or null.
///
/// Valid until the next registration call on the same thread.
#[unsafe(no_mangle)]
pub extern "C" fn mapnik_register_last_error() -> *const c_char {
    REGISTER_ERROR.with(|cell| cell.borrow().as_ptr())
}

/// Releases a string returned through an `err` out-parameter; null is a no-op.
///
/// # Safety
/// `s` must be null or a string produced by this library that was not freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(s));
    }
}

/// Static version string of the library.
#[unsafe(no_mangle)]
pub extern "C" fn mapnik_version_string() -> *const c_char {
    VERSION.as_ptr().cast::<c_char>()
}

/// Sets the process-wide log severity (`MAPNIK_NONE`, `MAPNIK_DEBUG`,
/// `MAPNIK_WARN`, `MAPNIK_ERROR`); other values silence logging.
#[unsafe(no_mangle)]
pub extern "C" fn mapnik_logging_set_severity(level: c_int) {
    set_severity(Severity::from_level(level));
}
