use std::ffi::{c_char, c_int};
use std::ptr;

use crate::core::Viewport;
use crate::ffi::error_cell::ErrorCell;
use crate::ffi::types::c_str;
use crate::ffi::mapnik_image_blob_t;
use crate::imaging::{ImageFormat, ImageRgba8, encode};

/// Opaque image handle: one RGBA8 buffer plus its error cell.
#[derive(Debug)]
pub struct mapnik_image_t {
    image: ImageRgba8,
    err: ErrorCell,
}

impl mapnik_image_t {
    pub(crate) fn into_raw(image: ImageRgba8) -> *mut Self {
        Box::into_raw(Box::new(Self {
            image,
            err: ErrorCell::default(),
        }))
    }

    #[must_use]
    pub fn image(&self) -> &ImageRgba8 {
        &self.image
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.err.message()
    }
}

/// Releases an image handle; null is a no-op.
///
/// # Safety
/// `i` must be null or a live image pointer returned by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_image_free(i: *mut mapnik_image_t) {
    if i.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(i));
    }
}

/// Returns the last error recorded on the image, or null.
///
/// The string stays valid until the next fallible call on `i` or its free.
///
/// # Safety
/// `i` must be null or a live image pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_image_last_error(i: *mut mapnik_image_t) -> *const c_char {
    match unsafe { i.as_ref() } {
        Some(handle) => handle.err.as_ptr(),
        None => ptr::null(),
    }
}

/// Encodes the image with a named format (`png`, `png24`, `jpeg80`, ...).
///
/// Returns null on failure, with the message in the image's error cell.
///
/// # Safety
/// `i` must be null or a live image pointer; `format` must be null or a
/// NUL-terminated string. The blob must be released with
/// [`mapnik_image_blob_free`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_image_to_blob(
    i: *mut mapnik_image_t,
    format: *const c_char,
) -> *mut mapnik_image_blob_t {
    let Some(handle) = (unsafe { i.as_mut() }) else {
        return ptr::null_mut();
    };
    let image = &handle.image;
    let encoded = handle.err.capture(|| {
        let format = ImageFormat::parse(unsafe { c_str(format, "format") }?)?;
        encode(image, format)
    });
    let Some(bytes) = encoded else {
        return ptr::null_mut();
    };

    let len = bytes.len();
    let data = Box::into_raw(bytes.into_boxed_slice()).cast::<c_char>();
    Box::into_raw(Box::new(mapnik_image_blob_t { ptr: data, len }))
}

/// Releases a blob and its bytes; null is a no-op.
///
/// # Safety
/// `b` must be null or a live pointer from [`mapnik_image_to_blob`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_image_blob_free(b: *mut mapnik_image_blob_t) {
    if b.is_null() {
        return;
    }
    let blob = unsafe { Box::from_raw(b) };
    if !blob.ptr.is_null() {
        let bytes = ptr::slice_from_raw_parts_mut(blob.ptr.cast::<u8>(), blob.len);
        unsafe {
            drop(Box::from_raw(bytes));
        }
    }
}

/// Borrows the image's pixel memory and writes its length to `size`.
///
/// The pointer is valid until the image is freed. A null `size` skips the
/// length write; a null image yields null and a length of 0.
///
/// # Safety
/// `i` must be null or a live image pointer; `size` must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_image_to_raw(
    i: *mut mapnik_image_t,
    size: *mut usize,
) -> *const u8 {
    let handle = unsafe { i.as_ref() };
    if let Some(size) = unsafe { size.as_mut() } {
        *size = handle.map_or(0, |handle| handle.image.data().len());
    }
    handle.map_or(ptr::null(), |handle| handle.image.data().as_ptr())
}

/// Copies `width * height * 4` bytes of RGBA8 pixels into a new image.
///
/// Returns null for a null buffer, negative dimensions or a buffer that
/// cannot be allocated.
///
/// # Safety
/// `raw` must point to at least `width * height * 4` readable bytes; the
/// length cannot be checked here.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_image_from_raw(
    raw: *const u8,
    width: c_int,
    height: c_int,
) -> *mut mapnik_image_t {
    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        return ptr::null_mut();
    };
    let Ok(len) = Viewport::new(width, height).rgba_len() else {
        return ptr::null_mut();
    };
    if len == 0 {
        return ImageRgba8::new(width, height).map_or(ptr::null_mut(), mapnik_image_t::into_raw);
    }
    if raw.is_null() {
        return ptr::null_mut();
    }
    let pixels = unsafe { std::slice::from_raw_parts(raw, len) };
    match ImageRgba8::from_raw(width, height, pixels) {
        Ok(image) => mapnik_image_t::into_raw(image),
        Err(_) => ptr::null_mut(),
    }
}
