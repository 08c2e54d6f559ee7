use crate::core::BoundingBox;

/// Opaque bounding box handle.
///
/// Values are stored exactly as given; ordering is normalized when the box
/// is applied to a map.
#[derive(Debug, Clone, Copy)]
pub struct mapnik_bbox_t {
    pub(crate) bbox: BoundingBox,
}

impl mapnik_bbox_t {
    #[must_use]
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }
}

/// Creates a bounding box handle.
///
/// # Safety
/// The returned pointer must be released with [`mapnik_bbox_free`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_bbox(
    minx: f64,
    miny: f64,
    maxx: f64,
    maxy: f64,
) -> *mut mapnik_bbox_t {
    Box::into_raw(Box::new(mapnik_bbox_t {
        bbox: BoundingBox::new(minx, miny, maxx, maxy),
    }))
}

/// Releases a box created by [`mapnik_bbox`]; null is a no-op.
///
/// # Safety
/// `b` must be null or a live pointer from [`mapnik_bbox`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_bbox_free(b: *mut mapnik_bbox_t) {
    if b.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(b));
    }
}
