use tracing::warn;

use crate::core::{Coord, Projection};
use crate::ffi::mapnik_coord_t;

/// Snapshot of a map's spatial reference at creation time.
#[derive(Debug)]
pub struct mapnik_projection_t {
    pub(crate) projection: Option<Projection>,
}

/// Releases a projection handle; null is a no-op.
///
/// # Safety
/// `p` must be null or a live pointer from `mapnik_map_projection`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_projection_free(p: *mut mapnik_projection_t) {
    if p.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(p));
    }
}

/// Projects a geographic coordinate into the snapshot's reference.
///
/// A null or empty handle returns `c` unchanged.
///
/// # Safety
/// `p` must be null or a live pointer from `mapnik_map_projection`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mapnik_projection_forward(
    p: *mut mapnik_projection_t,
    c: mapnik_coord_t,
) -> mapnik_coord_t {
    let Some(projection) = (unsafe { p.as_ref() }).and_then(|p| p.projection.as_ref()) else {
        return c;
    };
    let out = projection.forward(Coord::new(c.x, c.y));
    if !out.is_finite() {
        warn!(x = c.x, y = c.y, "projection produced a non-finite coordinate");
    }
    mapnik_coord_t { x: out.x, y: out.y }
}
