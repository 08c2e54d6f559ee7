//! C-compatible entry points.
//!
//! Every handle is a `Box`-allocated Rust struct handed out as an opaque
//! pointer and released by exactly one `*_free` function; passing null to a
//! free function is a no-op. Fallible calls on a map or image clear that
//! handle's error cell, run inside a failure boundary that also catches
//! panics, and report `-1` or null on failure with the message available
//! from `*_last_error`.
//!
//! Borrowed pointers (`get_srs`, `last_error`, `to_raw`,
//! `layer_parameter`) point into handle-owned memory and are invalidated by
//! the next mutating call on that handle or by its free.
#![allow(non_camel_case_types)]

mod bbox;
mod error_cell;
mod global;
mod image;
mod map;
mod projection;
mod types;

pub use bbox::{mapnik_bbox, mapnik_bbox_free, mapnik_bbox_t};
pub use error_cell::ErrorCell;
pub use global::{
    mapnik_free_string, mapnik_logging_set_severity, mapnik_register_datasource,
    mapnik_register_font, mapnik_register_fonts, mapnik_register_last_error,
    mapnik_version_string,
};
pub use image::{
    mapnik_image_blob_free, mapnik_image_free, mapnik_image_from_raw, mapnik_image_last_error,
    mapnik_image_t, mapnik_image_to_blob, mapnik_image_to_raw,
};
pub use map::{
    mapnik_map, mapnik_map_current_extent, mapnik_map_free, mapnik_map_get_buffer_size,
    mapnik_map_get_srs, mapnik_map_height, mapnik_map_last_error, mapnik_map_layer_count,
    mapnik_map_layer_parameter, mapnik_map_load, mapnik_map_load_string, mapnik_map_projection,
    mapnik_map_render_to_file, mapnik_map_render_to_image, mapnik_map_resize,
    mapnik_map_set_buffer_size, mapnik_map_set_max_connections, mapnik_map_set_srs,
    mapnik_map_t, mapnik_map_width, mapnik_map_zoom_all, mapnik_map_zoom_to_box,
};
pub use projection::{mapnik_projection_forward, mapnik_projection_free, mapnik_projection_t};
pub use types::{
    MAPNIK_DEBUG, MAPNIK_ERROR, MAPNIK_FAILURE, MAPNIK_NONE, MAPNIK_OK, MAPNIK_WARN,
    mapnik_coord_t, mapnik_image_blob_t,
};
