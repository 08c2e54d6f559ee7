//! mapnik-capi: a C-callable map rendering library.
//!
//! The crate pairs a small 2D map engine (XML stylesheets, GeoJSON and CSV
//! datasources, geographic and web-mercator projections, an anti-aliased
//! RGBA8 rasterizer) with a C ABI modeled on the `mapnik_c_api.h` surface:
//! opaque handles, per-handle error cells and explicit free functions.
//!
//! Rust callers can use the engine directly through [`map::Map`] and
//! [`render::render_to_image`]; C callers link the `cdylib`/`staticlib` and
//! include `include/mapnik_c_api.h`.

pub mod core;
pub mod datasource;
pub mod error;
pub mod ffi;
pub mod fonts;
pub mod imaging;
pub mod logger;
pub mod map;
pub mod render;
pub mod style;
pub mod telemetry;

pub use error::{MapnikError, MapnikResult};
pub use map::{Layer, Map, load_map, load_map_string};
pub use render::{RenderRequest, render_to_image};

/// Crate version, also reported by `mapnik_version_string`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
