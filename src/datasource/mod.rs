//! Datasource drivers and the process-wide driver cache.
//!
//! A datasource is always built from [`Parameters`]; the `type` parameter
//! selects the driver. Layers keep the datasource behind an `Arc` so the
//! parameters used to build it can be read back and re-submitted to
//! [`cache::create`] with different pool bounds.

pub mod cache;
pub mod csv;
pub mod geojson;
mod memory;
mod parameters;
pub mod pool;

use std::fmt;
use std::path::{Path, PathBuf};

pub use cache::{create, plugin_names, register_datasources};
pub use memory::MemoryDatasource;
pub use parameters::Parameters;
pub use pool::{POOL_HEADROOM, PoolConfig, apply_concurrency_hint};

use crate::core::{BoundingBox, Feature};
use crate::error::{MapnikError, MapnikResult};

/// Parameter naming the directory relative `file` parameters resolve against.
pub const BASE_PARAM: &str = "base";

/// Spatial request issued by the render pipeline for one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Query {
    pub bbox: BoundingBox,
    pub scale_denominator: f64,
}

impl Query {
    #[must_use]
    pub fn new(bbox: BoundingBox, scale_denominator: f64) -> Self {
        Self {
            bbox,
            scale_denominator,
        }
    }
}

/// Contract implemented by every datasource driver.
pub trait Datasource: fmt::Debug + Send + Sync {
    /// Driver name, matching the `type` parameter.
    fn kind(&self) -> &'static str;

    fn params(&self) -> &Parameters;

    fn pool(&self) -> PoolConfig;

    /// Extent of all features in the datasource's own spatial reference.
    fn envelope(&self) -> Option<BoundingBox>;

    fn features(&self, query: &Query) -> MapnikResult<Vec<Feature>>;
}

/// Reads driver input from `inline` or from `file` (relative to `base`).
pub(crate) fn source_text(params: &Parameters, driver: &str) -> MapnikResult<String> {
    if let Some(inline) = params.get("inline") {
        return Ok(inline.to_owned());
    }

    let file = params.get("file").ok_or_else(|| {
        MapnikError::Datasource(format!(
            "{driver}: missing <file> or <inline> parameter"
        ))
    })?;
    let path = resolve_path(params.get(BASE_PARAM), file);
    std::fs::read_to_string(&path).map_err(|source| MapnikError::io(path, source))
}

fn resolve_path(base: Option<&str>, file: &str) -> PathBuf {
    let file = Path::new(file);
    match base {
        Some(base) if file.is_relative() => Path::new(base).join(file),
        _ => file.to_path_buf(),
    }
}
