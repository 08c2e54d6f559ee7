use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::datasource::{Datasource, Parameters, csv, geojson};
use crate::error::{MapnikError, MapnikResult};

/// File extension of datasource plugin descriptors.
pub const PLUGIN_EXTENSION: &str = "input";

type DriverFactory = fn(&Parameters) -> MapnikResult<Arc<dyn Datasource>>;

struct DatasourceCache {
    drivers: IndexMap<&'static str, DriverFactory>,
    plugin_directories: Vec<PathBuf>,
    unavailable_plugins: Vec<String>,
}

impl DatasourceCache {
    fn with_builtin_drivers() -> Self {
        let mut drivers: IndexMap<&'static str, DriverFactory> = IndexMap::new();
        drivers.insert(geojson::DRIVER_NAME, create_geojson);
        drivers.insert(csv::DRIVER_NAME, create_csv);

        Self {
            drivers,
            plugin_directories: Vec::new(),
            unavailable_plugins: Vec::new(),
        }
    }
}

fn create_geojson(params: &Parameters) -> MapnikResult<Arc<dyn Datasource>> {
    Ok(Arc::new(geojson::create(params)?))
}

fn create_csv(params: &Parameters) -> MapnikResult<Arc<dyn Datasource>> {
    Ok(Arc::new(csv::create(params)?))
}

static CACHE: LazyLock<RwLock<DatasourceCache>> =
    LazyLock::new(|| RwLock::new(DatasourceCache::with_builtin_drivers()));

/// Builds a datasource from its parameters.
pub fn create(params: &Parameters) -> MapnikResult<Arc<dyn Datasource>> {
    let kind = params.get("type").ok_or_else(|| {
        MapnikError::Datasource(
            "Could not create datasource. Required parameter 'type' is missing".to_owned(),
        )
    })?;

    let factory = {
        let cache = CACHE.read();
        cache.drivers.get(kind).copied()
    };
    let Some(factory) = factory else {
        return Err(MapnikError::Datasource(format!(
            "Could not create datasource for type: '{kind}'"
        )));
    };

    debug!(kind, "creating datasource");
    factory(params)
}

/// Registers plugin descriptors found at `path`.
///
/// `path` may name a single `*.input` file or a directory holding them.
/// Drivers are compiled in, so a descriptor only enables a driver of the same
/// name; descriptors without a matching driver are recorded and reported.
/// Returns `true` when at least one descriptor matched a driver.
pub fn register_datasources(path: impl AsRef<Path>) -> MapnikResult<bool> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|source| MapnikError::io(path, source))?;

    let descriptors = if metadata.is_dir() {
        let mut descriptors = Vec::new();
        for entry in WalkDir::new(path).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|err| MapnikError::walk(path, err))?;
            if is_plugin_descriptor(entry.path()) {
                descriptors.push(entry.into_path());
            }
        }
        descriptors
    } else if is_plugin_descriptor(path) {
        vec![path.to_path_buf()]
    } else {
        return Err(MapnikError::Datasource(format!(
            "'{}' is neither a directory nor a .{PLUGIN_EXTENSION} plugin",
            path.display()
        )));
    };

    let mut cache = CACHE.write();
    let mut matched = false;
    for descriptor in descriptors {
        let Some(name) = descriptor.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if cache.drivers.contains_key(name) {
            debug!(plugin = name, "datasource plugin registered");
            matched = true;
        } else if !cache.unavailable_plugins.iter().any(|known| known == name) {
            warn!(plugin = name, "no in-process driver for datasource plugin");
            cache.unavailable_plugins.push(name.to_owned());
        }
    }
    if !cache.plugin_directories.iter().any(|known| known == path) {
        cache.plugin_directories.push(path.to_path_buf());
    }
    Ok(matched)
}

/// Names of every driver that can be instantiated.
#[must_use]
pub fn plugin_names() -> Vec<String> {
    CACHE
        .read()
        .drivers
        .keys()
        .map(|name| (*name).to_owned())
        .collect()
}

fn is_plugin_descriptor(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case(PLUGIN_EXTENSION))
}
