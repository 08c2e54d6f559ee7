use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datasource::Parameters;
use crate::error::{MapnikError, MapnikResult};

/// Parameter holding the upper bound of a datasource's connection pool.
pub const MAX_SIZE_PARAM: &str = "max_size";

/// Parameter holding the number of connections opened eagerly.
pub const INITIAL_SIZE_PARAM: &str = "initial_size";

pub const DEFAULT_MAX_SIZE: usize = 10;
pub const DEFAULT_INITIAL_SIZE: usize = 1;

/// Connections added on top of the caller's concurrency hint.
///
/// Tunable; the value is kept for compatibility with existing callers.
pub const POOL_HEADROOM: usize = 2;

/// Pool bounds a datasource was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_size: usize,
    pub initial_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            initial_size: DEFAULT_INITIAL_SIZE,
        }
    }
}

impl PoolConfig {
    pub fn from_params(params: &Parameters) -> MapnikResult<Self> {
        let max_size = params
            .get_parsed::<usize>(MAX_SIZE_PARAM)?
            .unwrap_or(DEFAULT_MAX_SIZE);
        let initial_size = params
            .get_parsed::<usize>(INITIAL_SIZE_PARAM)?
            .unwrap_or(DEFAULT_INITIAL_SIZE);

        if max_size == 0 {
            return Err(MapnikError::Datasource(
                "pool max_size must be > 0".to_owned(),
            ));
        }

        Ok(Self {
            max_size,
            initial_size: initial_size.min(max_size),
        })
    }
}

/// Pool size derived from a caller's declared render concurrency.
#[must_use]
pub fn pool_size_for_hint(concurrency_hint: i32) -> usize {
    usize::try_from(concurrency_hint.max(0)).unwrap_or(0) + POOL_HEADROOM
}

/// Inserts `max_size` unless the parameters already carry one.
///
/// Returns `true` when the parameters were changed.
pub fn apply_concurrency_hint(params: &mut Parameters, concurrency_hint: i32) -> bool {
    if params.contains_key(MAX_SIZE_PARAM) {
        debug!(
            max_size = params.get(MAX_SIZE_PARAM),
            "keeping explicit pool size"
        );
        return false;
    }

    let size = pool_size_for_hint(concurrency_hint);
    params.insert(MAX_SIZE_PARAM, size.to_string());
    true
}
