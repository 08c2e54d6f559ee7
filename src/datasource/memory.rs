use crate::core::{BoundingBox, Feature};
use crate::datasource::{Datasource, Parameters, PoolConfig, Query};
use crate::error::MapnikResult;

/// Datasource whose features are fully materialized at creation time.
///
/// File-backed drivers parse their input once and hand the result here.
#[derive(Debug)]
pub struct MemoryDatasource {
    kind: &'static str,
    params: Parameters,
    pool: PoolConfig,
    features: Vec<Feature>,
    envelope: Option<BoundingBox>,
}

impl MemoryDatasource {
    pub fn new(
        kind: &'static str,
        params: Parameters,
        features: Vec<Feature>,
    ) -> MapnikResult<Self> {
        let pool = PoolConfig::from_params(&params)?;
        let envelope = features
            .iter()
            .filter_map(|feature| feature.geometry.envelope())
            .reduce(BoundingBox::union);

        Ok(Self {
            kind,
            params,
            pool,
            features,
            envelope,
        })
    }

    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}

impl Datasource for MemoryDatasource {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn params(&self) -> &Parameters {
        &self.params
    }

    fn pool(&self) -> PoolConfig {
        self.pool
    }

    fn envelope(&self) -> Option<BoundingBox> {
        self.envelope
    }

    fn features(&self, query: &Query) -> MapnikResult<Vec<Feature>> {
        Ok(self
            .features
            .iter()
            .filter(|feature| {
                feature
                    .geometry
                    .envelope()
                    .is_some_and(|envelope| envelope.intersects(&query.bbox))
            })
            .cloned()
            .collect())
    }
}
