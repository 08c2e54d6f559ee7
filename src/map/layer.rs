use std::sync::Arc;

use crate::core::LONGLAT_PROJ;
use crate::datasource::Datasource;

/// Named data layer: one datasource drawn with an ordered list of styles.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    srs: String,
    styles: Vec<String>,
    datasource: Option<Arc<dyn Datasource>>,
    active: bool,
    min_scale_denominator: f64,
    max_scale_denominator: f64,
}

impl Layer {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            srs: LONGLAT_PROJ.to_owned(),
            styles: Vec::new(),
            datasource: None,
            active: true,
            min_scale_denominator: 0.0,
            max_scale_denominator: f64::INFINITY,
        }
    }

    #[must_use]
    pub fn with_srs(mut self, srs: impl Into<String>) -> Self {
        self.srs = srs.into();
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.styles.push(style.into());
        self
    }

    #[must_use]
    pub fn with_datasource(mut self, datasource: Arc<dyn Datasource>) -> Self {
        self.datasource = Some(datasource);
        self
    }

    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[must_use]
    pub fn with_scale_range(mut self, min: f64, max: f64) -> Self {
        self.min_scale_denominator = min;
        self.max_scale_denominator = max;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn srs(&self) -> &str {
        &self.srs
    }

    #[must_use]
    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    #[must_use]
    pub fn datasource(&self) -> Option<&Arc<dyn Datasource>> {
        self.datasource.as_ref()
    }

    pub fn set_datasource(&mut self, datasource: Arc<dyn Datasource>) {
        self.datasource = Some(datasource);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True when the layer is switched on and `scale_denominator` lies in
    /// `[min, max)`.
    #[must_use]
    pub fn visible(&self, scale_denominator: f64) -> bool {
        self.active
            && scale_denominator >= self.min_scale_denominator
            && scale_denominator < self.max_scale_denominator
    }
}
