mod color;
mod filter;

pub use color::parse_color;
pub use filter::{Filter, FilterOp};

use smallvec::SmallVec;

use crate::render::Color;

/// Named, ordered collection of rules referenced by layers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    pub rules: Vec<Rule>,
}

/// Symbolizers applied to features that pass the filter at a matching scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub filter: Filter,
    pub min_scale_denominator: f64,
    pub max_scale_denominator: f64,
    pub symbolizers: SmallVec<[Symbolizer; 4]>,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            filter: Filter::Always,
            min_scale_denominator: 0.0,
            max_scale_denominator: f64::INFINITY,
            symbolizers: SmallVec::new(),
        }
    }
}

impl Rule {
    #[must_use]
    pub fn active(&self, scale_denominator: f64) -> bool {
        scale_denominator >= self.min_scale_denominator
            && scale_denominator < self.max_scale_denominator
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Symbolizer {
    Polygon(PolygonSymbolizer),
    Line(LineSymbolizer),
    Markers(MarkersSymbolizer),
    Text(TextSymbolizer),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonSymbolizer {
    pub fill: Color,
    pub fill_opacity: f64,
}

impl Default for PolygonSymbolizer {
    fn default() -> Self {
        Self {
            fill: Color::rgb(0.5, 0.5, 0.5),
            fill_opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSymbolizer {
    pub stroke: Color,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
}

impl Default for LineSymbolizer {
    fn default() -> Self {
        Self {
            stroke: Color::rgb(0.0, 0.0, 0.0),
            stroke_width: 1.0,
            stroke_opacity: 1.0,
        }
    }
}

/// Ellipse markers placed on points (or on the envelope center of other geometries).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkersSymbolizer {
    pub fill: Color,
    pub fill_opacity: f64,
    pub stroke: Color,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for MarkersSymbolizer {
    fn default() -> Self {
        Self {
            fill: Color::rgb(0.0, 0.0, 1.0),
            fill_opacity: 1.0,
            stroke: Color::rgb(0.0, 0.0, 0.0),
            stroke_width: 0.5,
            stroke_opacity: 1.0,
            width: 10.0,
            height: 10.0,
        }
    }
}

/// Parsed for round-tripping stylesheets; labels are not rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSymbolizer {
    pub expression: String,
    pub face_name: Option<String>,
    pub size: f64,
    pub fill: Color,
}
