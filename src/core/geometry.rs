use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{BoundingBox, Coord};
use crate::error::MapnikResult;

/// Vector geometry in the coordinate space of its datasource.
///
/// Polygons are stored as rings; the first ring is the exterior, the rest are
/// holes. Rendering uses the even-odd rule, so ring winding does not matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    Polygon(Vec<Vec<Coord>>),
    MultiPoint(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
}

impl Geometry {
    #[must_use]
    pub fn envelope(&self) -> Option<BoundingBox> {
        let mut envelope: Option<BoundingBox> = None;
        self.for_each_coord(|coord| {
            if let Some(bbox) = envelope.as_mut() {
                bbox.expand_to_include(coord);
            } else {
                envelope = Some(BoundingBox::from_coord(coord));
            }
        });
        envelope
    }

    pub fn for_each_coord(&self, mut visit: impl FnMut(Coord)) {
        match self {
            Self::Point(coord) => visit(*coord),
            Self::LineString(coords) | Self::MultiPoint(coords) => {
                coords.iter().copied().for_each(visit);
            }
            Self::Polygon(rings) | Self::MultiLineString(rings) => {
                rings.iter().flatten().copied().for_each(visit);
            }
            Self::MultiPolygon(polygons) => {
                polygons.iter().flatten().flatten().copied().for_each(visit);
            }
        }
    }

    /// Rewrites every coordinate in place, stopping at the first failure.
    pub fn transform(
        &mut self,
        mut apply: impl FnMut(Coord) -> MapnikResult<Coord>,
    ) -> MapnikResult<()> {
        match self {
            Self::Point(coord) => *coord = apply(*coord)?,
            Self::LineString(coords) | Self::MultiPoint(coords) => {
                rewrite_coords(coords, &mut apply)?;
            }
            Self::Polygon(rings) | Self::MultiLineString(rings) => {
                for ring in rings {
                    rewrite_coords(ring, &mut apply)?;
                }
            }
            Self::MultiPolygon(polygons) => {
                for ring in polygons.iter_mut().flatten() {
                    rewrite_coords(ring, &mut apply)?;
                }
            }
        }
        Ok(())
    }
}

fn rewrite_coords(
    coords: &mut [Coord],
    apply: &mut impl FnMut(Coord) -> MapnikResult<Coord>,
) -> MapnikResult<()> {
    for coord in coords.iter_mut() {
        *coord = apply(*coord)?;
    }
    Ok(())
}

/// Scalar attribute attached to a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl AttributeValue {
    /// Parses a textual cell, preferring numbers over strings.
    #[must_use]
    pub fn infer(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => match trimmed {
                "true" => Self::Bool(true),
                "false" => Self::Bool(false),
                _ => Self::String(trimmed.to_owned()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: u64,
    pub geometry: Geometry,
    pub attributes: IndexMap<String, AttributeValue>,
}

impl Feature {
    #[must_use]
    pub fn new(id: u64, geometry: Geometry) -> Self {
        Self {
            id,
            geometry,
            attributes: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}
