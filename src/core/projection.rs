use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::core::{BoundingBox, Coord};
use crate::error::{MapnikError, MapnikResult};

/// Default spatial reference of a freshly created map or layer.
pub const LONGLAT_PROJ: &str = "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs";

/// Spherical mercator radius in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude beyond which spherical mercator diverges.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    Geographic,
    WebMercator,
}

/// Spatial reference parsed from a proj4 string or an `epsg:` code.
///
/// `forward` converts geographic longitude/latitude into this reference;
/// `inverse` goes back. Geographic references treat both as identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    params: String,
    kind: ProjectionKind,
}

impl Projection {
    pub fn new(params: &str) -> MapnikResult<Self> {
        let kind = classify(params).ok_or_else(|| MapnikError::Projection(params.to_owned()))?;
        Ok(Self {
            params: params.to_owned(),
            kind,
        })
    }

    #[must_use]
    pub fn params(&self) -> &str {
        &self.params
    }

    #[must_use]
    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    #[must_use]
    pub fn is_geographic(&self) -> bool {
        self.kind == ProjectionKind::Geographic
    }

    #[must_use]
    pub fn forward(&self, lonlat: Coord) -> Coord {
        match self.kind {
            ProjectionKind::Geographic => lonlat,
            ProjectionKind::WebMercator => {
                let lat = lonlat
                    .y
                    .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
                    .to_radians();
                Coord::new(
                    EARTH_RADIUS * lonlat.x.to_radians(),
                    EARTH_RADIUS * (FRAC_PI_4 + lat * 0.5).tan().ln(),
                )
            }
        }
    }

    #[must_use]
    pub fn inverse(&self, projected: Coord) -> Coord {
        match self.kind {
            ProjectionKind::Geographic => projected,
            ProjectionKind::WebMercator => Coord::new(
                (projected.x / EARTH_RADIUS).to_degrees(),
                (2.0 * (projected.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2).to_degrees(),
            ),
        }
    }
}

fn classify(params: &str) -> Option<ProjectionKind> {
    let normalized = params.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }

    let mut proj = None;
    let mut init = None;
    for token in normalized.split_whitespace() {
        let token = token.trim_start_matches('+');
        if let Some(value) = token.strip_prefix("proj=") {
            proj = Some(value.to_owned());
        } else if let Some(value) = token.strip_prefix("init=") {
            init = Some(value.to_owned());
        } else if token.starts_with("epsg:") {
            init = Some(token.to_owned());
        }
    }

    if let Some(code) = init {
        return match code.as_str() {
            "epsg:4326" => Some(ProjectionKind::Geographic),
            "epsg:3857" | "epsg:900913" | "epsg:3785" => Some(ProjectionKind::WebMercator),
            _ => None,
        };
    }

    match proj.as_deref() {
        Some("longlat" | "latlong" | "lonlat" | "latlon") => Some(ProjectionKind::Geographic),
        Some("merc") => Some(ProjectionKind::WebMercator),
        _ => None,
    }
}

/// Coordinate transform between two spatial references.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjTransform {
    source: Projection,
    dest: Projection,
}

impl ProjTransform {
    #[must_use]
    pub fn new(source: Projection, dest: Projection) -> Self {
        Self { source, dest }
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.source.kind == self.dest.kind
    }

    pub fn forward(&self, coord: Coord) -> MapnikResult<Coord> {
        if self.is_identity() {
            return Ok(coord);
        }
        let transformed = self.dest.forward(self.source.inverse(coord));
        if transformed.is_finite() {
            Ok(transformed)
        } else {
            Err(MapnikError::InvalidArgument(format!(
                "coordinate ({}, {}) cannot be transformed from '{}' to '{}'",
                coord.x,
                coord.y,
                self.source.params(),
                self.dest.params()
            )))
        }
    }

    /// Transforms a box by sampling its edges so curved edges are covered.
    pub fn forward_box(&self, bbox: BoundingBox) -> MapnikResult<BoundingBox> {
        if self.is_identity() {
            return Ok(bbox);
        }

        const STEPS: usize = 8;
        let mut out: Option<BoundingBox> = None;
        for step in 0..=STEPS {
            let t = step as f64 / STEPS as f64;
            let x = bbox.minx + bbox.width() * t;
            let y = bbox.miny + bbox.height() * t;
            for sample in [
                Coord::new(x, bbox.miny),
                Coord::new(x, bbox.maxy),
                Coord::new(bbox.minx, y),
                Coord::new(bbox.maxx, y),
            ] {
                let projected = self.forward(sample)?;
                if let Some(acc) = out.as_mut() {
                    acc.expand_to_include(projected);
                } else {
                    out = Some(BoundingBox::from_coord(projected));
                }
            }
        }
        out.ok_or_else(|| MapnikError::InvalidArgument("empty bounding box".to_owned()))
    }
}
