pub mod geometry;
pub mod projection;
pub mod types;
pub mod view;

pub use geometry::{AttributeValue, Feature, Geometry};
pub use projection::{LONGLAT_PROJ, ProjTransform, Projection, ProjectionKind};
pub use types::{BoundingBox, Coord, Viewport};
pub use view::{ViewTransform, fix_aspect_ratio, scale_denominator};
