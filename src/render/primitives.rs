use crate::error::{MapnikError, MapnikResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    #[must_use]
    pub fn from_rgba8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self::rgba(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
            f64::from(alpha) / 255.0,
        )
    }

    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha].map(channel_to_u8)
    }

    /// Multiplies alpha by `opacity`, clamped to 0..=1.
    #[must_use]
    pub fn with_opacity(self, opacity: f64) -> Self {
        Self {
            alpha: (self.alpha * opacity).clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn validate(self) -> MapnikResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(MapnikError::InvalidArgument(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

fn channel_to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Winding rule used when filling a set of rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillRule {
    EvenOdd,
    NonZero,
}

/// Filled area in pixel space; holes follow from the fill rule.
#[derive(Debug, Clone, PartialEq)]
pub struct FillPrimitive {
    pub rings: Vec<Vec<PixelPoint>>,
    pub color: Color,
    pub rule: FillRule,
}

impl FillPrimitive {
    #[must_use]
    pub fn new(rings: Vec<Vec<PixelPoint>>, color: Color) -> Self {
        Self {
            rings,
            color,
            rule: FillRule::EvenOdd,
        }
    }

    pub fn validate(&self) -> MapnikResult<()> {
        if self.rings.iter().flatten().any(|point| !point.is_finite()) {
            return Err(MapnikError::InvalidArgument(
                "fill coordinates must be finite".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Polyline stroked with a fixed width in pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePrimitive {
    pub points: Vec<PixelPoint>,
    pub closed: bool,
    pub width: f64,
    pub color: Color,
}

impl StrokePrimitive {
    pub fn validate(&self) -> MapnikResult<()> {
        if self.points.iter().any(|point| !point.is_finite()) {
            return Err(MapnikError::InvalidArgument(
                "stroke coordinates must be finite".to_owned(),
            ));
        }
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(MapnikError::InvalidArgument(
                "stroke width must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Ellipse marker centered on a pixel position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPrimitive {
    pub center: PixelPoint,
    pub width: f64,
    pub height: f64,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
}

impl MarkerPrimitive {
    pub fn validate(self) -> MapnikResult<()> {
        if !self.center.is_finite() {
            return Err(MapnikError::InvalidArgument(
                "marker center must be finite".to_owned(),
            ));
        }
        let size_ok = self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0;
        if !size_ok {
            return Err(MapnikError::InvalidArgument(
                "marker size must be finite and > 0".to_owned(),
            ));
        }
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(MapnikError::InvalidArgument(
                "marker stroke width must be finite and >= 0".to_owned(),
            ));
        }
        self.fill.validate()?;
        self.stroke.validate()
    }
}

/// One ordered draw command; later commands paint over earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill(FillPrimitive),
    Stroke(StrokePrimitive),
    Marker(MarkerPrimitive),
}

impl DrawCommand {
    pub fn validate(&self) -> MapnikResult<()> {
        match self {
            Self::Fill(fill) => fill.validate(),
            Self::Stroke(stroke) => stroke.validate(),
            Self::Marker(marker) => marker.validate(),
        }
    }
}
