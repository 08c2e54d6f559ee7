use std::path::Path;

use ::image::codecs::jpeg::JpegEncoder;
use ::image::codecs::png::PngEncoder;
use ::image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

use crate::error::{MapnikError, MapnikResult};
use crate::imaging::ImageRgba8;

const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Output encoding selected by a format string such as `png`, `png24` or `jpeg90`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png { drop_alpha: bool },
    Jpeg { quality: u8 },
}

impl ImageFormat {
    /// Parses a format name; anything after `:` is accepted and ignored.
    pub fn parse(format: &str) -> MapnikResult<Self> {
        let name = format
            .split_once(':')
            .map_or(format, |(name, _)| name)
            .trim()
            .to_ascii_lowercase();

        match name.as_str() {
            "png" | "png32" | "png8" | "png256" => Ok(Self::Png { drop_alpha: false }),
            "png24" => Ok(Self::Png { drop_alpha: true }),
            "jpeg" | "jpg" => Ok(Self::Jpeg {
                quality: DEFAULT_JPEG_QUALITY,
            }),
            other => other
                .strip_prefix("jpeg")
                .or_else(|| other.strip_prefix("jpg"))
                .and_then(|digits| digits.parse::<u8>().ok())
                .filter(|quality| (1..=100).contains(quality))
                .map(|quality| Self::Jpeg { quality })
                .ok_or_else(|| MapnikError::UnknownFormat(format.to_owned())),
        }
    }

    /// Picks the encoding from a file extension (`.png`, `.jpg`, `.jpeg`).
    pub fn from_path(path: &Path) -> MapnikResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("png") => Ok(Self::Png { drop_alpha: false }),
            Some("jpg" | "jpeg") => Ok(Self::Jpeg {
                quality: DEFAULT_JPEG_QUALITY,
            }),
            _ => Err(MapnikError::UnknownFormat(path.display().to_string())),
        }
    }
}

pub fn encode(image: &ImageRgba8, format: ImageFormat) -> MapnikResult<Vec<u8>> {
    let mut out = Vec::new();
    match format {
        ImageFormat::Png { drop_alpha: false } => {
            PngEncoder::new(&mut out).write_image(
                image.data(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )?;
        }
        ImageFormat::Png { drop_alpha: true } => {
            PngEncoder::new(&mut out).write_image(
                &strip_alpha(image),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
        ImageFormat::Jpeg { quality } => {
            JpegEncoder::new_with_quality(&mut out, quality).write_image(
                &strip_alpha(image),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    debug!(?format, bytes = out.len(), "encoded image");
    Ok(out)
}

pub fn save_to_file(image: &ImageRgba8, path: &Path) -> MapnikResult<()> {
    let bytes = encode(image, ImageFormat::from_path(path)?)?;
    std::fs::write(path, bytes).map_err(|source| MapnikError::io(path, source))
}

fn strip_alpha(image: &ImageRgba8) -> Vec<u8> {
    image
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::ImageFormat;

    #[test]
    fn format_names_resolve_with_options_ignored() {
        assert_eq!(
            ImageFormat::parse("png8:m=h").expect("png8"),
            ImageFormat::Png { drop_alpha: false }
        );
        assert_eq!(
            ImageFormat::parse("png24").expect("png24"),
            ImageFormat::Png { drop_alpha: true }
        );
        assert_eq!(
            ImageFormat::parse("jpeg70").expect("jpeg70"),
            ImageFormat::Jpeg { quality: 70 }
        );
    }

    #[test]
    fn unknown_format_names_the_input() {
        let err = ImageFormat::parse("invalid_format").expect_err("unknown");
        assert_eq!(err.to_string(), "unknown file type: invalid_format");
        assert!(ImageFormat::parse("jpeg0").is_err());
    }

    #[test]
    fn file_extension_selects_encoder() {
        assert!(matches!(
            ImageFormat::from_path(Path::new("out/map.JPG")),
            Ok(ImageFormat::Jpeg { quality: 85 })
        ));
        assert!(ImageFormat::from_path(Path::new("map.tiff")).is_err());
    }
}
