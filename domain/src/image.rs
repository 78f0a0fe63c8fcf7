use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{DomainError, DomainResult};

/// Pixel layouts the compositor knows how to restore after blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelMode {
    Rgb,
    Rgba,
    Luma,
    Palette,
    Cmyk,
    Other,
}

impl PixelMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
            Self::Luma => "L",
            Self::Palette => "P",
            Self::Cmyk => "CMYK",
            Self::Other => "other",
        }
    }

    /// Mode the composite is converted back to. Unrecognized modes fall back to RGB.
    #[must_use]
    pub fn restored(self) -> Self {
        match self {
            Self::Other => Self::Rgb,
            mode => mode,
        }
    }
}

impl fmt::Display for PixelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container format declared by the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
    Other(String),
}

impl SourceFormat {
    /// Maps a decoder-reported format name; an undeclared format is treated as JPEG.
    #[must_use]
    pub fn from_name(name: Option<&str>) -> Self {
        let Some(name) = name else {
            return Self::Jpeg;
        };

        match name.trim().to_ascii_uppercase().as_str() {
            "JPEG" | "JPG" => Self::Jpeg,
            "PNG" => Self::Png,
            "WEBP" => Self::Webp,
            "GIF" => Self::Gif,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn output_container(&self) -> ContainerFormat {
        match self {
            Self::Png | Self::Gif => ContainerFormat::Png,
            Self::Webp => ContainerFormat::Webp,
            Self::Jpeg | Self::Other(_) => ContainerFormat::Jpeg,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jpeg => f.write_str("JPEG"),
            Self::Png => f.write_str("PNG"),
            Self::Webp => f.write_str("WEBP"),
            Self::Gif => f.write_str("GIF"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerFormat {
    Jpeg,
    Png,
    Webp,
}

impl ContainerFormat {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Webp => "WEBP",
        }
    }

    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    #[must_use]
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// JPEG encode quality in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: Self = Self(100);
    pub const MIN: Self = Self(1);

    /// Out-of-range requests are clamped silently rather than rejected.
    #[must_use]
    pub fn clamped(requested: i64) -> Self {
        Self(requested.clamp(1, 100) as u8)
    }

    pub fn new(value: u8) -> DomainResult<Self> {
        if (1..=100).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidQuality(i64::from(value)))
        }
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Scales both sides by `factor`, truncating like an integer cast.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |side: u32| {
            (f64::from(side) * factor)
                .floor()
                .clamp(0.0, f64::from(u32::MAX)) as u32
        };
        Self {
            width: scale(self.width),
            height: scale(self.height),
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Decompression-bomb guard: maximum number of decoded pixels per input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelLimit(u64);

impl PixelLimit {
    pub const DEFAULT: Self = Self(89_478_485);

    #[must_use]
    pub fn new(max_pixels: u64) -> Self {
        Self(max_pixels)
    }

    #[must_use]
    pub fn max_pixels(&self) -> u64 {
        self.0
    }

    pub fn check(&self, dimensions: Dimensions) -> DomainResult<()> {
        let pixels = dimensions.pixel_count();
        if pixels > self.0 {
            return Err(DomainError::OversizeImage {
                pixels,
                limit: self.0,
            });
        }
        Ok(())
    }
}

impl Default for PixelLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Canvas scale for the white background padding, in `1.0..=4.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct BackgroundCoefficient(f64);

impl BackgroundCoefficient {
    pub const DEFAULT: Self = Self(1.3);
    const RANGE: RangeInclusive<f64> = 1.0..=4.0;

    pub fn new(value: f64) -> DomainResult<Self> {
        if value.is_finite() && Self::RANGE.contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidCoefficient(format!(
                "{value} (expected {} to {})",
                Self::RANGE.start(),
                Self::RANGE.end()
            )))
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for BackgroundCoefficient {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Side-channel metadata carried next to the pixels, independent of mode conversions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub icc_profile: Option<Vec<u8>>,
    exif: Option<Vec<u8>>,
}

impl ImageMetadata {
    #[must_use]
    pub fn new(icc_profile: Option<Vec<u8>>, exif: Option<Vec<u8>>) -> Self {
        let mut metadata = Self {
            icc_profile: icc_profile.filter(|icc| !icc.is_empty()),
            exif: None,
        };
        metadata.set_exif(exif);
        metadata
    }

    /// Stores the raw TIFF payload, dropping a leading `Exif\0\0` marker if present.
    pub fn set_exif(&mut self, exif: Option<Vec<u8>>) {
        self.exif = exif
            .map(|bytes| match bytes.strip_prefix(EXIF_HEADER) {
                Some(tiff) => tiff.to_vec(),
                None => bytes,
            })
            .filter(|tiff| !tiff.is_empty());
    }

    #[must_use]
    pub fn exif_tiff(&self) -> Option<&[u8]> {
        self.exif.as_deref()
    }

    /// EXIF as stored in a JPEG APP1 segment.
    #[must_use]
    pub fn exif_app1(&self) -> Option<Vec<u8>> {
        self.exif.as_ref().map(|tiff| {
            let mut segment = Vec::with_capacity(EXIF_HEADER.len() + tiff.len());
            segment.extend_from_slice(EXIF_HEADER);
            segment.extend_from_slice(tiff);
            segment
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.icc_profile.is_none() && self.exif.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct CompositeResult {
    pub bytes: Vec<u8>,
    pub format: ContainerFormat,
    /// Effective quality, only reported for lossy output.
    pub quality: Option<Quality>,
    pub dimensions: Dimensions,
    pub mode: PixelMode,
}
