use std::io::Cursor;

use domain::image::{Dimensions, ImageMetadata, PixelLimit, PixelMode, SourceFormat};
use framer_application::error::{AppError, AppResult};
use image::{
    DynamicImage, ExtendedColorType, ImageDecoder, ImageError, ImageFormat, ImageReader, Limits,
    RgbaImage,
};
use png::ColorType as PngColorType;
use tracing::{debug, trace};

/// 16-bit RGBA, the widest layout a decoder buffers.
const MAX_BYTES_PER_PIXEL: u64 = 8;
/// Decoder allocation budget never drops below this, whatever the pixel limit.
const MIN_ALLOC_BYTES: u64 = 64 * 1024 * 1024;

/// Palette of an indexed image, as stored in the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexedPalette {
    /// Packed RGB triplets.
    pub rgb: Vec<u8>,
    /// Per-entry alpha, possibly shorter than the palette.
    pub trns: Option<Vec<u8>>,
}

impl IndexedPalette {
    pub fn len(&self) -> usize {
        self.rgb.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.rgb.len() < 3
    }
}

/// Everything captured from the source before any conversion.
pub(crate) struct SourceImage {
    pub format: SourceFormat,
    pub mode: PixelMode,
    pub dimensions: Dimensions,
    pub palette: Option<IndexedPalette>,
    pub metadata: ImageMetadata,
    pub rgba: RgbaImage,
}

enum PaletteProbe {
    NotIndexed,
    Indexed(Option<IndexedPalette>),
}

pub(crate) fn oversize(dimensions: Dimensions, limit: PixelLimit) -> AppError {
    AppError::OversizeImage {
        pixels: dimensions.pixel_count(),
        limit: limit.max_pixels(),
    }
}

pub(crate) fn guard(dimensions: Dimensions, limit: PixelLimit) -> AppResult<()> {
    limit
        .check(dimensions)
        .map_err(|_| oversize(dimensions, limit))
}

fn decode_error(e: ImageError, dimensions: Option<Dimensions>, limit: PixelLimit) -> AppError {
    match e {
        ImageError::Limits(_) => oversize(dimensions.unwrap_or(Dimensions::new(0, 0)), limit),
        other => AppError::DecodeError {
            message: other.to_string(),
        },
    }
}

/// Sniffs the container and checks the header dimensions before any pixel is decoded.
fn open(
    bytes: &[u8],
    limit: PixelLimit,
) -> AppResult<(Option<ImageFormat>, Dimensions, impl ImageDecoder + '_)> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::DecodeError {
            message: format!("Failed to read image header: {e}"),
        })?;
    let format = reader.format();

    let mut limits = Limits::default();
    limits.max_alloc = Some(
        limit
            .max_pixels()
            .saturating_mul(MAX_BYTES_PER_PIXEL)
            .max(MIN_ALLOC_BYTES),
    );
    reader.limits(limits);

    let decoder = reader
        .into_decoder()
        .map_err(|e| decode_error(e, None, limit))?;
    let (width, height) = decoder.dimensions();
    let dimensions = Dimensions::new(width, height);
    guard(dimensions, limit)?;

    trace!(?format, %dimensions, "Image header accepted");
    Ok((format, dimensions, decoder))
}

/// Decodes the source and captures its mode, palette, metadata and declared format.
pub(crate) fn decode_source(bytes: &[u8], limit: PixelLimit) -> AppResult<SourceImage> {
    let (image_format, dimensions, mut decoder) = open(bytes, limit)?;
    let format = SourceFormat::from_name(image_format.map(format_name));

    let mut mode = mode_of(decoder.original_color_type());
    let metadata = ImageMetadata::new(
        decoder.icc_profile().ok().flatten(),
        decoder.exif_metadata().ok().flatten(),
    );

    let palette = match probe_palette(bytes, &format)? {
        PaletteProbe::NotIndexed => None,
        PaletteProbe::Indexed(palette) => {
            mode = PixelMode::Palette;
            palette
        }
    };

    let rgba = DynamicImage::from_decoder(decoder)
        .map_err(|e| decode_error(e, Some(dimensions), limit))?
        .into_rgba8();

    debug!(
        %format,
        %mode,
        %dimensions,
        palette_entries = palette.as_ref().map(IndexedPalette::len),
        icc = metadata.icc_profile.is_some(),
        exif = metadata.exif_tiff().is_some(),
        "Decoded source image"
    );

    Ok(SourceImage {
        format,
        mode,
        dimensions,
        palette,
        metadata,
        rgba,
    })
}

/// Decodes an image for its pixels only.
pub(crate) fn decode_rgba(bytes: &[u8], limit: PixelLimit) -> AppResult<RgbaImage> {
    let (_, dimensions, decoder) = open(bytes, limit)?;
    Ok(DynamicImage::from_decoder(decoder)
        .map_err(|e| decode_error(e, Some(dimensions), limit))?
        .into_rgba8())
}

fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "PNG",
        ImageFormat::Jpeg => "JPEG",
        ImageFormat::WebP => "WEBP",
        ImageFormat::Gif => "GIF",
        ImageFormat::Bmp => "BMP",
        ImageFormat::Tiff => "TIFF",
        ImageFormat::Ico => "ICO",
        ImageFormat::Tga => "TGA",
        ImageFormat::Pnm => "PPM",
        _ => "OTHER",
    }
}

fn mode_of(color: ExtendedColorType) -> PixelMode {
    match color {
        ExtendedColorType::L2 | ExtendedColorType::L4 | ExtendedColorType::L8 => PixelMode::Luma,
        ExtendedColorType::Rgb8 | ExtendedColorType::Rgb16 | ExtendedColorType::Bgr8 => {
            PixelMode::Rgb
        }
        ExtendedColorType::Rgba8 | ExtendedColorType::Rgba16 | ExtendedColorType::Bgra8 => {
            PixelMode::Rgba
        }
        ExtendedColorType::Cmyk8 => PixelMode::Cmyk,
        _ => PixelMode::Other,
    }
}

fn probe_palette(bytes: &[u8], format: &SourceFormat) -> AppResult<PaletteProbe> {
    match format {
        SourceFormat::Png => probe_png_palette(bytes),
        SourceFormat::Gif => probe_gif_palette(bytes),
        SourceFormat::Jpeg | SourceFormat::Webp | SourceFormat::Other(_) => {
            Ok(PaletteProbe::NotIndexed)
        }
    }
}

fn probe_png_palette(bytes: &[u8]) -> AppResult<PaletteProbe> {
    let reader = png::Decoder::new(Cursor::new(bytes))
        .read_info()
        .map_err(|e| AppError::DecodeError {
            message: format!("Failed to read PNG header: {e}"),
        })?;
    let info = reader.info();

    if info.color_type != PngColorType::Indexed {
        return Ok(PaletteProbe::NotIndexed);
    }

    Ok(PaletteProbe::Indexed(info.palette.as_ref().map(|rgb| {
        IndexedPalette {
            rgb: rgb.to_vec(),
            trns: info.trns.as_ref().map(|trns| trns.to_vec()),
        }
    })))
}

fn probe_gif_palette(bytes: &[u8]) -> AppResult<PaletteProbe> {
    let decoder = gif::DecodeOptions::new()
        .read_info(Cursor::new(bytes))
        .map_err(|e| AppError::DecodeError {
            message: format!("Failed to read GIF header: {e}"),
        })?;

    Ok(PaletteProbe::Indexed(decoder.global_palette().map(|rgb| {
        IndexedPalette {
            rgb: rgb.to_vec(),
            trns: None,
        }
    })))
}
