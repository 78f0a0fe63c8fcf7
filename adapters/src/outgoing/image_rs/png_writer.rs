use std::borrow::Cow;

use domain::image::{Dimensions, ImageMetadata};
use framer_application::error::{AppError, AppResult};
use png::{AdaptiveFilterType, BitDepth, ColorType, Compression, chunk::ChunkType};
use tracing::trace;

use super::raster::Raster;

const EXIF_CHUNK: ChunkType = ChunkType(*b"eXIf");

fn encode_error(e: &png::EncodingError) -> AppError {
    AppError::EncodeError {
        message: format!("PNG: {e}"),
    }
}

/// Lossless 8-bit PNG with fast compression and adaptive filtering.
pub(crate) fn encode(
    raster: &Raster,
    dimensions: Dimensions,
    metadata: &ImageMetadata,
) -> AppResult<Vec<u8>> {
    let (color_type, data, palette) = match raster {
        Raster::Luma(px) => (ColorType::Grayscale, px, None),
        Raster::Rgb(px) => (ColorType::Rgb, px, None),
        Raster::Rgba(px) => (ColorType::Rgba, px, None),
        Raster::Indexed { indices, palette } => (ColorType::Indexed, indices, Some(palette)),
        Raster::Cmyk(_) => {
            return Err(AppError::EncodeError {
                message: "PNG cannot store CMYK pixels".to_string(),
            });
        }
    };

    let mut info = png::Info::with_size(dimensions.width, dimensions.height);
    info.color_type = color_type;
    info.bit_depth = BitDepth::Eight;
    if let Some(palette) = palette {
        info.palette = Some(Cow::Borrowed(palette.rgb.as_slice()));
        info.trns = palette.trns.as_deref().map(Cow::Borrowed);
    }
    info.icc_profile = metadata.icc_profile.as_deref().map(Cow::Borrowed);

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::with_info(&mut out, info).map_err(|e| encode_error(&e))?;
        encoder.set_compression(Compression::Fast);
        encoder.set_adaptive_filter(AdaptiveFilterType::Adaptive);

        let mut writer = encoder.write_header().map_err(|e| encode_error(&e))?;
        if let Some(tiff) = metadata.exif_tiff() {
            writer
                .write_chunk(EXIF_CHUNK, tiff)
                .map_err(|e| encode_error(&e))?;
        }
        writer
            .write_image_data(data)
            .map_err(|e| encode_error(&e))?;
        writer.finish().map_err(|e| encode_error(&e))?;
    }

    trace!(bytes = out.len(), ?color_type, "Encoded PNG");
    Ok(out)
}
