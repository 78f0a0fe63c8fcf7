use domain::image::{Dimensions, ImageMetadata, Quality};
use framer_application::error::{AppError, AppResult};
use jpeg_encoder::{ColorType, Encoder, EncodingError, QuantizationTableType, SamplingFactor};
use tracing::{trace, warn};

use super::raster::Raster;

/// "web_high" luminance table, natural order.
const WEB_HIGH_LUMA: [u16; 64] = [
    6, 4, 4, 6, 9, 11, 12, 16, //
    4, 5, 5, 6, 8, 10, 12, 12, //
    4, 5, 5, 6, 10, 12, 14, 19, //
    6, 6, 6, 11, 12, 15, 19, 28, //
    9, 8, 10, 12, 16, 20, 27, 31, //
    11, 10, 12, 15, 20, 27, 31, 31, //
    12, 12, 14, 19, 27, 31, 31, 31, //
    16, 12, 19, 28, 31, 31, 31, 31, //
];

/// "web_high" chrominance table, natural order.
const WEB_HIGH_CHROMA: [u16; 64] = [
    7, 7, 13, 24, 26, 31, 31, 31, //
    7, 12, 16, 21, 31, 31, 31, 31, //
    13, 16, 17, 31, 31, 31, 31, 31, //
    24, 21, 31, 31, 31, 31, 31, 31, //
    26, 31, 31, 31, 31, 31, 31, 31, //
    31, 31, 31, 31, 31, 31, 31, 31, //
    31, 31, 31, 31, 31, 31, 31, 31, //
    31, 31, 31, 31, 31, 31, 31, 31, //
];

#[derive(Debug, Clone, Copy)]
pub(crate) enum JpegProfile {
    /// Progressive, 4:4:4, "web_high" tables scaled by quality.
    WebHigh(Quality),
    /// Baseline, 4:2:0, standard tables.
    Baseline(Quality),
}

impl JpegProfile {
    fn quality(self) -> Quality {
        match self {
            Self::WebHigh(quality) | Self::Baseline(quality) => quality,
        }
    }
}

fn encode_error(e: &EncodingError) -> AppError {
    AppError::EncodeError {
        message: format!("JPEG: {e}"),
    }
}

/// Scales a base table the way libjpeg does for a 1..=100 quality, clamped to baseline range.
fn scaled_table(base: &[u16; 64], quality: Quality) -> Box<[u16; 64]> {
    let quality = u32::from(quality.value());
    let scale = if quality < 50 {
        5000 / quality
    } else {
        200 - quality * 2
    };

    let mut table = [0_u16; 64];
    for (scaled, &value) in table.iter_mut().zip(base) {
        *scaled = ((u32::from(value) * scale + 50) / 100).clamp(1, 255) as u16;
    }
    Box::new(table)
}

fn side(value: u32, dimensions: Dimensions) -> AppResult<u16> {
    u16::try_from(value).map_err(|_| AppError::EncodeError {
        message: format!("{dimensions} exceeds the JPEG size limit"),
    })
}

pub(crate) fn encode(
    raster: &Raster,
    dimensions: Dimensions,
    profile: JpegProfile,
    metadata: &ImageMetadata,
) -> AppResult<Vec<u8>> {
    let (color_type, data) = match raster {
        Raster::Luma(px) => (ColorType::Luma, px),
        Raster::Rgb(px) => (ColorType::Rgb, px),
        // Alpha is not representable and is ignored by the encoder.
        Raster::Rgba(px) => (ColorType::Rgba, px),
        Raster::Cmyk(px) => (ColorType::Cmyk, px),
        Raster::Indexed { .. } => {
            return Err(AppError::EncodeError {
                message: "JPEG cannot store palette-indexed pixels".to_string(),
            });
        }
    };
    let width = side(dimensions.width, dimensions)?;
    let height = side(dimensions.height, dimensions)?;

    let mut out = Vec::new();
    let mut encoder = Encoder::new(&mut out, profile.quality().value());
    match profile {
        JpegProfile::WebHigh(quality) => {
            encoder.set_progressive(true);
            encoder.set_sampling_factor(SamplingFactor::R_4_4_4);
            encoder.set_optimized_huffman_tables(false);
            encoder.set_quantization_tables(
                QuantizationTableType::Custom(scaled_table(&WEB_HIGH_LUMA, quality)),
                QuantizationTableType::Custom(scaled_table(&WEB_HIGH_CHROMA, quality)),
            );
        }
        JpegProfile::Baseline(_) => {
            encoder.set_sampling_factor(SamplingFactor::R_4_2_0);
        }
    }

    if let Some(icc) = metadata.icc_profile.as_deref() {
        if let Err(e) = encoder.add_icc_profile(icc) {
            warn!(error = %e, "Dropping ICC profile that does not fit in APP2 segments");
        }
    }
    if let Some(app1) = metadata.exif_app1() {
        if let Err(e) = encoder.add_app_segment(1, &app1) {
            warn!(error = %e, "Dropping EXIF block that does not fit in an APP1 segment");
        }
    }

    encoder
        .encode(data, width, height, color_type)
        .map_err(|e| encode_error(&e))?;

    trace!(bytes = out.len(), ?profile, "Encoded JPEG");
    Ok(out)
}
