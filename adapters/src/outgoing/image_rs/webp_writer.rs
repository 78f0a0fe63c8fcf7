use domain::image::{Dimensions, ImageMetadata};
use framer_application::error::{AppError, AppResult};
use image::ExtendedColorType;
use image::codecs::webp::WebPEncoder;
use tracing::trace;

use super::raster::Raster;

const FLAG_ICC: u8 = 0x20;
const FLAG_ALPHA: u8 = 0x10;
const FLAG_EXIF: u8 = 0x08;
const MAX_CANVAS_SIDE: u32 = 1 << 24;

fn encode_error(message: impl Into<String>) -> AppError {
    AppError::EncodeError {
        message: format!("WEBP: {}", message.into()),
    }
}

/// Lossless WEBP; ICC and EXIF are muxed in as extended-format chunks.
pub(crate) fn encode(
    raster: &Raster,
    dimensions: Dimensions,
    metadata: &ImageMetadata,
) -> AppResult<Vec<u8>> {
    let (color_type, data) = match raster {
        Raster::Luma(px) => (ExtendedColorType::L8, px),
        Raster::Rgb(px) => (ExtendedColorType::Rgb8, px),
        Raster::Rgba(px) => (ExtendedColorType::Rgba8, px),
        Raster::Cmyk(_) | Raster::Indexed { .. } => {
            return Err(encode_error("only L, RGB and RGBA pixels are supported"));
        }
    };

    let mut bitstream = Vec::new();
    WebPEncoder::new_lossless(&mut bitstream)
        .encode(data, dimensions.width, dimensions.height, color_type)
        .map_err(|e| encode_error(e.to_string()))?;

    if metadata.is_empty() {
        trace!(bytes = bitstream.len(), "Encoded WEBP");
        return Ok(bitstream);
    }

    let has_alpha = matches!(raster, Raster::Rgba(_));
    let muxed = mux_metadata(&bitstream, dimensions, has_alpha, metadata)?;
    trace!(bytes = muxed.len(), "Encoded WEBP with metadata");
    Ok(muxed)
}

struct Chunk<'a> {
    fourcc: [u8; 4],
    payload: &'a [u8],
}

fn read_u32_le(bytes: &[u8], at: usize) -> Option<u32> {
    bytes
        .get(at..at + 4)
        .and_then(|b| <[u8; 4]>::try_from(b).ok())
        .map(u32::from_le_bytes)
}

fn parse_chunks(riff: &[u8]) -> AppResult<Vec<Chunk<'_>>> {
    if riff.get(0..4) != Some(b"RIFF".as_slice()) || riff.get(8..12) != Some(b"WEBP".as_slice())
    {
        return Err(encode_error("encoder output is not a RIFF/WEBP container"));
    }

    let mut chunks = Vec::new();
    let mut offset = 12;
    while offset < riff.len() {
        let fourcc = riff
            .get(offset..offset + 4)
            .and_then(|b| <[u8; 4]>::try_from(b).ok())
            .ok_or_else(|| encode_error("truncated chunk header"))?;
        let size = read_u32_le(riff, offset + 4)
            .ok_or_else(|| encode_error("truncated chunk header"))? as usize;
        let start = offset + 8;
        let payload = riff
            .get(start..start + size)
            .ok_or_else(|| encode_error("truncated chunk payload"))?;

        chunks.push(Chunk { fourcc, payload });
        offset = start + size + size % 2;
    }
    Ok(chunks)
}

fn push_chunk(out: &mut Vec<u8>, fourcc: &[u8; 4], payload: &[u8]) -> AppResult<()> {
    let size = u32::try_from(payload.len()).map_err(|_| encode_error("chunk too large"))?;
    out.extend_from_slice(fourcc);
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
    Ok(())
}

fn vp8x_payload(dimensions: Dimensions, flags: u8) -> AppResult<[u8; 10]> {
    if dimensions.width == 0
        || dimensions.height == 0
        || dimensions.width > MAX_CANVAS_SIDE
        || dimensions.height > MAX_CANVAS_SIDE
    {
        return Err(encode_error(format!("invalid canvas size {dimensions}")));
    }

    let [w0, w1, w2, _] = (dimensions.width - 1).to_le_bytes();
    let [h0, h1, h2, _] = (dimensions.height - 1).to_le_bytes();
    Ok([flags, 0, 0, 0, w0, w1, w2, h0, h1, h2])
}

/// Rebuilds a simple-format WEBP as `VP8X, ICCP?, <image chunks>, EXIF?`.
fn mux_metadata(
    bitstream: &[u8],
    dimensions: Dimensions,
    has_alpha: bool,
    metadata: &ImageMetadata,
) -> AppResult<Vec<u8>> {
    let image_chunks: Vec<Chunk<'_>> = parse_chunks(bitstream)?
        .into_iter()
        .filter(|chunk| !matches!(&chunk.fourcc, b"VP8X" | b"ICCP" | b"EXIF"))
        .collect();

    let icc = metadata.icc_profile.as_deref();
    let exif = metadata.exif_tiff();

    let mut flags = 0;
    if icc.is_some() {
        flags |= FLAG_ICC;
    }
    if has_alpha {
        flags |= FLAG_ALPHA;
    }
    if exif.is_some() {
        flags |= FLAG_EXIF;
    }

    let mut body = Vec::with_capacity(bitstream.len() + 64);
    body.extend_from_slice(b"WEBP");
    push_chunk(&mut body, b"VP8X", &vp8x_payload(dimensions, flags)?)?;
    if let Some(icc) = icc {
        push_chunk(&mut body, b"ICCP", icc)?;
    }
    for chunk in &image_chunks {
        push_chunk(&mut body, &chunk.fourcc, chunk.payload)?;
    }
    if let Some(exif) = exif {
        push_chunk(&mut body, b"EXIF", exif)?;
    }

    let riff_size = u32::try_from(body.len()).map_err(|_| encode_error("file too large"))?;
    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_size.to_le_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}
