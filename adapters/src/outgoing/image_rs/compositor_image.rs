use domain::color::{Rgba8, blend_over};
use domain::image::{
    BackgroundCoefficient, CompositeResult, ContainerFormat, Dimensions, ImageMetadata,
    PixelLimit, PixelMode, Quality,
};
use framer_application::{
    error::{AppError, AppResult},
    ports::outgoing::compositor::CompositorPort,
};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::{debug, instrument};

use super::jpeg_writer::{self, JpegProfile};
use super::raster::{self, Raster};
use super::{png_writer, probe, webp_writer};

/// Default quality of the flattened white background output.
const WHITE_BACKGROUND_QUALITY: i64 = 75;

#[derive(Copy, Clone, Debug)]
pub struct ImageCompositorConfig {
    pub pixel_limit: PixelLimit,
}

#[derive(Clone)]
pub struct ImageCompositorAdapter {
    pixel_limit: PixelLimit,
}

fn rgba8(pixel: Rgba<u8>) -> Rgba8 {
    let [r, g, b, a] = pixel.0;
    Rgba8::new(r, g, b, a)
}

fn encode(
    raster: &Raster,
    dimensions: Dimensions,
    container: ContainerFormat,
    quality: Quality,
    metadata: &ImageMetadata,
) -> AppResult<Vec<u8>> {
    let expected = dimensions.pixel_count() as usize * raster.channels();
    let actual = match raster {
        Raster::Luma(px) | Raster::Rgb(px) | Raster::Rgba(px) | Raster::Cmyk(px) => px.len(),
        Raster::Indexed { indices, .. } => indices.len(),
    };
    if expected != actual {
        return Err(AppError::EncodeError {
            message: format!("pixel buffer holds {actual} bytes, expected {expected}"),
        });
    }

    match container {
        ContainerFormat::Png => png_writer::encode(raster, dimensions, metadata),
        ContainerFormat::Webp => webp_writer::encode(raster, dimensions, metadata),
        ContainerFormat::Jpeg => {
            jpeg_writer::encode(raster, dimensions, JpegProfile::WebHigh(quality), metadata)
        }
    }
}

impl ImageCompositorAdapter {
    pub fn new(config: ImageCompositorConfig) -> Self {
        Self {
            pixel_limit: config.pixel_limit,
        }
    }

    #[instrument(skip_all, fields(source_bytes = source.len(), overlay_bytes = overlay.len(), %quality))]
    fn composite_impl(
        &self,
        source: &[u8],
        overlay: &[u8],
        quality: Quality,
    ) -> AppResult<CompositeResult> {
        // The source is fully guarded before the overlay is looked at.
        let source = probe::decode_source(source, self.pixel_limit)?;
        let overlay = probe::decode_rgba(overlay, self.pixel_limit)?;

        let dimensions = source.dimensions;
        let overlay = if overlay.dimensions() == (dimensions.width, dimensions.height) {
            overlay
        } else {
            imageops::resize(
                &overlay,
                dimensions.width,
                dimensions.height,
                FilterType::Lanczos3,
            )
        };

        let mut canvas = source.rgba;
        for (bottom, top) in canvas.pixels_mut().zip(overlay.pixels()) {
            *bottom = Rgba(blend_over(rgba8(*bottom), rgba8(*top)).to_array());
        }

        let mode = source.mode.restored();
        let container = source.format.output_container();
        let raster =
            raster::restore(canvas, mode, source.palette.as_ref()).for_container(container);
        let bytes = encode(&raster, dimensions, container, quality, &source.metadata)?;

        debug!(
            source_format = %source.format,
            %container,
            %mode,
            %dimensions,
            bytes = bytes.len(),
            "Composited frame"
        );

        Ok(CompositeResult {
            bytes,
            format: container,
            quality: container.is_lossy().then_some(quality),
            dimensions,
            mode,
        })
    }

    #[instrument(skip_all, fields(source_bytes = source.len(), coefficient = coefficient.value()))]
    fn pad_white_impl(
        &self,
        source: &[u8],
        coefficient: BackgroundCoefficient,
    ) -> AppResult<CompositeResult> {
        let image = probe::decode_rgba(source, self.pixel_limit)?;
        let (width, height) = image.dimensions();
        let canvas_dimensions = Dimensions::new(width, height).scaled(coefficient.value());
        probe::guard(canvas_dimensions, self.pixel_limit)?;

        let white = Rgba(Rgba8::OPAQUE_WHITE.to_array());
        let mut canvas =
            RgbaImage::from_pixel(canvas_dimensions.width, canvas_dimensions.height, white);
        let offset_x = canvas_dimensions.width.saturating_sub(width) / 2;
        let offset_y = canvas_dimensions.height.saturating_sub(height) / 2;

        for (x, y, pixel) in image.enumerate_pixels() {
            if let Some(target) = canvas.get_pixel_mut_checked(offset_x + x, offset_y + y) {
                *target = Rgba(blend_over(rgba8(*target), rgba8(*pixel)).to_array());
            }
        }

        let quality = Quality::clamped(WHITE_BACKGROUND_QUALITY);
        let raster = raster::restore(canvas, PixelMode::Rgb, None);
        let bytes = jpeg_writer::encode(
            &raster,
            canvas_dimensions,
            JpegProfile::Baseline(quality),
            &ImageMetadata::default(),
        )?;

        debug!(%canvas_dimensions, bytes = bytes.len(), "Padded image onto white background");

        Ok(CompositeResult {
            bytes,
            format: ContainerFormat::Jpeg,
            quality: Some(quality),
            dimensions: canvas_dimensions,
            mode: PixelMode::Rgb,
        })
    }
}

impl CompositorPort for ImageCompositorAdapter {
    fn composite(
        &self,
        source: &[u8],
        overlay: &[u8],
        quality: Quality,
    ) -> AppResult<CompositeResult> {
        self.composite_impl(source, overlay, quality)
    }

    fn pad_white(
        &self,
        source: &[u8],
        coefficient: BackgroundCoefficient,
    ) -> AppResult<CompositeResult> {
        self.pad_white_impl(source, coefficient)
    }
}
