//! Encoded sample images for the codec tests.

use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, Rgb, Rgba};
use png::{BitDepth, ColorType};
use std::io::Cursor;
use tiff::encoder::{TiffEncoder, colortype::CMYK8};

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    encode(image, ImageFormat::Png)
}

pub fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb(color)))
}

pub fn solid_luma(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(ImageBuffer::from_pixel(width, height, Luma([value])))
}

/// Uncompressed 8-bit CMYK TIFF filled with one ink.
pub fn cmyk_tiff(width: u32, height: u32, ink: [u8; 4]) -> Vec<u8> {
    let data = ink.repeat((width * height) as usize);
    let mut out = Cursor::new(Vec::new());
    TiffEncoder::new(&mut out)
        .unwrap()
        .write_image::<CMYK8>(width, height, &data)
        .unwrap();
    out.into_inner()
}

pub fn solid_rgba(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(ImageBuffer::from_pixel(width, height, Rgba(color)))
}

/// Frame with an opaque red border of `border` pixels and a transparent middle.
pub fn frame_png(size: u32, border: u32) -> Vec<u8> {
    let frame = ImageBuffer::from_fn(size, size, |x, y| {
        let edge = x < border || y < border || x >= size - border || y >= size - border;
        if edge {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    png_bytes(&DynamicImage::ImageRgba8(frame))
}

pub fn indexed_png(palette: &[u8], indices: &[u8], width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(ColorType::Indexed);
        encoder.set_depth(BitDepth::Eight);
        encoder.set_palette(palette.to_vec());
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(indices).unwrap();
        writer.finish().unwrap();
    }
    out
}

/// Single-frame GIF with the given global color table.
pub fn gif_bytes(palette: &[u8], indices: &[u8], width: u16, height: u16) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, width, height, palette).unwrap();
        let frame = gif::Frame {
            width,
            height,
            buffer: indices.to_vec().into(),
            ..gif::Frame::default()
        };
        encoder.write_frame(&frame).unwrap();
    }
    out
}
