pub mod compositor_image;
mod jpeg_writer;
mod png_writer;
mod probe;
mod raster;
mod webp_writer;

#[cfg(test)]
pub(crate) mod fixtures;
