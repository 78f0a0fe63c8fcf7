use color_quant::NeuQuant;
use domain::color::Rgba8;
use domain::image::{ContainerFormat, PixelMode};
use image::RgbaImage;

use super::probe::IndexedPalette;

/// Quantizer sampling factor: 1 is slowest and best, 30 fastest.
const SAMPLE_FACTOR: i32 = 10;
const MAX_PALETTE_ENTRIES: usize = 256;

/// Composite pixels converted back to a concrete layout, ready for an encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Raster {
    Luma(Vec<u8>),
    Rgb(Vec<u8>),
    Rgba(Vec<u8>),
    Cmyk(Vec<u8>),
    Indexed {
        indices: Vec<u8>,
        palette: IndexedPalette,
    },
}

fn pixels(rgba: &[u8]) -> impl Iterator<Item = Rgba8> + '_ {
    rgba.chunks_exact(4).filter_map(Rgba8::from_slice)
}

/// Converts the RGBA composite to `mode`, quantizing when the source was palette-indexed.
pub(crate) fn restore(
    composite: RgbaImage,
    mode: PixelMode,
    palette: Option<&IndexedPalette>,
) -> Raster {
    let rgba = composite.into_raw();
    match mode.restored() {
        PixelMode::Rgba => Raster::Rgba(rgba),
        PixelMode::Rgb | PixelMode::Other => {
            Raster::Rgb(pixels(&rgba).flat_map(Rgba8::drop_alpha).collect())
        }
        PixelMode::Luma => Raster::Luma(pixels(&rgba).map(Rgba8::luma).collect()),
        PixelMode::Cmyk => Raster::Cmyk(pixels(&rgba).flat_map(Rgba8::to_cmyk).collect()),
        PixelMode::Palette => match palette.filter(|p| !p.is_empty()) {
            Some(palette) => quantize_onto(&rgba, palette),
            None => quantize_adaptive(&rgba),
        },
    }
}

/// Quantizes to as many colors as `palette` has, then keeps `palette` as the color table.
///
/// Indices come from the quantizer's own palette, so colors generally shift. The
/// palette bytes themselves are preserved exactly.
fn quantize_onto(rgba: &[u8], palette: &IndexedPalette) -> Raster {
    let colors = palette.len().min(MAX_PALETTE_ENTRIES);
    let quantizer = NeuQuant::new(SAMPLE_FACTOR, colors, rgba);
    let last = colors.saturating_sub(1);

    let indices = rgba
        .chunks_exact(4)
        .map(|px| quantizer.index_of(px).min(last) as u8)
        .collect();

    Raster::Indexed {
        indices,
        palette: palette.clone(),
    }
}

fn quantize_adaptive(rgba: &[u8]) -> Raster {
    let quantizer = NeuQuant::new(SAMPLE_FACTOR, MAX_PALETTE_ENTRIES, rgba);
    let indices = rgba
        .chunks_exact(4)
        .map(|px| quantizer.index_of(px) as u8)
        .collect();

    let color_map = quantizer.color_map_rgba();
    let mut rgb = Vec::with_capacity(MAX_PALETTE_ENTRIES * 3);
    let mut alpha = Vec::with_capacity(MAX_PALETTE_ENTRIES);
    for entry in pixels(&color_map) {
        rgb.extend_from_slice(&entry.drop_alpha());
        alpha.push(entry.a);
    }

    // tRNS may omit trailing opaque entries.
    while alpha.last() == Some(&u8::MAX) {
        alpha.pop();
    }

    Raster::Indexed {
        indices,
        palette: IndexedPalette {
            rgb,
            trns: (!alpha.is_empty()).then_some(alpha),
        },
    }
}

fn expand_palette(indices: &[u8], palette: &IndexedPalette) -> Raster {
    let color = |index: u8| {
        let start = usize::from(index) * 3;
        palette
            .rgb
            .get(start..start + 3)
            .and_then(|rgb| <[u8; 3]>::try_from(rgb).ok())
            .unwrap_or([0, 0, 0])
    };

    match &palette.trns {
        Some(trns) => Raster::Rgba(
            indices
                .iter()
                .flat_map(|&i| {
                    let [r, g, b] = color(i);
                    let a = trns.get(usize::from(i)).copied().unwrap_or(u8::MAX);
                    [r, g, b, a]
                })
                .collect(),
        ),
        None => Raster::Rgb(indices.iter().flat_map(|&i| color(i)).collect()),
    }
}

fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    cmyk.chunks_exact(4)
        .flat_map(|px| match *px {
            [c, m, y, k] => {
                let ink = |v: u8| ((255 - u32::from(v)) * (255 - u32::from(k)) / 255) as u8;
                [ink(c), ink(m), ink(y)]
            }
            _ => [0, 0, 0],
        })
        .collect()
}

impl Raster {
    /// Widens layouts the target container cannot store.
    pub fn for_container(self, container: ContainerFormat) -> Self {
        match (container, self) {
            (ContainerFormat::Png | ContainerFormat::Webp, Self::Cmyk(cmyk)) => {
                Self::Rgb(cmyk_to_rgb(&cmyk))
            }
            (ContainerFormat::Jpeg | ContainerFormat::Webp, Self::Indexed { indices, palette }) => {
                expand_palette(&indices, &palette)
            }
            (_, raster) => raster,
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            Self::Luma(_) | Self::Indexed { .. } => 1,
            Self::Rgb(_) => 3,
            Self::Rgba(_) | Self::Cmyk(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn canvas(color: [u8; 4]) -> RgbaImage {
        ImageBuffer::from_pixel(4, 4, Rgba(color))
    }

    #[test]
    fn rgb_drops_alpha_without_blending() {
        let raster = restore(canvas([10, 20, 30, 0]), PixelMode::Rgb, None);
        assert_eq!(raster, Raster::Rgb([10, 20, 30].repeat(16)));
    }

    #[test]
    fn unknown_mode_restores_as_rgb() {
        let raster = restore(canvas([1, 2, 3, 255]), PixelMode::Other, None);
        assert!(matches!(raster, Raster::Rgb(_)));
    }

    #[test]
    fn luma_and_cmyk_have_expected_channels() {
        let luma = restore(canvas([255, 255, 255, 255]), PixelMode::Luma, None);
        assert_eq!(luma, Raster::Luma(vec![255; 16]));

        let cmyk = restore(canvas([255, 0, 0, 255]), PixelMode::Cmyk, None);
        assert_eq!(cmyk.channels(), 4);
        assert_eq!(cmyk, Raster::Cmyk([0, 255, 255, 0].repeat(16)));
    }

    #[test]
    fn forced_palette_keeps_bytes_and_valid_indices() {
        let palette = IndexedPalette {
            rgb: vec![255, 0, 0, 0, 255, 0, 0, 0, 255],
            trns: None,
        };
        let mut image = canvas([255, 0, 0, 255]);
        image.put_pixel(0, 0, Rgba([0, 0, 255, 255]));

        let raster = restore(image, PixelMode::Palette, Some(&palette));

        let Raster::Indexed {
            indices,
            palette: kept,
        } = raster
        else {
            panic!("expected indexed raster");
        };
        assert_eq!(kept, palette);
        assert_eq!(indices.len(), 16);
        assert!(indices.iter().all(|&i| usize::from(i) < palette.len()));
    }

    #[test]
    fn palette_mode_without_palette_quantizes_adaptively() {
        let raster = restore(canvas([0, 128, 255, 255]), PixelMode::Palette, None);

        let Raster::Indexed { indices, palette } = raster else {
            panic!("expected indexed raster");
        };
        assert_eq!(indices.len(), 16);
        assert_eq!(palette.len(), 256);
        assert!(indices.iter().all(|&i| i == indices[0]));
    }

    #[test]
    fn containers_widen_unsupported_layouts() {
        let cmyk = Raster::Cmyk(vec![0, 255, 255, 0]);
        assert_eq!(
            cmyk.clone().for_container(ContainerFormat::Png),
            Raster::Rgb(vec![255, 0, 0])
        );
        assert_eq!(cmyk.clone().for_container(ContainerFormat::Jpeg), cmyk);

        let indexed = Raster::Indexed {
            indices: vec![1, 0],
            palette: IndexedPalette {
                rgb: vec![1, 2, 3, 4, 5, 6],
                trns: Some(vec![0]),
            },
        };
        assert_eq!(
            indexed.clone().for_container(ContainerFormat::Webp),
            Raster::Rgba(vec![4, 5, 6, 255, 1, 2, 3, 0])
        );
        assert_eq!(indexed.clone().for_container(ContainerFormat::Png), indexed);
    }
}
