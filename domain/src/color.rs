use serde::{Deserialize, Serialize};

const PRECISION_BITS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const OPAQUE_WHITE: Self = Self::new(255, 255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub fn from_slice(channels: &[u8]) -> Option<Self> {
        match *channels {
            [r, g, b, a] => Some(Self { r, g, b, a }),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// ITU-R 601-2 luma with 16-bit fixed point weights.
    #[must_use]
    pub fn luma(self) -> u8 {
        let weighted = u32::from(self.r) * 19595
            + u32::from(self.g) * 38470
            + u32::from(self.b) * 7471
            + 0x8000;
        (weighted >> 16) as u8
    }

    /// Naive ink separation: no black generation, K is always zero.
    #[must_use]
    pub fn to_cmyk(self) -> [u8; 4] {
        [255 - self.r, 255 - self.g, 255 - self.b, 0]
    }

    #[must_use]
    pub fn drop_alpha(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

#[inline]
fn shift_div_255(value: u32) -> u32 {
    ((value >> 8) + value) >> 8
}

/// Porter-Duff "over": `top` is composited onto `bottom`.
///
/// Integer arithmetic with 7 fractional bits so that results are reproducible
/// across platforms.
#[must_use]
pub fn blend_over(bottom: Rgba8, top: Rgba8) -> Rgba8 {
    if top.a == 0 {
        return bottom;
    }

    let top_a = u32::from(top.a);
    let blend = u32::from(bottom.a) * (255 - top_a);
    let out_a_255 = top_a * 255 + blend;

    let coef_top = top_a * 255 * 255 * (1 << PRECISION_BITS) / out_a_255;
    let coef_bottom = 255 * (1 << PRECISION_BITS) - coef_top;

    let channel = |top_c: u8, bottom_c: u8| -> u8 {
        let mixed = u32::from(top_c) * coef_top
            + u32::from(bottom_c) * coef_bottom
            + (0x80 << PRECISION_BITS);
        (shift_div_255(mixed) >> PRECISION_BITS) as u8
    };

    Rgba8 {
        r: channel(top.r, bottom.r),
        g: channel(top.g, bottom.g),
        b: channel(top.b, bottom.b),
        a: shift_div_255(out_a_255 + 0x80) as u8,
    }
}
