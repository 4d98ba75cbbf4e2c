//! HSL and RGB colors.
//!
//! Colors produced here are sRGB-encoded, matching hex notation such as
//! `0xcc33cc`. Convert with [`Rgb::to_linear`] before writing into a buffer
//! that the shader treats as linear.

use ecolor::Color32;
use serde::{Deserialize, Serialize};

/// Hue, saturation, lightness. Hue is measured in turns (`0.0..1.0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// Create from a hue in degrees.
    pub fn from_degrees(degrees: f32, saturation: f32, lightness: f32) -> Self {
        Self::new(degrees / 360.0, saturation, lightness)
    }

    pub fn to_rgb(self) -> Rgb {
        let h = self.hue.rem_euclid(1.0);
        let s = self.saturation.clamp(0.0, 1.0);
        let l = self.lightness.clamp(0.0, 1.0);

        if s == 0.0 {
            return Rgb::new(l, l, l);
        }

        let hi = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let lo = 2.0 * l - hi;
        Rgb::new(
            hue_to_channel(lo, hi, h + 1.0 / 3.0),
            hue_to_channel(lo, hi, h),
            hue_to_channel(lo, hi, h - 1.0 / 3.0),
        )
    }
}

impl Default for Hsl {
    /// Magenta, `0xcc33cc`.
    fn default() -> Self {
        Self::from_degrees(300.0, 0.6, 0.5)
    }
}

fn hue_to_channel(lo: f32, hi: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        lo + (hi - lo) * 6.0 * t
    } else if t < 0.5 {
        hi
    } else if t < 2.0 / 3.0 {
        lo + (hi - lo) * 6.0 * (2.0 / 3.0 - t)
    } else {
        lo
    }
}

/// RGB triple with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decode a `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        let [_, r, g, b] = hex.to_be_bytes();
        Color32::from_rgb(r, g, b).into()
    }

    /// Apply the sRGB electro-optical transfer function per channel.
    pub fn to_linear(self) -> Self {
        Self::new(
            ecolor::linear_from_gamma(self.r),
            ecolor::linear_from_gamma(self.g),
            ecolor::linear_from_gamma(self.b),
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Color32> for Rgb {
    fn from(color: Color32) -> Self {
        let channel = |c: u8| f32::from(c) / 255.0;
        Self::new(channel(color.r()), channel(color.g()), channel(color.b()))
    }
}
