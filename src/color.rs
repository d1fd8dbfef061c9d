//! Floating-point RGB color and packed `0xAARRGGBB` conversion.

use std::ops::{Add, AddAssign, Div, Mul};

use serde::{Deserialize, Serialize};

/// Background color written to the frame buffer on clear.
pub const BACKGROUND: u32 = 0xFF636363;

/// Linear RGB color with `f32` channels, nominally in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorRgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const GRAY: Self = Self::new(0.5, 0.5, 0.5);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }

    pub fn max_channel(&self) -> f32 {
        self.r.max(self.g).max(self.b)
    }

    /// Divides by the largest channel if it exceeds 1, preserving hue.
    pub fn max_to_one(self) -> Self {
        let max = self.max_channel();
        if max > 1.0 {
            self / max
        } else {
            self
        }
    }

    /// Linear interpolation from `self` (t = 0) to `other` (t = 1).
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Weighted sum of three colors.
    #[inline]
    pub fn weighted(a: Self, b: Self, c: Self, weights: [f32; 3]) -> Self {
        a * weights[0] + b * weights[1] + c * weights[2]
    }

    /// Packs to an opaque `0xFFRRGGBB` word, clamping each channel to [0, 1].
    pub fn to_argb(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        0xFF00_0000 | (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Unpacks a `0xAARRGGBB` word, ignoring alpha.
    pub fn from_argb(color: u32) -> Self {
        Self::new(
            ((color >> 16) & 0xFF) as f32 / 255.0,
            ((color >> 8) & 0xFF) as f32 / 255.0,
            (color & 0xFF) as f32 / 255.0,
        )
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }
}

impl Add<ColorRgb> for ColorRgb {
    type Output = ColorRgb;

    fn add(self, rhs: ColorRgb) -> Self::Output {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign<ColorRgb> for ColorRgb {
    fn add_assign(&mut self, rhs: ColorRgb) {
        *self = *self + rhs;
    }
}

/// Componentwise (modulating) product.
impl Mul<ColorRgb> for ColorRgb {
    type Output = ColorRgb;

    fn mul(self, rhs: ColorRgb) -> Self::Output {
        Self::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f32> for ColorRgb {
    type Output = ColorRgb;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Div<f32> for ColorRgb {
    type Output = ColorRgb;

    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.r / rhs, self.g / rhs, self.b / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn max_to_one_preserves_hue() {
        let c = ColorRgb::new(2.0, 1.0, 0.5).max_to_one();
        assert_relative_eq!(c.r, 1.0);
        assert_relative_eq!(c.g, 0.5);
        assert_relative_eq!(c.b, 0.25);
    }

    #[test]
    fn max_to_one_leaves_in_range_colors() {
        let c = ColorRgb::new(0.2, 0.9, 1.0);
        assert_eq!(c.max_to_one(), c);
    }

    #[test]
    fn argb_packing() {
        assert_eq!(ColorRgb::WHITE.to_argb(), 0xFFFFFFFF);
        assert_eq!(ColorRgb::new(1.0, 0.0, 0.0).to_argb(), 0xFFFF0000);
        assert_eq!(ColorRgb::new(-1.0, 3.0, 0.0).to_argb(), 0xFF00FF00);
        let c = ColorRgb::from_argb(0xFF336699);
        assert_eq!(c.to_argb(), 0xFF336699);
    }
}
