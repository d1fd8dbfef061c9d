//! Immutable 2D textures with tiling nearest/bilinear sampling.

use std::path::Path;

use crate::color::ColorRgb;
use crate::error::LoadError;
use crate::math::vec2::Vec2;

/// A 2D RGB texture, immutable after construction.
///
/// Texels are stored row-major from the top-left corner; UV (0, 0) addresses
/// the top-left texel. Loaders that read bottom-left UV conventions (OBJ)
/// flip V once at load time.
#[derive(Debug, Clone)]
pub struct Texture {
    texels: Vec<ColorRgb>,
    width: u32,
    height: u32,
}

impl Texture {
    /// Load a texture from an image file (PNG, JPG, BMP, ...). Alpha is dropped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();
        log::info!("loaded texture {} ({width}x{height})", path.display());

        let texels = img.pixels().map(|p| ColorRgb::from_rgb8(p.0)).collect();
        Self::from_texels(width, height, texels)
    }

    /// Build a texture from row-major texels.
    pub fn from_texels(width: u32, height: u32, texels: Vec<ColorRgb>) -> Result<Self, LoadError> {
        if width == 0 || height == 0 || texels.len() != (width as usize) * (height as usize) {
            return Err(LoadError::TextureSize {
                width,
                height,
                actual: texels.len(),
            });
        }
        Ok(Self {
            texels,
            width,
            height,
        })
    }

    /// A 1x1 texture; every sample returns `color`.
    pub fn solid(color: ColorRgb) -> Self {
        Self {
            texels: vec![color],
            width: 1,
            height: 1,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample the texture at `uv`.
    ///
    /// UVs tile: each component is wrapped into [0, 1) with `rem_euclid`, so
    /// negative and >1 coordinates repeat the texture instead of clamping.
    /// Texel `i` covers `[i/w, (i+1)/w)` and its center sits at `(i+0.5)/w`.
    #[inline]
    pub fn sample(&self, uv: Vec2, bilinear: bool) -> ColorRgb {
        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);
        if bilinear {
            self.sample_bilinear(u, v)
        } else {
            self.sample_nearest(u, v)
        }
    }

    #[inline]
    fn sample_nearest(&self, u: f32, v: f32) -> ColorRgb {
        // rem_euclid can round up to exactly 1.0 for tiny negatives
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.texels[(y * self.width + x) as usize]
    }

    /// Blend the four texels around `(u, v)`: horizontal lerps on the two
    /// rows, then a vertical lerp. Texel coordinates are shifted by half a
    /// texel so that sampling a texel center returns that texel unblended.
    /// "Integer aligned" therefore means `u * width - 0.5` is whole; at texel
    /// edges (`u * width` whole) the neighbours blend equally.
    #[inline]
    fn sample_bilinear(&self, u: f32, v: f32) -> ColorRgb {
        let fx = u * self.width as f32 - 0.5;
        let fy = v * self.height as f32 - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), tx);
        let bottom = self.texel(x0, y0 + 1).lerp(self.texel(x0 + 1, y0 + 1), tx);
        top.lerp(bottom, ty)
    }

    /// Texel lookup with wrap-around addressing.
    #[inline]
    fn texel(&self, x: i64, y: i64) -> ColorRgb {
        let x = x.rem_euclid(self.width as i64) as usize;
        let y = y.rem_euclid(self.height as i64) as usize;
        self.texels[y * self.width as usize + x]
    }
}
