//! Pixel shaders.
//!
//! The rasterizer owns coverage, perspective-correct interpolation and the
//! depth test; it hands every fragment that passes the depth test to a
//! [`PixelShader`], which only decides the fragment's color.
//!
//! Two shaders are provided:
//! - [`PhongShader`]: textured Phong lighting under one directional light,
//!   with optional normal mapping and four [`LightingMode`] views
//! - [`DepthShader`]: grayscale visualization of view depth

use std::f32::consts::PI;

use crate::color::ColorRgb;
use crate::config::LightingConfig;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::mesh::{MeshTextures, VertexOut};
use crate::texture::Texture;

/// A covered pixel that passed the depth test.
///
/// `attributes` are the perspective-correct interpolated vertex outputs;
/// normal, tangent and view direction are renormalized. `attributes.position`
/// holds the pixel center in x/y, the interpolated NDC z and the view depth
/// in w.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    pub x: u32,
    pub y: u32,
    pub depth: f32,
    pub attributes: VertexOut,
}

/// Per-fragment color computation.
///
/// `Sync` so one shader can be shared by every rasterizer band.
pub trait PixelShader: Sync {
    fn shade(&self, fragment: &Fragment) -> ColorRgb;
}

/// Which terms of the lighting model reach the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightingMode {
    /// Only the cosine between normal and light.
    ObservedArea,
    /// Ambient + diffuse.
    Diffuse,
    /// Ambient + specular.
    Specular,
    /// Ambient + diffuse + specular.
    #[default]
    Combined,
}

impl LightingMode {
    /// The next mode in display order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            LightingMode::ObservedArea => LightingMode::Diffuse,
            LightingMode::Diffuse => LightingMode::Specular,
            LightingMode::Specular => LightingMode::Combined,
            LightingMode::Combined => LightingMode::ObservedArea,
        }
    }
}

impl std::fmt::Display for LightingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LightingMode::ObservedArea => write!(f, "Observed Area"),
            LightingMode::Diffuse => write!(f, "Diffuse"),
            LightingMode::Specular => write!(f, "Specular"),
            LightingMode::Combined => write!(f, "Combined"),
        }
    }
}

/// Lambertian diffuse: `color * reflectance / π`.
#[inline]
pub fn lambert(reflectance: f32, color: ColorRgb) -> ColorRgb {
    color * (reflectance / PI)
}

/// Phong specular lobe around the reflected light direction.
///
/// `light_direction` points from the light toward the surface and
/// `view_direction` from the eye toward the surface, both normalized.
#[inline]
pub fn phong(
    reflectance: f32,
    exponent: f32,
    light_direction: Vec3,
    view_direction: Vec3,
    normal: Vec3,
) -> ColorRgb {
    let reflected = light_direction.reflect(normal);
    let cos_alpha = reflected.dot(-view_direction);
    if cos_alpha <= 0.0 {
        return ColorRgb::BLACK;
    }
    ColorRgb::WHITE * (reflectance * cos_alpha.powf(exponent))
}

/// Moves a tangent-space normal map sample into world space.
///
/// The sample is remapped from [0, 1] to [-1, 1] and expressed in the basis
/// (tangent, normal × tangent, normal).
#[inline]
pub fn perturb_normal(sample: ColorRgb, normal: Vec3, tangent: Vec3) -> Vec3 {
    let bitangent = normal.cross(tangent);
    let x = 2.0 * sample.r - 1.0;
    let y = 2.0 * sample.g - 1.0;
    let z = 2.0 * sample.b - 1.0;
    (tangent * x + bitangent * y + normal * z).normalize()
}

/// Textured Phong shading for one mesh.
pub struct PhongShader<'a> {
    textures: &'a MeshTextures,
    lighting: &'a LightingConfig,
    mode: LightingMode,
    normal_mapping: bool,
    bilinear: bool,
}

impl<'a> PhongShader<'a> {
    pub fn new(
        textures: &'a MeshTextures,
        lighting: &'a LightingConfig,
        mode: LightingMode,
        normal_mapping: bool,
        bilinear: bool,
    ) -> Self {
        Self {
            textures,
            lighting,
            mode,
            normal_mapping,
            bilinear,
        }
    }

    #[inline]
    fn sample(&self, texture: Option<&Texture>, uv: Vec2) -> Option<ColorRgb> {
        texture.map(|t| t.sample(uv, self.bilinear))
    }
}

impl PixelShader for PhongShader<'_> {
    fn shade(&self, fragment: &Fragment) -> ColorRgb {
        let attributes = &fragment.attributes;
        let uv = attributes.uv;
        let light = &self.lighting.light;

        let normal = match self.sample(self.textures.normal.as_ref(), uv) {
            Some(sample) if self.normal_mapping => {
                perturb_normal(sample, attributes.normal, attributes.tangent)
            }
            _ => attributes.normal,
        };

        let observed_area = light.observed_area(normal);
        if self.mode == LightingMode::ObservedArea {
            return (ColorRgb::WHITE * observed_area).max_to_one();
        }
        if observed_area <= 0.0 {
            return ColorRgb::BLACK;
        }

        let mut radiance = self.lighting.ambient;

        if matches!(self.mode, LightingMode::Diffuse | LightingMode::Combined) {
            let albedo = self
                .sample(self.textures.color.as_ref(), uv)
                .unwrap_or(attributes.color);
            radiance += lambert(self.lighting.diffuse_reflectance * light.intensity, albedo);
        }

        if matches!(self.mode, LightingMode::Specular | LightingMode::Combined) {
            let reflectance = self
                .sample(self.textures.specular.as_ref(), uv)
                .map_or(self.lighting.fallback_specular, |c| c.r);
            let gloss = self
                .sample(self.textures.gloss.as_ref(), uv)
                .map_or(self.lighting.fallback_gloss, |c| c.r);
            radiance += phong(
                reflectance,
                gloss * self.lighting.shininess,
                light.direction,
                attributes.view_direction,
                normal,
            );
        }

        (radiance * observed_area).max_to_one()
    }
}

/// Maps view depth linearly from `near..far` to black..white.
#[derive(Debug, Clone, Copy)]
pub struct DepthShader {
    near: f32,
    far: f32,
}

impl DepthShader {
    pub fn new(near: f32, far: f32) -> Self {
        Self { near, far }
    }
}

impl PixelShader for DepthShader {
    #[inline]
    fn shade(&self, fragment: &Fragment) -> ColorRgb {
        let t = ((fragment.depth - self.near) / (self.far - self.near)).clamp(0.0, 1.0);
        ColorRgb::splat(t)
    }
}
