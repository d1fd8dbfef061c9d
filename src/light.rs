//! Lighting types for the renderer.

use serde::{Deserialize, Serialize};

use crate::math::vec3::Vec3;

/// A directional light that illuminates the scene uniformly from a direction.
///
/// Directional lights are ideal for simulating distant light sources like the sun,
/// where all rays are effectively parallel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLight {
    /// The normalized direction the light is pointing (not where it comes from).
    pub direction: Vec3,
    /// Radiance multiplier applied to the diffuse term.
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::new(0.577, -0.577, 0.577), 7.0)
    }
}

impl DirectionalLight {
    /// Create a new directional light pointing in the given direction.
    /// The direction will be normalized automatically.
    pub fn new(direction: Vec3, intensity: f32) -> Self {
        DirectionalLight {
            direction: direction.normalize(),
            intensity,
        }
    }

    /// Cosine of the angle between the surface normal and the direction
    /// toward the light, clamped to zero for surfaces facing away.
    pub fn observed_area(&self, normal: Vec3) -> f32 {
        // Negate direction: light pointing at surface = positive dot product
        (-self.direction).dot(normal).max(0.0)
    }
}
